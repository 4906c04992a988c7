// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn claimed(id: &str, agent: &str, at_ms: i64) -> LedgerEvent {
    LedgerEvent::RequestClaimed {
        request_id: RequestId::from_string(id),
        agent_id: agent.to_string(),
        claimed_at: t_plus_ms(at_ms),
    }
}

// ── Basic transitions ────────────────────────────────────────────────────────

#[test]
fn enqueued_creates_pending_row() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });

    assert_eq!(state.requests["r1"].status, QueueStatus::Pending);
    assert!(state.requests["r1"].agent_id.is_none());
}

#[test]
fn claimed_binds_agent() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&claimed("r1", "planner-1", 40));

    let row = &state.requests["r1"];
    assert_eq!(row.status, QueueStatus::Claimed);
    assert_eq!(row.agent_id.as_deref(), Some("planner-1"));
    assert_eq!(row.queue_wait_ms(), Some(40));
}

#[test]
fn completed_records_duration_from_enqueue() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&claimed("r1", "planner-1", 40));
    state.apply(&LedgerEvent::RequestCompleted {
        request_id: RequestId::from_string("r1"),
        result: Some(serde_json::json!({"jobs": 2})),
        completed_at: t_plus_ms(100),
    });

    let row = &state.requests["r1"];
    assert_eq!(row.status, QueueStatus::Completed);
    assert_eq!(row.duration_ms, Some(100));
    assert_eq!(row.terminal_at(), Some(t_plus_ms(100)));
}

#[test]
fn failed_records_error_and_duration() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&claimed("r1", "planner-1", 40));
    state.apply(&LedgerEvent::RequestFailed {
        request_id: RequestId::from_string("r1"),
        message: "planner crashed".to_string(),
        detail: Some("oom".to_string()),
        failed_at: t_plus_ms(300),
    });

    let row = &state.requests["r1"];
    assert_eq!(row.status, QueueStatus::Failed);
    assert_eq!(row.error.as_deref(), Some("planner crashed: oom"));
    assert_eq!(row.duration_ms, Some(300));
}

// ── Status machine guards ────────────────────────────────────────────────────

#[test]
fn complete_without_claim_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&LedgerEvent::RequestCompleted {
        request_id: RequestId::from_string("r1"),
        result: None,
        completed_at: t_plus_ms(100),
    });

    assert_eq!(state.requests["r1"].status, QueueStatus::Pending);
    assert!(state.requests["r1"].duration_ms.is_none());
}

#[test]
fn second_claim_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&claimed("r1", "planner-1", 40));
    state.apply(&claimed("r1", "planner-2", 90));

    assert_eq!(state.requests["r1"].agent_id.as_deref(), Some("planner-1"));
}

#[test]
fn terminal_transition_applied_twice_is_stable() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::RequestEnqueued { request: request_row("r1", Priority::Normal) });
    state.apply(&claimed("r1", "planner-1", 40));
    let done = LedgerEvent::RequestCompleted {
        request_id: RequestId::from_string("r1"),
        result: None,
        completed_at: t_plus_ms(100),
    };
    state.apply(&done);
    let once = state.requests["r1"].clone();
    state.apply(&done);
    assert_eq!(state.requests["r1"], once);
}

// ── Head-selection ordering ──────────────────────────────────────────────────

#[test]
fn pending_requests_order_by_priority_then_fifo() {
    let mut state = MaterializedState::default();
    let mut normal = request_row("rA", Priority::Normal);
    normal.seq = 1;
    let mut background = request_row("rB", Priority::Background);
    background.seq = 2;
    let mut interactive = request_row("rC", Priority::Interactive);
    interactive.seq = 3;

    state.apply(&LedgerEvent::RequestEnqueued { request: normal });
    state.apply(&LedgerEvent::RequestEnqueued { request: background });
    state.apply(&LedgerEvent::RequestEnqueued { request: interactive });

    let order: Vec<&str> = state.pending_requests().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["rC", "rA", "rB"]);
}

#[test]
fn same_priority_orders_by_insertion_seq() {
    let mut state = MaterializedState::default();
    let mut first = request_row("r1", Priority::Normal);
    first.seq = 1;
    let mut second = request_row("r2", Priority::Normal);
    second.seq = 2;

    state.apply(&LedgerEvent::RequestEnqueued { request: second });
    state.apply(&LedgerEvent::RequestEnqueued { request: first });

    let order: Vec<&str> = state.pending_requests().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(order, vec!["r1", "r2"]);
}
