// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn claimed(id: &str, pusher: &str) -> LedgerEvent {
    LedgerEvent::CompletionClaimed {
        completion_id: CompletionId::from_string(id),
        pusher_id: pusher.to_string(),
        claimed_at: t_plus_ms(10),
    }
}

#[test]
fn enqueued_creates_pending_row() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::CompletionEnqueued { completion: completion_row("c1", "j1") });

    assert_eq!(state.completions["c1"].status, CompletionStatus::Pending);
    assert_eq!(state.completions["c1"].commit_sha, "abc123");
}

#[test]
fn claim_then_processed() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::CompletionEnqueued { completion: completion_row("c1", "j1") });
    state.apply(&claimed("c1", "scm-1"));
    state.apply(&LedgerEvent::CompletionProcessed {
        completion_id: CompletionId::from_string("c1"),
        processed_at: t_plus_ms(500),
    });

    let row = &state.completions["c1"];
    assert_eq!(row.status, CompletionStatus::Processed);
    assert_eq!(row.pusher_id.as_deref(), Some("scm-1"));
    assert_eq!(row.processed_at, Some(t_plus_ms(500)));
}

#[test]
fn claim_then_failed_records_error() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::CompletionEnqueued { completion: completion_row("c1", "j1") });
    state.apply(&claimed("c1", "scm-1"));
    state.apply(&LedgerEvent::CompletionFailed {
        completion_id: CompletionId::from_string("c1"),
        error: "merge conflict".to_string(),
        failed_at: t_plus_ms(500),
    });

    assert_eq!(state.completions["c1"].status, CompletionStatus::Failed);
    assert_eq!(state.completions["c1"].error.as_deref(), Some("merge conflict"));
}

#[test]
fn processed_without_claim_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::CompletionEnqueued { completion: completion_row("c1", "j1") });
    state.apply(&LedgerEvent::CompletionProcessed {
        completion_id: CompletionId::from_string("c1"),
        processed_at: t_plus_ms(500),
    });

    assert_eq!(state.completions["c1"].status, CompletionStatus::Pending);
}

#[test]
fn pending_completions_are_fifo() {
    let mut state = MaterializedState::default();
    let mut first = completion_row("c1", "j1");
    first.seq = 1;
    let mut second = completion_row("c2", "j2");
    second.seq = 2;

    state.apply(&LedgerEvent::CompletionEnqueued { completion: second });
    state.apply(&LedgerEvent::CompletionEnqueued { completion: first });

    let order: Vec<&str> = state.pending_completions().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(order, vec!["c1", "c2"]);
}
