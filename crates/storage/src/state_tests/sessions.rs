// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pp_core::envelope::{AgentStatusPayload, TaskCreatedPayload, TextPayload};
use pp_core::TaskStatus;

fn message(text: &str) -> EventBody {
    EventBody::Message(pp_core::MessagePayload { text: text.into(), ..Default::default() })
}

// ── Session creation ─────────────────────────────────────────────────────────

#[test]
fn session_created_inserts_row() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::SessionCreated {
        session_id: SessionId::new("dev"),
        created_at: t0(),
    });

    assert!(state.sessions.contains_key("dev"));
    assert_eq!(state.latest_cursor("dev"), 0);
}

#[test]
fn session_created_twice_keeps_original_creation_time() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::SessionCreated {
        session_id: SessionId::new("dev"),
        created_at: t0(),
    });
    state.apply(&LedgerEvent::SessionCreated {
        session_id: SessionId::new("dev"),
        created_at: t_plus_ms(5_000),
    });

    assert_eq!(state.sessions["dev"].created_at, t0());
}

// ── Event log and cursors ────────────────────────────────────────────────────

#[test]
fn appended_events_advance_cursor_densely() {
    let mut state = MaterializedState::default();
    state.apply(&appended("dev", 1, message("one")));
    state.apply(&appended("dev", 2, message("two")));

    assert_eq!(state.latest_cursor("dev"), 2);
    let events = state.events_after("dev", 0);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].cursor, 1);
    assert_eq!(events[1].cursor, 2);
}

#[test]
fn event_appended_creates_session_implicitly() {
    let mut state = MaterializedState::default();
    state.apply(&appended("implicit", 1, message("hello")));

    assert!(state.sessions.contains_key("implicit"));
}

#[test]
fn replayed_event_is_not_applied_twice() {
    let mut state = MaterializedState::default();
    let event = appended("dev", 1, message("one"));
    state.apply(&event);
    state.apply(&event);

    assert_eq!(state.latest_cursor("dev"), 1);
    assert_eq!(state.events_after("dev", 0).len(), 1);
}

#[test]
fn events_after_returns_strict_suffix() {
    let mut state = MaterializedState::default();
    for cursor in 1..=4 {
        state.apply(&appended("dev", cursor, message("m")));
    }

    let events = state.events_after("dev", 2);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].cursor, 3);
    assert_eq!(events[1].cursor, 4);

    assert!(state.events_after("dev", 9).is_empty());
    assert!(state.events_after("missing", 0).is_empty());
}

// ── Task projection fold ─────────────────────────────────────────────────────

#[test]
fn task_events_fold_into_projection() {
    let mut state = MaterializedState::default();
    state.apply(&appended(
        "dev",
        1,
        EventBody::TaskCreated(TaskCreatedPayload {
            task_id: "t1".into(),
            title: Some("fix bug".into()),
            ..Default::default()
        }),
    ));

    let tasks = &state.sessions["dev"].tasks;
    assert_eq!(tasks["t1"].status, TaskStatus::Created);
    assert_eq!(tasks["t1"].title.as_deref(), Some("fix bug"));
}

// ── Readiness fold ───────────────────────────────────────────────────────────

#[test]
fn status_events_accumulate_ready_agents() {
    let mut state = MaterializedState::default();
    state.apply(&appended(
        "dev",
        1,
        EventBody::Status(AgentStatusPayload {
            agent_id: Some("localbuddy-1".into()),
            detail: Some("online".into()),
            ..Default::default()
        }),
    ));

    assert!(state.sessions["dev"].ready_agents.contains("localbuddy"));
    assert!(!state.sessions["dev"].ready_emitted);
}

#[test]
fn ready_announcement_marks_emitted() {
    let mut state = MaterializedState::default();
    state.apply(&appended(
        "dev",
        1,
        EventBody::AssistantMessage(TextPayload {
            text: pp_core::ready::READY_TEXT.into(),
            ..Default::default()
        }),
    ));

    assert!(state.sessions["dev"].ready_emitted);
}
