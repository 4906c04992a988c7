// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ctx::test_state;
use pp_core::envelope::{AgentStatusPayload, MessagePayload, TaskCompletedPayload, TaskCreatedPayload,
    TaskRefPayload};
use pp_core::Clock;
use tempfile::tempdir;

fn message(session: &str, state: &crate::AppState<pp_core::FakeClock>, text: &str) -> Envelope {
    Envelope::new(
        SessionId::new(session),
        state.clock.now_utc(),
        EventBody::Message(MessagePayload { text: text.into(), ..Default::default() }),
    )
}

fn status(session: &str, state: &crate::AppState<pp_core::FakeClock>, agent: &str) -> Envelope {
    Envelope::new(
        SessionId::new(session),
        state.clock.now_utc(),
        EventBody::Status(AgentStatusPayload {
            agent_id: Some(agent.into()),
            detail: Some("online".into()),
            ..Default::default()
        }),
    )
}

// ── Cursor assignment ────────────────────────────────────────────────────────

#[test]
fn cursors_are_dense_from_one() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    assert_eq!(emit(&state, message("dev", &state, "a")).unwrap(), 1);
    assert_eq!(emit(&state, message("dev", &state, "b")).unwrap(), 2);
    assert_eq!(emit(&state, message("dev", &state, "c")).unwrap(), 3);
    assert_eq!(latest_cursor(&state, &SessionId::new("dev")), 3);
}

#[test]
fn sessions_have_independent_cursor_spaces() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    assert_eq!(emit(&state, message("a", &state, "x")).unwrap(), 1);
    assert_eq!(emit(&state, message("b", &state, "y")).unwrap(), 1);
    assert_eq!(emit(&state, message("a", &state, "z")).unwrap(), 2);
}

// ── Replay (scenario S2) ─────────────────────────────────────────────────────

#[test]
fn replay_after_cursor_returns_strict_suffix() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");
    let ts = state.clock.now_utc();

    emit(&state, message("dev", &state, "hello")).unwrap();
    emit(
        &state,
        Envelope::new(
            session.clone(),
            ts,
            EventBody::TaskCreated(TaskCreatedPayload { task_id: "t1".into(), ..Default::default() }),
        ),
    )
    .unwrap();
    emit(
        &state,
        Envelope::new(
            session.clone(),
            ts,
            EventBody::TaskStarted(TaskRefPayload { task_id: "t1".into(), ..Default::default() }),
        ),
    )
    .unwrap();
    emit(
        &state,
        Envelope::new(
            session.clone(),
            ts,
            EventBody::TaskCompleted(TaskCompletedPayload {
                task_id: "t1".into(),
                ..Default::default()
            }),
        ),
    )
    .unwrap();

    let (replay, _rx) = subscribe(&state, &session, 2);
    let cursors: Vec<u64> = replay.iter().map(|f| f.cursor).collect();
    assert_eq!(cursors, vec![3, 4]);
}

// ── Cursor reset (scenario S5) ───────────────────────────────────────────────

#[test]
fn cursor_ahead_of_log_resets_to_full_replay() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");

    for i in 0..5 {
        emit(&state, message("dev", &state, &format!("m{i}"))).unwrap();
    }

    let (replay, _rx) = subscribe(&state, &session, 42);
    let cursors: Vec<u64> = replay.iter().map(|f| f.cursor).collect();
    assert_eq!(cursors, vec![1, 2, 3, 4, 5]);
}

// ── Live fan-out ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscriber_receives_live_events_after_replay() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");

    emit(&state, message("dev", &state, "before")).unwrap();
    let (replay, mut rx) = subscribe(&state, &session, 0);
    assert_eq!(replay.len(), 1);

    emit(&state, message("dev", &state, "after")).unwrap();
    let frame = rx.recv().await.unwrap();
    assert_eq!(frame.cursor, 2);
    match &frame.envelope.body {
        EventBody::Message(p) => assert_eq!(p.text, "after"),
        other => panic!("unexpected body {}", other.kind()),
    }
}

#[test]
fn overflowing_subscriber_is_dropped() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");

    let (_replay, rx) = subscribe(&state, &session, 0);
    // Fill the buffer past capacity without draining
    for i in 0..(SUBSCRIBER_BUFFER + 10) {
        emit(&state, message("dev", &state, &format!("m{i}"))).unwrap();
    }
    drop(rx);

    // The registry no longer tracks the dead subscriber
    assert!(state.inner.lock().subs.get("dev").is_none());
}

#[test]
fn dropped_receiver_is_pruned_on_next_emit() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");

    let (_replay, rx) = subscribe(&state, &session, 0);
    drop(rx);
    emit(&state, message("dev", &state, "x")).unwrap();

    assert!(state.inner.lock().subs.get("dev").is_none());
}

// ── Persistence ──────────────────────────────────────────────────────────────

#[test]
fn events_survive_restart_with_cursors() {
    let dir = tempdir().unwrap();
    {
        let state = test_state(dir.path());
        emit(&state, message("dev", &state, "persisted")).unwrap();
    }

    let state = test_state(dir.path());
    let (replay, _rx) = subscribe(&state, &SessionId::new("dev"), 0);
    assert_eq!(replay.len(), 1);
    assert_eq!(replay[0].cursor, 1);
    // Cursor assignment resumes after the persisted maximum
    assert_eq!(emit(&state, message("dev", &state, "next")).unwrap(), 2);
}

// ── Startup readiness ────────────────────────────────────────────────────────

#[test]
fn ready_announcement_fires_once_when_all_agents_online() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());
    let session = SessionId::new("dev");

    emit(&state, status("dev", &state, "localbuddy-1")).unwrap();
    emit(&state, status("dev", &state, "remotebuddy-1")).unwrap();
    assert_eq!(latest_cursor(&state, &session), 2);

    emit(&state, status("dev", &state, "source-control-manager")).unwrap();
    // Third status event plus the announcement
    assert_eq!(latest_cursor(&state, &session), 4);

    let (replay, _rx) = subscribe(&state, &session, 3);
    assert!(pp_core::ready::is_ready_announcement(&replay[0].envelope.body));
    assert_eq!(replay[0].envelope.from.as_deref(), Some(SERVER_FROM));

    // Further online reports do not re-announce
    emit(&state, status("dev", &state, "localbuddy-2")).unwrap();
    assert_eq!(latest_cursor(&state, &session), 5);
}

#[test]
fn ready_announcement_not_repeated_after_restart() {
    let dir = tempdir().unwrap();
    {
        let state = test_state(dir.path());
        emit(&state, status("dev", &state, "localbuddy")).unwrap();
        emit(&state, status("dev", &state, "remotebuddy")).unwrap();
        emit(&state, status("dev", &state, "source-control-manager")).unwrap();
        assert_eq!(latest_cursor(&state, &SessionId::new("dev")), 4);
    }

    let state = test_state(dir.path());
    emit(&state, status("dev", &state, "remotebuddy")).unwrap();
    // No second announcement
    assert_eq!(latest_cursor(&state, &SessionId::new("dev")), 5);
}
