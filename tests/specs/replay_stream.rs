// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event bus replay specs: cursor resume and the reset rule.

use crate::prelude::Coordinator;
use pp_core::SessionId;
use pp_daemon::hub;
use serde_json::json;

async fn emit_four_events(coordinator: &Coordinator) {
    coordinator.post_ok("/sessions/dev/message", json!({"text": "start"})).await;
    for (kind, payload) in [
        ("task_created", json!({"taskId": "t1", "title": "build"})),
        ("task_started", json!({"taskId": "t1"})),
        ("task_completed", json!({"taskId": "t1", "summary": "ok"})),
    ] {
        coordinator
            .post_ok("/sessions/dev/command", json!({"type": kind, "payload": payload}))
            .await;
    }
}

#[tokio::test]
async fn replay_resumes_after_cursor() {
    let coordinator = Coordinator::start();
    emit_four_events(&coordinator).await;

    // Subscriber reconnects having seen cursor 2
    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 2);
    let cursors: Vec<u64> = replay.iter().map(|f| f.cursor).collect();
    assert_eq!(cursors, vec![3, 4]);
    assert_eq!(replay[0].envelope.body.kind(), "task_started");
    assert_eq!(replay[1].envelope.body.kind(), "task_completed");
}

#[tokio::test]
async fn phantom_cursor_resets_to_full_replay() {
    let coordinator = Coordinator::start();

    for i in 0..5 {
        coordinator.post_ok("/sessions/dev/message", json!({"text": format!("m{i}")})).await;
    }

    // Client kept state from a store that no longer exists
    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 42);
    let cursors: Vec<u64> = replay.iter().map(|f| f.cursor).collect();
    assert_eq!(cursors, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn live_events_continue_after_replay() {
    let coordinator = Coordinator::start();
    coordinator.post_ok("/sessions/dev/message", json!({"text": "one"})).await;

    let (replay, mut rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 0);
    assert_eq!(replay.len(), 1);

    coordinator.post_ok("/sessions/dev/message", json!({"text": "two"})).await;
    let frame = rx.recv().await.expect("live frame");
    assert_eq!(frame.cursor, 2);
}

#[tokio::test]
async fn readiness_announcement_follows_third_agent() {
    let coordinator = Coordinator::start();

    for agent in ["localbuddy-1", "remotebuddy-1", "source-control-manager"] {
        coordinator
            .post_ok(
                "/sessions/dev/command",
                json!({
                    "type": "status",
                    "payload": {"agentId": agent, "detail": "online"},
                    "from": agent
                }),
            )
            .await;
    }

    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 3);
    assert_eq!(replay.len(), 1);
    assert!(pp_core::ready::is_ready_announcement(&replay[0].envelope.body));
}
