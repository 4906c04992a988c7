// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval gating specs.

use crate::prelude::Coordinator;
use axum::http::StatusCode;
use pp_core::SessionId;
use pp_daemon::hub;
use serde_json::json;

#[tokio::test]
async fn tool_call_gate_resolves_once() {
    let coordinator = Coordinator::start();

    coordinator
        .post_ok(
            "/sessions/dev/command",
            json!({
                "type": "tool_call",
                "payload": {
                    "toolCallId": "t1",
                    "tool": "shell",
                    "requiresApproval": true,
                    "summary": "git push --force"
                },
                "from": "localbuddy"
            }),
        )
        .await;

    // tool_call then approval_required with the tool call's id
    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 0);
    assert_eq!(replay.len(), 2);
    assert_eq!(replay[0].envelope.body.kind(), "tool_call");
    match &replay[1].envelope.body {
        pp_core::EventBody::ApprovalRequired(p) => assert_eq!(p.approval_id, "t1"),
        other => panic!("unexpected body {}", other.kind()),
    }

    // Approve: emits `approved` and removes the entry
    coordinator.post_ok("/approvals/t1", json!({"decision": "approve"})).await;
    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 2);
    assert_eq!(replay.len(), 1);
    match &replay[0].envelope.body {
        pp_core::EventBody::Approved(p) => assert_eq!(p.approval_id, "t1"),
        other => panic!("unexpected body {}", other.kind()),
    }

    // A second identical decision finds nothing
    let (status, body) = coordinator.post("/approvals/t1", json!({"decision": "approve"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Approval not found");
}

#[tokio::test]
async fn tool_call_without_flag_creates_no_approval() {
    let coordinator = Coordinator::start();

    coordinator
        .post_ok(
            "/sessions/dev/command",
            json!({
                "type": "tool_call",
                "payload": {"toolCallId": "t2", "tool": "read_file"}
            }),
        )
        .await;

    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 0);
    assert_eq!(replay.len(), 1);
    assert!(coordinator.state.approvals.is_empty());
}

#[tokio::test]
async fn denied_decision_is_broadcast() {
    let coordinator = Coordinator::start();

    coordinator
        .post_ok(
            "/sessions/dev/command",
            json!({
                "type": "approval_required",
                "payload": {"approvalId": "a9", "action": "push", "summary": "push to main"}
            }),
        )
        .await;

    coordinator.post_ok("/approvals/a9", json!({"decision": "deny"})).await;
    let (replay, _rx) = hub::subscribe(&coordinator.state, &SessionId::new("dev"), 1);
    assert_eq!(replay.last().map(|f| f.envelope.body.kind()), Some("denied"));
}
