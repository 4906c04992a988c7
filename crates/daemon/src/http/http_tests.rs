// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ctx::{test_state, test_state_with_cfg, Config};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use pp_core::FakeClock;
use serde_json::{json, Value};
use tempfile::tempdir;
use tower::ServiceExt;

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).expect("request")
}

fn test_app(dir: &std::path::Path) -> (Router, crate::AppState<FakeClock>) {
    let state = test_state(dir);
    (build_router(state.clone()), state)
}

// ── Health and sessions ──────────────────────────────────────────────────────

#[tokio::test]
async fn healthz_reports_protocol_version() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, body) = send(&app, get_req("/healthz")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["protocolVersion"], pp_core::PROTOCOL_VERSION);
}

#[tokio::test]
async fn create_session_is_201_then_200() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, body) = send(&app, post("/sessions", json!({"sessionId": "dev"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["sessionId"], "dev");

    let (status, _) = send(&app, post("/sessions", json!({"sessionId": "dev"}))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_session_rejects_malformed_id() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, body) = send(&app, post("/sessions", json!({"sessionId": "bad id!"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("invalid character"));
}

#[tokio::test]
async fn create_session_generates_id_when_absent() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, body) = send(&app, post("/sessions", json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["sessionId"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn message_emits_client_event() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    let (status, body) =
        send(&app, post("/sessions/dev/message", json!({"text": "hello"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cursor"], 1);

    let inner = state.inner.lock();
    let events = inner.store.state().events_after("dev", 0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].envelope.from.as_deref(), Some("client"));
    assert_eq!(events[0].envelope.body.kind(), "message");
}

// ── Cache-control on mutating routes ─────────────────────────────────────────

#[tokio::test]
async fn mutating_routes_are_no_store() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let response = app
        .clone()
        .oneshot(post("/sessions/dev/message", json!({"text": "hi"})))
        .await
        .expect("infallible");
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).and_then(|v| v.to_str().ok()),
        Some("no-store")
    );
}

// ── Command ingest ───────────────────────────────────────────────────────────

#[tokio::test]
async fn command_emits_typed_event() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    let (status, body) = send(
        &app,
        post(
            "/sessions/dev/command",
            json!({
                "type": "task_created",
                "payload": {"taskId": "t1", "title": "fix"},
                "from": "localbuddy"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cursor"], 1);

    let inner = state.inner.lock();
    assert_eq!(inner.store.state().sessions["dev"].tasks["t1"].title.as_deref(), Some("fix"));
}

#[tokio::test]
async fn command_unknown_type_persists_error_event_and_400s() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    let (status, body) = send(
        &app,
        post("/sessions/dev/command", json!({"type": "mystery", "payload": {}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap_or_default().contains("unknown event type"));

    // The rejection was persisted as an error event in place of the original
    let inner = state.inner.lock();
    let events = inner.store.state().events_after("dev", 0);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].envelope.body.kind(), "error");
}

#[tokio::test]
async fn command_non_object_payload_is_rejected() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, _) = send(
        &app,
        post("/sessions/dev/command", json!({"type": "message", "payload": "text"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_failed_command_text_is_compacted() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    let (status, _) = send(
        &app,
        post(
            "/sessions/dev/command",
            json!({
                "type": "job_failed",
                "payload": {"jobId": "j1", "message": "\u{1b}[31mbroke   badly\u{1b}[0m"}
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let inner = state.inner.lock();
    let events = inner.store.state().events_after("dev", 0);
    match &events[0].envelope.body {
        pp_core::EventBody::JobFailed(p) => {
            assert_eq!(p.message.as_deref(), Some("broke badly"));
        }
        other => panic!("unexpected body {}", other.kind()),
    }
}

// ── Approval gate (scenario S4) ──────────────────────────────────────────────

#[tokio::test]
async fn tool_call_approval_flow() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    // tool_call requiring approval registers it and announces approval_required
    let (status, _) = send(
        &app,
        post(
            "/sessions/dev/command",
            json!({
                "type": "tool_call",
                "payload": {
                    "toolCallId": "t1",
                    "tool": "shell",
                    "requiresApproval": true,
                    "summary": "rm -rf target"
                }
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state.approvals.len(), 1);

    {
        let inner = state.inner.lock();
        let kinds: Vec<&str> = inner
            .store
            .state()
            .events_after("dev", 0)
            .iter()
            .map(|e| e.envelope.body.kind())
            .collect();
        assert_eq!(kinds, vec!["tool_call", "approval_required"]);
    }

    // First decision resolves and emits `approved`
    let (status, _) = send(&app, post("/approvals/t1", json!({"decision": "approve"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(state.approvals.is_empty());

    {
        let inner = state.inner.lock();
        let events = inner.store.state().events_after("dev", 0);
        assert_eq!(events.last().map(|e| e.envelope.body.kind()), Some("approved"));
    }

    // Second identical decision: the entry is gone
    let (status, body) = send(&app, post("/approvals/t1", json!({"decision": "approve"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Approval not found");
}

#[tokio::test]
async fn deny_emits_denied_event() {
    let dir = tempdir().unwrap();
    let (app, state) = test_app(dir.path());

    send(
        &app,
        post(
            "/sessions/dev/command",
            json!({
                "type": "approval_required",
                "payload": {"approvalId": "a1", "action": "push", "summary": "push branch"}
            }),
        ),
    )
    .await;
    assert_eq!(state.approvals.len(), 1);

    let (status, _) = send(&app, post("/approvals/a1", json!({"decision": "deny"}))).await;
    assert_eq!(status, StatusCode::OK);

    let inner = state.inner.lock();
    let events = inner.store.state().events_after("dev", 0);
    assert_eq!(events.last().map(|e| e.envelope.body.kind()), Some("denied"));
}

#[tokio::test]
async fn malformed_decision_is_rejected() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, _) = send(&app, post("/approvals/x", json!({"decision": "maybe"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Authentication ───────────────────────────────────────────────────────────

fn authed_app(dir: &std::path::Path) -> Router {
    let cfg = Config { auth_token: Some("hunter2".to_string()), ..Config::default() };
    build_router(test_state_with_cfg(dir, cfg))
}

#[tokio::test]
async fn protected_routes_require_token() {
    let dir = tempdir().unwrap();
    let app = authed_app(dir.path());

    let (status, body) = send(
        &app,
        post("/requests/enqueue", json!({"sessionId": "dev", "prompt": "hi"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn bearer_token_grants_access() {
    let dir = tempdir().unwrap();
    let app = authed_app(dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/requests/enqueue")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer hunter2")
        .body(Body::from(json!({"sessionId": "dev", "prompt": "hi"}).to_string()))
        .expect("request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queuePosition"], 1);
}

#[tokio::test]
async fn wrong_token_is_rejected() {
    let dir = tempdir().unwrap();
    let app = authed_app(dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/workers/heartbeat")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Bearer wrong")
        .body(Body::from(json!({"workerId": "w1"}).to_string()))
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_message_stay_open_with_token_configured() {
    let dir = tempdir().unwrap();
    let app = authed_app(dir.path());

    let (status, _) = send(&app, get_req("/healthz")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, post("/sessions/dev/message", json!({"text": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
}

// ── Queue endpoints through the router ───────────────────────────────────────

#[tokio::test]
async fn claim_on_empty_queue_returns_null() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, body) = send(&app, post("/requests/claim", json!({"agentId": "p1"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["claimed"].is_null());
}

#[tokio::test]
async fn unknown_job_is_404() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    let (status, _) = send(
        &app,
        post("/jobs/job-missing/complete", json!({"summary": "x"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn system_status_aggregates() {
    let dir = tempdir().unwrap();
    let (app, _state) = test_app(dir.path());

    send(&app, post("/workers/heartbeat", json!({"workerId": "w1"}))).await;
    send(&app, post("/requests/enqueue", json!({"sessionId": "dev", "prompt": "hi"}))).await;
    send(
        &app,
        post("/jobs/enqueue", json!({"sessionId": "dev", "taskId": "t1", "kind": "code"})),
    )
    .await;

    let (status, body) = send(&app, get_req("/system/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["workers"]["total"], 1);
    assert_eq!(body["workers"]["online"], 1);
    assert_eq!(body["requests"]["pending"], 1);
    assert_eq!(body["jobs"]["pending"], 1);
    assert_eq!(body["pendingJobs"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["slo"]["windowHours"], 24);
    assert_eq!(body["slo"]["requests"]["terminal"], 0);
}
