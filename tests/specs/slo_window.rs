// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling-window SLO specs.

use crate::prelude::Coordinator;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn terminal_requests_summarize_in_status() {
    let coordinator = Coordinator::start();

    // One completed in 100 ms (queued 40 ms)
    let first = coordinator
        .post_ok("/requests/enqueue", json!({"sessionId": "dev", "prompt": "one"}))
        .await["requestId"]
        .as_str()
        .unwrap_or("")
        .to_string();
    coordinator.clock().advance(Duration::from_millis(40));
    coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
    coordinator.clock().advance(Duration::from_millis(60));
    coordinator.post_ok(&format!("/requests/{first}/complete"), json!({})).await;

    // One failed in 300 ms (queued 80 ms)
    let second = coordinator
        .post_ok("/requests/enqueue", json!({"sessionId": "dev", "prompt": "two"}))
        .await["requestId"]
        .as_str()
        .unwrap_or("")
        .to_string();
    coordinator.clock().advance(Duration::from_millis(80));
    coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
    coordinator.clock().advance(Duration::from_millis(220));
    coordinator
        .post_ok(&format!("/requests/{second}/fail"), json!({"message": "planner crashed"}))
        .await;

    let slo = &coordinator.get("/system/status").await.1["slo"];
    assert_eq!(slo["windowHours"], 24);
    assert_eq!(slo["requests"]["terminal"], 2);
    assert_eq!(slo["requests"]["completed"], 1);
    assert_eq!(slo["requests"]["failed"], 1);
    assert_eq!(slo["requests"]["successRate"], 0.5);
    assert_eq!(slo["requests"]["durationMs"]["p50"], 100);
    assert_eq!(slo["requests"]["durationMs"]["p95"], 300);
    assert_eq!(slo["requests"]["durationMs"]["avg"], 200);
    assert_eq!(slo["requests"]["durationMs"]["sampleSize"], 2);
    assert_eq!(slo["requests"]["queueWaitMs"]["p50"], 40);
    assert_eq!(slo["requests"]["queueWaitMs"]["p95"], 80);
    assert_eq!(slo["requests"]["queueWaitMs"]["avg"], 60);
}

#[tokio::test]
async fn empty_window_is_all_null() {
    let coordinator = Coordinator::start();

    let slo = &coordinator.get("/system/status").await.1["slo"];
    assert_eq!(slo["jobs"]["terminal"], 0);
    assert!(slo["jobs"]["durationMs"]["p50"].is_null());
    assert!(slo["jobs"]["durationMs"]["avg"].is_null());
    assert_eq!(slo["jobs"]["durationMs"]["sampleSize"], 0);
}

#[tokio::test]
async fn old_rows_age_out_of_the_window() {
    let coordinator = Coordinator::start();

    let id = coordinator
        .post_ok("/requests/enqueue", json!({"sessionId": "dev", "prompt": "old"}))
        .await["requestId"]
        .as_str()
        .unwrap_or("")
        .to_string();
    coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
    coordinator.post_ok(&format!("/requests/{id}/complete"), json!({})).await;

    coordinator.clock().advance(Duration::from_secs(25 * 3600));
    let slo = &coordinator.get("/system/status").await.1["slo"];
    assert_eq!(slo["requests"]["terminal"], 0);
}
