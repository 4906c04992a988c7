// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Full pipeline specs: message → request → job → completion.

use crate::prelude::Coordinator;
use axum::http::StatusCode;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn priority_ordering_across_claims() {
    let coordinator = Coordinator::start();

    coordinator
        .post_ok(
            "/requests/enqueue",
            json!({"sessionId": "dev", "prompt": "A", "priority": "normal"}),
        )
        .await;
    coordinator
        .post_ok(
            "/requests/enqueue",
            json!({"sessionId": "dev", "prompt": "B", "priority": "background"}),
        )
        .await;
    let interactive = coordinator
        .post_ok(
            "/requests/enqueue",
            json!({"sessionId": "dev", "prompt": "C", "priority": "interactive"}),
        )
        .await;
    assert_eq!(interactive["queuePosition"], 1);
    assert_eq!(interactive["etaMs"], 0);

    let mut prompts = Vec::new();
    for _ in 0..3 {
        let body = coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
        prompts.push(body["claimed"]["request"]["prompt"].as_str().unwrap_or("").to_string());
    }
    assert_eq!(prompts, vec!["C", "A", "B"]);

    let empty = coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
    assert!(empty["claimed"].is_null());
}

#[tokio::test]
async fn message_to_committed_round_trip() {
    let coordinator = Coordinator::start();

    // Client message opens the session
    let message =
        coordinator.post_ok("/sessions/dev/message", json!({"text": "fix the bug"})).await;
    assert_eq!(message["cursor"], 1);

    // Planner picks up the request and enqueues a job
    coordinator
        .post_ok("/requests/enqueue", json!({"sessionId": "dev", "prompt": "fix the bug"}))
        .await;
    let claimed = coordinator.post_ok("/requests/claim", json!({"agentId": "planner"})).await;
    let request_id = claimed["claimed"]["request"]["id"].as_str().unwrap_or("").to_string();

    let job = coordinator
        .post_ok(
            "/jobs/enqueue",
            json!({
                "sessionId": "dev",
                "taskId": "task-1",
                "kind": "code",
                "params": {"branch": "main"}
            }),
        )
        .await;
    let job_id = job["jobId"].as_str().unwrap_or("").to_string();
    coordinator
        .post_ok(&format!("/requests/{request_id}/complete"), json!({"result": {"jobs": 1}}))
        .await;

    // Worker heartbeats, claims, streams a log line, completes
    coordinator.post_ok("/workers/heartbeat", json!({"workerId": "w1"})).await;
    let claimed_job = coordinator.post_ok("/jobs/claim", json!({"workerId": "w1"})).await;
    assert_eq!(claimed_job["claimed"]["job"]["id"], job_id.as_str());
    assert_eq!(claimed_job["claimed"]["job"]["attemptCount"], 1);

    coordinator
        .post_ok(
            &format!("/jobs/{job_id}/log"),
            json!({"stream": "stdout", "seq": 1, "message": "tests passed"}),
        )
        .await;
    let logs = coordinator.get(&format!("/jobs/{job_id}/logs")).await.1;
    assert_eq!(logs["lines"][0]["message"], "tests passed");

    coordinator
        .post_ok(
            &format!("/jobs/{job_id}/complete"),
            json!({"summary": "patched", "durationMs": 1500}),
        )
        .await;

    // Worker hands its commit to the source-control manager
    let completion = coordinator
        .post_ok(
            "/completions/enqueue",
            json!({
                "jobId": job_id,
                "sessionId": "dev",
                "commitSha": "deadbeef",
                "branch": "pushpals/task-1",
                "message": "fix the bug"
            }),
        )
        .await;
    let completion_id = completion["completionId"].as_str().unwrap_or("").to_string();

    let claimed_completion =
        coordinator.post_ok("/completions/claim", json!({"pusherId": "scm"})).await;
    assert_eq!(claimed_completion["claimed"]["commitSha"], "deadbeef");

    let processed =
        coordinator.post_ok(&format!("/completions/{completion_id}/processed"), json!({})).await;
    assert_eq!(processed["status"], "processed");

    // Integration lands as a committed event on the bus
    coordinator
        .post_ok(
            "/sessions/dev/command",
            json!({
                "type": "committed",
                "payload": {"commitSha": "deadbeef", "branch": "main"},
                "from": "source-control-manager"
            }),
        )
        .await;

    // Status reflects the terminal pipeline
    let status = coordinator.get("/system/status").await.1;
    assert_eq!(status["requests"]["completed"], 1);
    assert_eq!(status["jobs"]["completed"], 1);
    assert_eq!(status["completions"]["processed"], 1);
    assert_eq!(status["workers"]["total"], 1);
}

#[tokio::test]
async fn stale_claim_recovery_over_http() {
    let coordinator = Coordinator::start();

    coordinator
        .post_ok("/workers/heartbeat", json!({"workerId": "w1", "status": "idle"}))
        .await;
    let job = coordinator
        .post_ok("/jobs/enqueue", json!({"sessionId": "dev", "taskId": "t1", "kind": "code"}))
        .await;
    let job_id = job["jobId"].as_str().unwrap_or("").to_string();

    let claimed = coordinator.post_ok("/jobs/claim", json!({"workerId": "w1"})).await;
    assert_eq!(claimed["claimed"]["job"]["attemptCount"], 1);

    // No more heartbeats; the worker TTL passes
    coordinator.clock().advance(Duration::from_secs(121));

    // The next claim sweeps, releases, and re-hands the job out
    let reclaimed = coordinator.post_ok("/jobs/claim", json!({"workerId": "w2"})).await;
    assert_eq!(reclaimed["claimed"]["job"]["id"], job_id.as_str());
    assert_eq!(reclaimed["claimed"]["job"]["attemptCount"], 2);
}

#[tokio::test]
async fn terminal_op_on_wrong_state_is_rejected_without_mutation() {
    let coordinator = Coordinator::start();

    let job = coordinator
        .post_ok("/jobs/enqueue", json!({"sessionId": "dev", "taskId": "t1", "kind": "code"}))
        .await;
    let job_id = job["jobId"].as_str().unwrap_or("").to_string();

    let (status, body) = coordinator
        .post(&format!("/jobs/{job_id}/fail"), json!({"message": "premature"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not in claimed state");

    let system = coordinator.get("/system/status").await.1;
    assert_eq!(system["jobs"]["pending"], 1);
    assert_eq!(system["jobs"]["failed"], 0);
}

#[tokio::test]
async fn duplicate_log_seq_is_idempotent() {
    let coordinator = Coordinator::start();

    let job = coordinator
        .post_ok("/jobs/enqueue", json!({"sessionId": "dev", "taskId": "t1", "kind": "code"}))
        .await;
    let job_id = job["jobId"].as_str().unwrap_or("").to_string();

    let first = coordinator
        .post_ok(
            &format!("/jobs/{job_id}/log"),
            json!({"stream": "stdout", "seq": 1, "message": "hello"}),
        )
        .await;
    assert_eq!(first["id"], 1);

    let duplicate = coordinator
        .post_ok(
            &format!("/jobs/{job_id}/log"),
            json!({"stream": "stdout", "seq": 1, "message": "hello again"}),
        )
        .await;
    assert_eq!(duplicate["ok"], true);
    assert!(duplicate["id"].is_null());

    let logs = coordinator.get(&format!("/jobs/{job_id}/logs")).await.1;
    assert_eq!(logs["lines"].as_array().map(Vec::len), Some(1));
}
