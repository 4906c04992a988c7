// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::ctx::test_state;
use crate::queues::requests;
use pp_wire::{CompleteRequestBody, EnqueueRequestBody, FailBody};
use std::time::Duration as StdDuration;
use tempfile::tempdir;

fn enqueue_body(prompt: &str) -> EnqueueRequestBody {
    EnqueueRequestBody {
        session_id: "dev".to_string(),
        prompt: prompt.to_string(),
        priority: None,
        queue_wait_budget_ms: None,
    }
}

#[test]
fn empty_store_yields_null_summaries() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let slo = report(&state, DEFAULT_WINDOW_HOURS);
    assert_eq!(slo.requests.terminal, 0);
    assert_eq!(slo.requests.success_rate, 0.0);
    assert_eq!(slo.requests.duration_ms.sample_size, 0);
    assert!(slo.requests.duration_ms.p50.is_none());
    assert!(slo.jobs.queue_wait_ms.avg.is_none());
}

// Scenario S6: one request completed in 100 ms after 40 ms queued, one
// failed in 300 ms after 80 ms queued.
#[test]
fn two_terminal_requests_match_expected_summary() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let first = requests::enqueue(&state, enqueue_body("one")).unwrap().request_id;
    state.clock.advance(StdDuration::from_millis(40));
    requests::claim(&state, "planner").unwrap().unwrap();
    state.clock.advance(StdDuration::from_millis(60));
    requests::complete(&state, &first, CompleteRequestBody::default()).unwrap();

    let second = requests::enqueue(&state, enqueue_body("two")).unwrap().request_id;
    state.clock.advance(StdDuration::from_millis(80));
    requests::claim(&state, "planner").unwrap().unwrap();
    state.clock.advance(StdDuration::from_millis(220));
    requests::fail(
        &state,
        &second,
        FailBody { message: "boom".into(), detail: None, duration_ms: None },
    )
    .unwrap();

    let slo = report(&state, 24);
    assert_eq!(slo.window_hours, 24);
    assert_eq!(slo.requests.terminal, 2);
    assert_eq!(slo.requests.completed, 1);
    assert_eq!(slo.requests.failed, 1);
    assert!((slo.requests.success_rate - 0.5).abs() < f64::EPSILON);

    assert_eq!(slo.requests.duration_ms.p50, Some(100));
    assert_eq!(slo.requests.duration_ms.p95, Some(300));
    assert_eq!(slo.requests.duration_ms.avg, Some(200));
    assert_eq!(slo.requests.duration_ms.sample_size, 2);

    assert_eq!(slo.requests.queue_wait_ms.p50, Some(40));
    assert_eq!(slo.requests.queue_wait_ms.p95, Some(80));
    assert_eq!(slo.requests.queue_wait_ms.avg, Some(60));
    assert_eq!(slo.requests.queue_wait_ms.sample_size, 2);
}

#[test]
fn rows_outside_window_are_excluded() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    let old = requests::enqueue(&state, enqueue_body("old")).unwrap().request_id;
    requests::claim(&state, "planner").unwrap().unwrap();
    requests::complete(&state, &old, CompleteRequestBody::default()).unwrap();

    // Two days later, a fresh terminal row
    state.clock.advance(StdDuration::from_secs(48 * 3600));
    let fresh = requests::enqueue(&state, enqueue_body("fresh")).unwrap().request_id;
    requests::claim(&state, "planner").unwrap().unwrap();
    requests::complete(&state, &fresh, CompleteRequestBody::default()).unwrap();

    let slo = report(&state, 24);
    assert_eq!(slo.requests.terminal, 1);
    assert_eq!(slo.requests.completed, 1);
}

#[test]
fn pending_and_claimed_rows_are_not_counted() {
    let dir = tempdir().unwrap();
    let state = test_state(dir.path());

    requests::enqueue(&state, enqueue_body("pending")).unwrap();
    requests::enqueue(&state, enqueue_body("claimed")).unwrap();
    requests::claim(&state, "planner").unwrap().unwrap();

    let slo = report(&state, 24);
    assert_eq!(slo.requests.terminal, 0);
}
