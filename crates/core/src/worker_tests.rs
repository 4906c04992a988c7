// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{Clock, FakeClock};
use std::time::Duration;

fn record(clock: &FakeClock) -> WorkerRecord {
    WorkerRecord {
        worker_id: "w1".into(),
        status: WorkerStatus::Idle,
        current_job_id: None,
        last_heartbeat_at: clock.now_utc(),
        poll_ms: Some(2_000),
        capabilities: WorkerCapabilities::default(),
        details: None,
    }
}

#[test]
fn online_within_ttl() {
    let clock = FakeClock::new();
    let worker = record(&clock);
    clock.advance(Duration::from_secs(10));
    assert!(worker.is_online(clock.now_utc(), ONLINE_TTL_MS));
}

#[test]
fn offline_past_ttl() {
    let clock = FakeClock::new();
    let worker = record(&clock);
    clock.advance(Duration::from_secs(16));
    assert!(!worker.is_online(clock.now_utc(), ONLINE_TTL_MS));
}

#[test]
fn online_exactly_at_ttl_boundary() {
    let clock = FakeClock::new();
    let worker = record(&clock);
    clock.advance(Duration::from_millis(ONLINE_TTL_MS));
    assert!(worker.is_online(clock.now_utc(), ONLINE_TTL_MS));
}

#[test]
fn heartbeat_in_the_future_counts_as_online() {
    let clock = FakeClock::new();
    let now = clock.now_utc();
    clock.advance(Duration::from_secs(5));
    let worker = record(&clock);
    assert!(worker.is_online(now, ONLINE_TTL_MS));
}

#[test]
fn capabilities_default_shape() {
    let caps: WorkerCapabilities = serde_json::from_str("{}").unwrap();
    assert!(!caps.docker);
    assert!(caps.labels.is_empty());
    assert!(caps.executor.is_none());
}
