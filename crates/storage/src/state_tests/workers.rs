// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn heartbeat_upserts_row() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::WorkerHeartbeat { worker: worker_row("w1", t0()) });

    assert!(state.workers.contains_key("w1"));
    assert_eq!(state.workers["w1"].status, WorkerStatus::Idle);
}

#[test]
fn later_heartbeat_replaces_row() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::WorkerHeartbeat { worker: worker_row("w1", t0()) });

    let mut busy = worker_row("w1", t_plus_ms(5_000));
    busy.status = WorkerStatus::Busy;
    busy.current_job_id = Some("j1".to_string());
    state.apply(&LedgerEvent::WorkerHeartbeat { worker: busy });

    assert_eq!(state.workers.len(), 1);
    assert_eq!(state.workers["w1"].status, WorkerStatus::Busy);
    assert_eq!(state.workers["w1"].current_job_id.as_deref(), Some("j1"));
    assert_eq!(state.workers["w1"].last_heartbeat_at, t_plus_ms(5_000));
}

#[test]
fn workers_are_independent() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::WorkerHeartbeat { worker: worker_row("w1", t0()) });
    state.apply(&LedgerEvent::WorkerHeartbeat { worker: worker_row("w2", t0()) });

    assert_eq!(state.workers.len(), 2);
}
