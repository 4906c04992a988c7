// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry: heartbeats and liveness listing.

use super::sweep;
use crate::ctx::AppState;
use crate::http::error::ApiError;
use pp_core::{Clock, WorkerRecord, WorkerStatus};
use pp_storage::LedgerEvent;
use pp_wire::{HeartbeatBody, OkResponse, WorkerEntry, WorkersResponse};

pub fn heartbeat<C: Clock>(
    state: &AppState<C>,
    body: HeartbeatBody,
) -> Result<OkResponse, ApiError> {
    if body.worker_id.trim().is_empty() {
        return Err(ApiError::Validation("workerId must not be empty".to_string()));
    }

    let worker = WorkerRecord {
        worker_id: body.worker_id,
        status: parse_status(body.status.as_deref()),
        current_job_id: body.current_job_id,
        last_heartbeat_at: state.clock.now_utc(),
        poll_ms: body.poll_ms,
        capabilities: body.capabilities.unwrap_or_default(),
        details: body.details,
    };

    let mut inner = state.inner.lock();
    inner.store.commit(LedgerEvent::WorkerHeartbeat { worker })?;
    Ok(OkResponse { ok: true })
}

/// Every registered worker with its derived online flag.
///
/// Listing also runs the stale-claim sweep so operators polling
/// `/workers` keep recovery moving even without active claimants.
pub fn list<C: Clock>(state: &AppState<C>) -> Result<WorkersResponse, ApiError> {
    let mut inner = state.inner.lock();
    sweep::run_locked(&mut inner, &state.clock, &state.cfg)?;

    let now = state.clock.now_utc();
    let mut workers: Vec<WorkerEntry> = inner
        .store
        .state()
        .workers
        .values()
        .map(|worker| WorkerEntry {
            worker: worker.clone(),
            is_online: worker.is_online(now, state.cfg.online_ttl_ms),
        })
        .collect();
    workers.sort_by(|a, b| a.worker.worker_id.cmp(&b.worker.worker_id));

    Ok(WorkersResponse { workers })
}

fn parse_status(raw: Option<&str>) -> WorkerStatus {
    match raw {
        Some("busy") => WorkerStatus::Busy,
        Some("error") => WorkerStatus::Error,
        Some("offline") => WorkerStatus::Offline,
        _ => WorkerStatus::Idle,
    }
}

#[cfg(test)]
#[path = "workers_tests.rs"]
mod tests;
