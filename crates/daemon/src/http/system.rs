// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health and aggregated system status.

use super::error::ApiError;
use crate::ctx::AppState;
use crate::slo;
use axum::extract::State;
use axum::Json;
use pp_core::{Clock, CompletionStatus, QueueStatus, WorkerStatus, PROTOCOL_VERSION};
use pp_wire::{
    CompletionCounts, HealthResponse, QueueCounts, SystemStatus, WorkerCounts,
};

/// Pending rows included in the status snapshot.
const SNAPSHOT_LIMIT: usize = 10;

pub async fn healthz<C: Clock>(State(_state): State<AppState<C>>) -> Json<HealthResponse> {
    Json(HealthResponse { ok: true, protocol_version: PROTOCOL_VERSION.to_string() })
}

pub async fn status<C: Clock>(
    State(state): State<AppState<C>>,
) -> Result<Json<SystemStatus>, ApiError> {
    state.sweep()?;
    let slo = slo::report(&state, slo::DEFAULT_WINDOW_HOURS);

    let inner = state.inner.lock();
    let store_state = inner.store.state();
    let now = state.clock.now_utc();

    let mut workers = WorkerCounts { total: 0, online: 0, busy: 0 };
    for worker in store_state.workers.values() {
        workers.total += 1;
        if worker.is_online(now, state.cfg.online_ttl_ms) {
            workers.online += 1;
        }
        if worker.status == WorkerStatus::Busy {
            workers.busy += 1;
        }
    }

    let mut requests = QueueCounts::default();
    for row in store_state.requests.values() {
        match row.status {
            QueueStatus::Pending => requests.pending += 1,
            QueueStatus::Claimed => requests.claimed += 1,
            QueueStatus::Completed => requests.completed += 1,
            QueueStatus::Failed => requests.failed += 1,
        }
    }

    let mut jobs = QueueCounts::default();
    for row in store_state.jobs.values() {
        match row.status {
            QueueStatus::Pending => jobs.pending += 1,
            QueueStatus::Claimed => jobs.claimed += 1,
            QueueStatus::Completed => jobs.completed += 1,
            QueueStatus::Failed => jobs.failed += 1,
        }
    }

    let mut completions = CompletionCounts::default();
    for row in store_state.completions.values() {
        match row.status {
            CompletionStatus::Pending => completions.pending += 1,
            CompletionStatus::Claimed => completions.claimed += 1,
            CompletionStatus::Processed => completions.processed += 1,
            CompletionStatus::Failed => completions.failed += 1,
        }
    }

    let pending_requests =
        store_state.pending_requests().into_iter().take(SNAPSHOT_LIMIT).cloned().collect();
    let pending_jobs =
        store_state.pending_jobs().into_iter().take(SNAPSHOT_LIMIT).cloned().collect();

    Ok(Json(SystemStatus {
        ok: true,
        protocol_version: PROTOCOL_VERSION.to_string(),
        uptime_ms: state.uptime_ms(),
        workers,
        requests,
        jobs,
        completions,
        pending_requests,
        pending_jobs,
        slo,
    }))
}
