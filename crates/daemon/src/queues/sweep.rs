// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stale-claim recovery.
//!
//! A claimed job whose worker is unknown or offline past the TTL goes
//! back to pending, and the session is told via one `job_failed` event.
//! The release is a compare-and-swap on (job, status, worker), so racing
//! sweepers recover each stale claim at most once.

use crate::ctx::{Config, CoreInner};
use crate::hub;
use pp_core::envelope::JobFailurePayload;
use pp_core::{Clock, Envelope, EventBody, JobId, QueueStatus, SessionId};
use pp_storage::{LedgerEvent, StoreError};
use tracing::info;

/// Routing tag on recovery events.
pub const STALE_CLAIM_FROM: &str = "server:stale-claim-recovery";

/// Canonical user-visible message for a lost worker.
pub const STALE_CLAIM_MESSAGE: &str = "Worker disappeared during job execution";

/// Run one sweep if the rate limit allows. Returns recovered-job count.
pub(crate) fn run_locked<C: Clock>(
    inner: &mut CoreInner,
    clock: &C,
    cfg: &Config,
) -> Result<usize, StoreError> {
    let now_ms = clock.epoch_ms();
    if inner.last_sweep_ms != 0
        && now_ms.saturating_sub(inner.last_sweep_ms) < cfg.sweep_interval_ms
    {
        return Ok(0);
    }
    inner.last_sweep_ms = now_ms;

    let now = clock.now_utc();
    let stale: Vec<(JobId, String, SessionId)> = inner
        .store
        .state()
        .jobs
        .values()
        .filter(|job| job.status == QueueStatus::Claimed)
        .filter_map(|job| {
            let worker_id = job.worker_id.clone()?;
            let lost = match inner.store.state().workers.get(&worker_id) {
                Some(worker) => !worker.is_online(now, cfg.worker_ttl_ms),
                None => true,
            };
            lost.then(|| (job.id.clone(), worker_id, job.session_id.clone()))
        })
        .collect();

    let mut recovered = 0;
    for (job_id, worker_id, session_id) in stale {
        // Re-check under the same lock: an earlier iteration (or a racing
        // sweep before this one took the lock) may already have released it.
        let still_stale = inner
            .store
            .state()
            .jobs
            .get(job_id.as_str())
            .is_some_and(|job| {
                job.status == QueueStatus::Claimed
                    && job.worker_id.as_deref() == Some(worker_id.as_str())
            });
        if !still_stale {
            continue;
        }

        inner.store.commit(LedgerEvent::JobReleased {
            job_id: job_id.clone(),
            lost_worker_id: worker_id.clone(),
            released_at: now,
        })?;

        let envelope = Envelope::new(
            session_id,
            now,
            EventBody::JobFailed(JobFailurePayload {
                job_id: Some(job_id.to_string()),
                message: Some(STALE_CLAIM_MESSAGE.to_string()),
                detail: Some(format!("lost worker {worker_id}")),
                ..Default::default()
            }),
        )
        .from(STALE_CLAIM_FROM);
        hub::emit_locked(inner, clock, envelope)?;
        recovered += 1;
    }

    if recovered > 0 {
        info!(recovered, "stale claims recovered");
    }
    Ok(recovered)
}
