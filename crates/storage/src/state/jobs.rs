// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue and log tail event handlers.

use super::types::JOB_LOG_TAIL_MAX;
use super::MaterializedState;
use crate::ledger::LedgerEvent;
use pp_core::QueueStatus;

pub(crate) fn apply(state: &mut MaterializedState, event: &LedgerEvent) {
    match event {
        LedgerEvent::JobEnqueued { job } => {
            // Idempotency: skip if the row already exists
            state.jobs.entry(job.id.as_str().to_string()).or_insert_with(|| job.clone());
        }

        LedgerEvent::JobClaimed { job_id, worker_id, claimed_at } => {
            if let Some(row) = state.jobs.get_mut(job_id.as_str()) {
                if row.status == QueueStatus::Pending {
                    row.status = QueueStatus::Claimed;
                    row.worker_id = Some(worker_id.clone());
                    row.claimed_at = Some(*claimed_at);
                }
            }
        }

        LedgerEvent::JobCompleted { job_id, summary, artifacts, duration_ms, completed_at } => {
            if let Some(row) = state.jobs.get_mut(job_id.as_str()) {
                if row.status == QueueStatus::Claimed {
                    row.status = QueueStatus::Completed;
                    row.summary = summary.clone();
                    row.artifacts = artifacts.clone();
                    row.completed_at = Some(*completed_at);
                    row.duration_ms = Some(*duration_ms);
                }
            }
        }

        LedgerEvent::JobFailed { job_id, message, detail, duration_ms, failed_at } => {
            if let Some(row) = state.jobs.get_mut(job_id.as_str()) {
                if row.status == QueueStatus::Claimed {
                    row.status = QueueStatus::Failed;
                    row.message = Some(message.clone());
                    row.detail = detail.clone();
                    row.error = Some(message.clone());
                    row.failed_at = Some(*failed_at);
                    row.duration_ms = Some(*duration_ms);
                }
            }
        }

        LedgerEvent::JobReleased { job_id, lost_worker_id, .. } => {
            if let Some(row) = state.jobs.get_mut(job_id.as_str()) {
                // Compare-and-swap on (status, worker): only the sweep that
                // observed this worker may release, and only once.
                if row.status == QueueStatus::Claimed
                    && row.worker_id.as_deref() == Some(lost_worker_id.as_str())
                {
                    row.status = QueueStatus::Pending;
                    row.worker_id = None;
                    row.claimed_at = None;
                    row.attempt_count += 1;
                }
            }
        }

        LedgerEvent::JobLogAppended { line } => {
            let tail = state.job_logs.entry(line.job_id.as_str().to_string()).or_default();
            // Idempotency: worker seq is monotonic per (job, stream)
            if tail.is_duplicate(line.stream, line.seq) {
                return;
            }
            tail.set_last_seq(line.stream, line.seq);
            tail.next_id = tail.next_id.max(line.id + 1);
            tail.lines.push_back(line.clone());
            while tail.lines.len() > JOB_LOG_TAIL_MAX {
                tail.lines.pop_front();
            }
        }

        _ => {}
    }
}
