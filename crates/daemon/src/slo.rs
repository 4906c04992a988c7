// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rolling-window SLO summarization over terminal queue rows.

use crate::ctx::AppState;
use chrono::{DateTime, Duration, Utc};
use pp_core::{metrics, Clock, QueueStatus};
use pp_wire::{QueueSlo, SloReport};

/// Default reporting window.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

struct TerminalSample {
    completed: bool,
    duration_ms: Option<u64>,
    queue_wait_ms: Option<u64>,
}

/// Summarize requests and jobs terminal within the last `window_hours`.
pub fn report<C: Clock>(state: &AppState<C>, window_hours: u32) -> SloReport {
    let cutoff = state.clock.now_utc() - Duration::hours(window_hours as i64);
    let inner = state.inner.lock();
    let store_state = inner.store.state();

    let requests = build(
        store_state
            .requests
            .values()
            .filter_map(|r| in_window(r.status, r.terminal_at(), cutoff).then(|| TerminalSample {
                completed: r.status == QueueStatus::Completed,
                duration_ms: r.duration_ms,
                queue_wait_ms: r.queue_wait_ms(),
            })),
    );
    let jobs = build(
        store_state
            .jobs
            .values()
            .filter_map(|j| in_window(j.status, j.terminal_at(), cutoff).then(|| TerminalSample {
                completed: j.status == QueueStatus::Completed,
                duration_ms: j.duration_ms,
                queue_wait_ms: j.queue_wait_ms(),
            })),
    );

    SloReport { window_hours, requests, jobs }
}

fn in_window(status: QueueStatus, terminal_at: Option<DateTime<Utc>>, cutoff: DateTime<Utc>) -> bool {
    status.is_terminal() && terminal_at.is_some_and(|t| t >= cutoff)
}

fn build(samples: impl Iterator<Item = TerminalSample>) -> QueueSlo {
    let mut completed = 0usize;
    let mut failed = 0usize;
    let mut durations = Vec::new();
    let mut waits = Vec::new();
    for sample in samples {
        if sample.completed {
            completed += 1;
        } else {
            failed += 1;
        }
        if let Some(d) = sample.duration_ms {
            durations.push(d);
        }
        if let Some(w) = sample.queue_wait_ms {
            waits.push(w);
        }
    }
    QueueSlo {
        terminal: completed + failed,
        completed,
        failed,
        success_rate: metrics::success_rate(completed, failed),
        duration_ms: metrics::summarize(&durations),
        queue_wait_ms: metrics::summarize(&waits),
    }
}

#[cfg(test)]
#[path = "slo_tests.rs"]
mod tests;
