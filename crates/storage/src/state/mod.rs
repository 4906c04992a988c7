// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Materialized state from ledger replay

mod completions;
mod jobs;
mod requests;
mod sessions;
mod types;
mod workers;

pub use types::{JobLogTail, SessionState, StoredEvent, JOB_LOG_TAIL_MAX};

use crate::ledger::LedgerEvent;
use pp_core::{Completion, Job, Request, WorkerRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Materialized state built from ledger replay
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MaterializedState {
    pub sessions: HashMap<String, SessionState>,
    #[serde(default)]
    pub requests: HashMap<String, Request>,
    #[serde(default)]
    pub jobs: HashMap<String, Job>,
    /// Bounded per-job log tails, keyed by job id.
    #[serde(default)]
    pub job_logs: HashMap<String, JobLogTail>,
    #[serde(default)]
    pub workers: HashMap<String, WorkerRecord>,
    #[serde(default)]
    pub completions: HashMap<String, Completion>,
}

impl MaterializedState {
    /// Apply a ledger event to derive state changes.
    ///
    /// This is the event-sourcing approach where state is derived from
    /// events. Events are facts about what happened; state is derived
    /// from those facts.
    ///
    /// # Idempotency Requirement
    ///
    /// **All event handlers MUST be idempotent.** Applying the same event
    /// twice must produce the same state as applying it once, because a
    /// checkpoint race can leave an entry both inside the snapshot and in
    /// the replayed ledger tail.
    ///
    /// Guidelines for idempotent handlers:
    /// - Guard inserts with existence checks
    /// - Guard transitions with current-status checks (the same check that
    ///   makes `claim` a compare-and-swap)
    /// - Guard counters so they only move on a real state transition
    pub fn apply(&mut self, event: &LedgerEvent) {
        match event {
            // Sessions and the event log
            LedgerEvent::SessionCreated { .. } | LedgerEvent::EventAppended { .. } => {
                sessions::apply(self, event)
            }

            // Request queue
            LedgerEvent::RequestEnqueued { .. }
            | LedgerEvent::RequestClaimed { .. }
            | LedgerEvent::RequestCompleted { .. }
            | LedgerEvent::RequestFailed { .. } => requests::apply(self, event),

            // Job queue and log tails
            LedgerEvent::JobEnqueued { .. }
            | LedgerEvent::JobClaimed { .. }
            | LedgerEvent::JobCompleted { .. }
            | LedgerEvent::JobFailed { .. }
            | LedgerEvent::JobReleased { .. }
            | LedgerEvent::JobLogAppended { .. } => jobs::apply(self, event),

            // Worker registry
            LedgerEvent::WorkerHeartbeat { .. } => workers::apply(self, event),

            // Completion queue
            LedgerEvent::CompletionEnqueued { .. }
            | LedgerEvent::CompletionClaimed { .. }
            | LedgerEvent::CompletionProcessed { .. }
            | LedgerEvent::CompletionFailed { .. } => completions::apply(self, event),
        }
    }

    /// Next cursor for a session (1 for a fresh log).
    pub fn next_cursor(&self, session_id: &str) -> u64 {
        self.latest_cursor(session_id) + 1
    }

    /// Latest assigned cursor for a session (0 if none).
    pub fn latest_cursor(&self, session_id: &str) -> u64 {
        self.sessions.get(session_id).map(|s| s.latest_cursor).unwrap_or(0)
    }

    /// Stored events with `cursor > after`, in cursor order.
    pub fn events_after(&self, session_id: &str, after: u64) -> &[StoredEvent] {
        let Some(session) = self.sessions.get(session_id) else {
            return &[];
        };
        let start = (after as usize).min(session.events.len());
        &session.events[start..]
    }

    /// Pending requests in head-selection order.
    pub fn pending_requests(&self) -> Vec<&Request> {
        let mut rows: Vec<&Request> = self
            .requests
            .values()
            .filter(|r| r.status == pp_core::QueueStatus::Pending)
            .collect();
        rows.sort_by_key(|r| r.order_key());
        rows
    }

    /// Pending jobs in head-selection order.
    pub fn pending_jobs(&self) -> Vec<&Job> {
        let mut rows: Vec<&Job> = self
            .jobs
            .values()
            .filter(|j| j.status == pp_core::QueueStatus::Pending)
            .collect();
        rows.sort_by_key(|j| j.order_key());
        rows
    }

    /// Pending completions in FIFO order.
    pub fn pending_completions(&self) -> Vec<&Completion> {
        let mut rows: Vec<&Completion> = self
            .completions
            .values()
            .filter(|c| c.status == pp_core::CompletionStatus::Pending)
            .collect();
        rows.sort_by_key(|c| (c.enqueued_at, c.seq));
        rows
    }
}

#[cfg(test)]
#[path = "../state_tests/mod.rs"]
mod tests;
