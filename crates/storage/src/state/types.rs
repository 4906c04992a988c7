// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure type definitions for materialized state records.

use chrono::{DateTime, Utc};
use pp_core::{Envelope, JobLogLine, LogStream, SessionId, TaskState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Most recent log lines retained per job.
pub const JOB_LOG_TAIL_MAX: usize = 200;

/// One event at its assigned position in a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub cursor: u64,
    pub envelope: Envelope,
}

/// Session record: the event log plus projections folded from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    /// Cursor of the newest event (0 for an empty log). Cursors are dense,
    /// so `events[n]` always holds cursor `n + 1`.
    pub latest_cursor: u64,
    pub events: Vec<StoredEvent>,
    /// Task projection folded from `task_*` events. Derived state — kept
    /// in the snapshot only as a cache of the fold.
    #[serde(default)]
    pub tasks: HashMap<String, TaskState>,
    /// Required agents that have reported online so far.
    #[serde(default)]
    pub ready_agents: BTreeSet<String>,
    /// Whether the one-time ready announcement was already emitted.
    #[serde(default)]
    pub ready_emitted: bool,
}

impl SessionState {
    pub fn new(id: SessionId, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at,
            latest_cursor: 0,
            events: Vec::new(),
            tasks: HashMap::new(),
            ready_agents: BTreeSet::new(),
            ready_emitted: false,
        }
    }
}

/// Bounded tail of log lines for one job.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct JobLogTail {
    /// Next store-assigned line id (monotonic per job, starts at 1).
    pub next_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stdout_seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_stderr_seq: Option<u64>,
    pub lines: VecDeque<JobLogLine>,
}

impl JobLogTail {
    pub fn last_seq(&self, stream: LogStream) -> Option<u64> {
        match stream {
            LogStream::Stdout => self.last_stdout_seq,
            LogStream::Stderr => self.last_stderr_seq,
        }
    }

    pub fn set_last_seq(&mut self, stream: LogStream, seq: u64) {
        match stream {
            LogStream::Stdout => self.last_stdout_seq = Some(seq),
            LogStream::Stderr => self.last_stderr_seq = Some(seq),
        }
    }

    /// A worker-supplied seq is fresh unless it is at or below the last
    /// accepted seq for its stream.
    pub fn is_duplicate(&self, stream: LogStream, seq: u64) -> bool {
        self.last_seq(stream).is_some_and(|last| seq <= last)
    }
}
