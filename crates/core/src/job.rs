// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executable jobs claimed by worker daemons, plus their log tails.

use crate::clock::elapsed_ms;
use crate::priority::Priority;
use crate::queue::QueueStatus;
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

/// One row in the job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub task_id: String,
    pub session_id: SessionId,
    pub kind: String,
    /// Opaque JSON object interpreted by the executing worker.
    pub params: Value,
    pub priority: Priority,
    pub status: QueueStatus,
    /// Insertion sequence for FIFO ordering among equal (priority, enqueuedAt).
    #[serde(default)]
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// Execution attempts, starting at 1. Incremented by stale-claim
    /// recovery. Uncapped.
    pub attempt_count: u32,
}

impl Job {
    pub fn new(
        session_id: SessionId,
        task_id: impl Into<String>,
        kind: impl Into<String>,
        params: Value,
        priority: Priority,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::new(),
            task_id: task_id.into(),
            session_id,
            kind: kind.into(),
            params,
            priority,
            status: QueueStatus::Pending,
            seq: 0,
            worker_id: None,
            summary: None,
            artifacts: None,
            error: None,
            message: None,
            detail: None,
            enqueued_at,
            claimed_at: None,
            completed_at: None,
            failed_at: None,
            duration_ms: None,
            attempt_count: 1,
        }
    }

    pub fn terminal_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.failed_at)
    }

    pub fn queue_wait_ms(&self) -> Option<u64> {
        self.claimed_at.map(|c| elapsed_ms(self.enqueued_at, c))
    }

    /// Ordering key for head selection: priority rank, enqueue time, insertion order.
    pub fn order_key(&self) -> (u8, DateTime<Utc>, u64) {
        (self.priority.rank(), self.enqueued_at, self.seq)
    }
}

/// Output stream a log line was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogStream {
    Stdout,
    Stderr,
}

crate::simple_display! {
    LogStream {
        Stdout => "stdout",
        Stderr => "stderr",
    }
}

/// One stored job log line.
///
/// `id` is monotonic per job (assigned by the store); `seq` is the
/// worker-supplied per-(job, stream) sequence used for idempotence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLogLine {
    pub id: u64,
    pub job_id: JobId,
    pub stream: LogStream,
    pub seq: u64,
    pub message: String,
    pub ts: DateTime<Utc>,
}
