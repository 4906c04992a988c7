// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ledger events persisted to the write-ahead log.
//!
//! Every durable mutation is one of these facts. The materialized state
//! is derived by folding them in order; see [`crate::MaterializedState`].
//!
//! Serializes with `{"type": "domain:verb", ...fields}` format.

use chrono::{DateTime, Utc};
use pp_core::{Completion, CompletionId, Envelope, Job, JobId, JobLogLine, Request, RequestId,
    SessionId, WorkerRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Facts appended to the write-ahead ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LedgerEvent {
    // -- sessions and the event log --
    #[serde(rename = "session:created")]
    SessionCreated { session_id: SessionId, created_at: DateTime<Utc> },

    /// A bus envelope appended to its session's log at `cursor`.
    #[serde(rename = "event:appended")]
    EventAppended { cursor: u64, envelope: Envelope },

    // -- request queue --
    #[serde(rename = "request:enqueued")]
    RequestEnqueued { request: Request },

    #[serde(rename = "request:claimed")]
    RequestClaimed { request_id: RequestId, agent_id: String, claimed_at: DateTime<Utc> },

    #[serde(rename = "request:completed")]
    RequestCompleted {
        request_id: RequestId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        completed_at: DateTime<Utc>,
    },

    #[serde(rename = "request:failed")]
    RequestFailed {
        request_id: RequestId,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
        failed_at: DateTime<Utc>,
    },

    // -- job queue --
    #[serde(rename = "job:enqueued")]
    JobEnqueued { job: Job },

    #[serde(rename = "job:claimed")]
    JobClaimed { job_id: JobId, worker_id: String, claimed_at: DateTime<Utc> },

    #[serde(rename = "job:completed")]
    JobCompleted {
        job_id: JobId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        artifacts: Option<Value>,
        duration_ms: u64,
        completed_at: DateTime<Utc>,
    },

    #[serde(rename = "job:failed")]
    JobFailed {
        job_id: JobId,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
        duration_ms: u64,
        failed_at: DateTime<Utc>,
    },

    /// Stale-claim recovery: the claiming worker went offline, the job
    /// returns to pending with its attempt count bumped.
    #[serde(rename = "job:released")]
    JobReleased { job_id: JobId, lost_worker_id: String, released_at: DateTime<Utc> },

    #[serde(rename = "job:log")]
    JobLogAppended { line: JobLogLine },

    // -- worker registry --
    #[serde(rename = "worker:heartbeat")]
    WorkerHeartbeat { worker: WorkerRecord },

    // -- completion queue --
    #[serde(rename = "completion:enqueued")]
    CompletionEnqueued { completion: Completion },

    #[serde(rename = "completion:claimed")]
    CompletionClaimed { completion_id: CompletionId, pusher_id: String, claimed_at: DateTime<Utc> },

    #[serde(rename = "completion:processed")]
    CompletionProcessed { completion_id: CompletionId, processed_at: DateTime<Utc> },

    #[serde(rename = "completion:failed")]
    CompletionFailed { completion_id: CompletionId, error: String, failed_at: DateTime<Utc> },
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
