// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

mod completions;
mod jobs;
mod requests;
mod sessions;
mod workers;

use super::*;
use crate::ledger::LedgerEvent;
use chrono::{DateTime, TimeZone, Utc};
use pp_core::{
    Completion, CompletionId, CompletionStatus, Envelope, EventBody, Job, JobId, JobLogLine,
    LogStream, Priority, QueueStatus, Request, RequestId, SessionId, WorkerCapabilities,
    WorkerRecord, WorkerStatus,
};

pub(super) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single().unwrap()
}

pub(super) fn t_plus_ms(ms: i64) -> DateTime<Utc> {
    t0() + chrono::Duration::milliseconds(ms)
}

pub(super) fn appended(session: &str, cursor: u64, body: EventBody) -> LedgerEvent {
    LedgerEvent::EventAppended {
        cursor,
        envelope: Envelope::new(SessionId::new(session), t0(), body),
    }
}

pub(super) fn request_row(id: &str, priority: Priority) -> Request {
    let mut request = Request::new(SessionId::new("dev"), "prompt", priority, 90_000, t0());
    request.id = RequestId::from_string(id);
    request
}

pub(super) fn job_row(id: &str, priority: Priority) -> Job {
    let mut job = Job::new(
        SessionId::new("dev"),
        "task-1",
        "code",
        serde_json::json!({}),
        priority,
        t0(),
    );
    job.id = JobId::from_string(id);
    job
}

pub(super) fn completion_row(id: &str, job_id: &str) -> Completion {
    Completion {
        id: CompletionId::from_string(id),
        job_id: job_id.to_string(),
        session_id: SessionId::new("dev"),
        commit_sha: "abc123".to_string(),
        branch: "pushpals/task-1".to_string(),
        message: "apply change".to_string(),
        pr_title: None,
        pr_body: None,
        status: CompletionStatus::Pending,
        seq: 0,
        pusher_id: None,
        error: None,
        enqueued_at: t0(),
        claimed_at: None,
        processed_at: None,
        failed_at: None,
    }
}

pub(super) fn worker_row(id: &str, heartbeat_at: DateTime<Utc>) -> WorkerRecord {
    WorkerRecord {
        worker_id: id.to_string(),
        status: WorkerStatus::Idle,
        current_job_id: None,
        last_heartbeat_at: heartbeat_at,
        poll_ms: Some(2_000),
        capabilities: WorkerCapabilities::default(),
        details: None,
    }
}

pub(super) fn log_line(job_id: &str, id: u64, stream: LogStream, seq: u64, msg: &str) -> JobLogLine {
    JobLogLine {
        id,
        job_id: JobId::from_string(job_id),
        stream,
        seq,
        message: msg.to_string(),
        ts: t0(),
    }
}
