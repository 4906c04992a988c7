// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue: priority FIFO claimed by workers, plus per-job log tails.

use super::{parse_session, sweep};
use crate::ctx::{AppState, CoreInner};
use crate::http::error::ApiError;
use crate::hub;
use pp_core::envelope::{JobFailurePayload, JobRefPayload};
use pp_core::queue::NOT_IN_CLAIMED_STATE;
use pp_core::{clock::elapsed_ms, scrub, Clock, Envelope, EventBody, Job, JobLogLine, LogStream,
    Priority, QueueStatus};
use pp_storage::LedgerEvent;
use pp_wire::{
    AppendJobLogBody, AppendLogResponse, ClaimedJob, CompleteJobBody, EnqueueJobBody,
    EnqueuedJobResponse, FailBody, JobLogPage,
};
use tracing::debug;

/// Tag for job-queue originated bus events.
pub const JOB_QUEUE_FROM: &str = "server:job-queue";

/// Cap applied to user-visible failure messages.
pub const FAIL_MESSAGE_MAX: usize = 500;
/// Cap applied to user-visible failure detail.
pub const FAIL_DETAIL_MAX: usize = 2_000;

pub fn enqueue<C: Clock>(
    state: &AppState<C>,
    body: EnqueueJobBody,
) -> Result<EnqueuedJobResponse, ApiError> {
    let session_id = parse_session(&body.session_id)?;
    if body.task_id.trim().is_empty() {
        return Err(ApiError::Validation("taskId must not be empty".to_string()));
    }
    if body.kind.trim().is_empty() {
        return Err(ApiError::Validation("kind must not be empty".to_string()));
    }
    let params = body.params.unwrap_or_else(|| serde_json::json!({}));
    if !params.is_object() {
        return Err(ApiError::Validation("params must be a JSON object".to_string()));
    }
    let priority = Priority::parse_lenient(body.priority.as_deref());

    let mut inner = state.inner.lock();
    hub::ensure_session_locked(&mut inner, &state.clock, &session_id)?;

    let mut job = Job::new(
        session_id.clone(),
        body.task_id.clone(),
        body.kind.clone(),
        params,
        priority,
        state.clock.now_utc(),
    );
    job.seq = inner.store.next_seq();
    let id = job.id.clone();
    inner.store.commit(LedgerEvent::JobEnqueued { job })?;

    let envelope = Envelope::new(
        session_id,
        state.clock.now_utc(),
        EventBody::JobEnqueued(JobRefPayload {
            job_id: id.to_string(),
            task_id: Some(body.task_id),
            kind: Some(body.kind),
            ..Default::default()
        }),
    )
    .from(JOB_QUEUE_FROM);
    hub::emit_locked(&mut inner, &state.clock, envelope)?;

    let position = inner
        .store
        .state()
        .pending_jobs()
        .iter()
        .position(|j| j.id == id)
        .map(|i| i + 1)
        .unwrap_or(1);
    debug!(job = %id, %priority, position, "job enqueued");

    Ok(EnqueuedJobResponse {
        job_id: id.to_string(),
        queue_position: position,
        eta_ms: priority.eta_ms(position),
    })
}

/// Atomically claim the job-queue head for a worker. `None` when empty.
///
/// Sweeps stale claims first so a lost worker's job is reclaimable here.
pub fn claim<C: Clock>(state: &AppState<C>, worker_id: &str) -> Result<Option<ClaimedJob>, ApiError> {
    if worker_id.trim().is_empty() {
        return Err(ApiError::Validation("workerId must not be empty".to_string()));
    }

    let mut inner = state.inner.lock();
    sweep::run_locked(&mut inner, &state.clock, &state.cfg)?;

    let Some(head) = inner.store.state().pending_jobs().first().map(|j| j.id.clone()) else {
        return Ok(None);
    };

    inner.store.commit(LedgerEvent::JobClaimed {
        job_id: head.clone(),
        worker_id: worker_id.to_string(),
        claimed_at: state.clock.now_utc(),
    })?;

    let job = inner
        .store
        .state()
        .jobs
        .get(head.as_str())
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("job {head}")))?;
    let queue_wait_ms = job.queue_wait_ms().unwrap_or(0);
    debug!(job = %head, worker_id, queue_wait_ms, "job claimed");

    Ok(Some(ClaimedJob { job, queue_wait_ms }))
}

pub fn complete<C: Clock>(
    state: &AppState<C>,
    job_id: &str,
    body: CompleteJobBody,
) -> Result<Job, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status, enqueued_at) = {
        let row = get_job(&inner, job_id)?;
        (row.id.clone(), row.status, row.enqueued_at)
    };
    if status != QueueStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    let completed_at = state.clock.now_utc();
    let duration_ms = body.duration_ms.unwrap_or_else(|| elapsed_ms(enqueued_at, completed_at));
    inner.store.commit(LedgerEvent::JobCompleted {
        job_id: id,
        summary: body.summary,
        artifacts: body.artifacts,
        duration_ms,
        completed_at,
    })?;
    get_job(&inner, job_id).cloned()
}

/// Terminal failure: records the queue transition, then emits the
/// canonical `job_failed` event so subscribers learn of it even when the
/// worker itself cannot report.
pub fn fail<C: Clock>(state: &AppState<C>, job_id: &str, body: FailBody) -> Result<Job, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status, enqueued_at, session_id) = {
        let row = get_job(&inner, job_id)?;
        (row.id.clone(), row.status, row.enqueued_at, row.session_id.clone())
    };
    if status != QueueStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    let failed_at = state.clock.now_utc();
    let duration_ms = body.duration_ms.unwrap_or_else(|| elapsed_ms(enqueued_at, failed_at));
    let message = scrub::compact(&body.message, FAIL_MESSAGE_MAX);
    let detail = body.detail.as_deref().map(|d| scrub::compact(d, FAIL_DETAIL_MAX));

    inner.store.commit(LedgerEvent::JobFailed {
        job_id: id.clone(),
        message: message.clone(),
        detail: detail.clone(),
        duration_ms,
        failed_at,
    })?;

    let envelope = Envelope::new(
        session_id,
        failed_at,
        EventBody::JobFailed(JobFailurePayload {
            job_id: Some(id.to_string()),
            message: Some(message),
            detail,
            ..Default::default()
        }),
    )
    .from(JOB_QUEUE_FROM);
    hub::emit_locked(&mut inner, &state.clock, envelope)?;

    get_job(&inner, job_id).cloned()
}

/// Store one scrubbed log line. Returns `id: None` when the line was a
/// duplicate or noise and was not stored.
pub fn append_log<C: Clock>(
    state: &AppState<C>,
    job_id: &str,
    body: AppendJobLogBody,
) -> Result<AppendLogResponse, ApiError> {
    let stream = parse_stream(&body.stream)?;

    let mut inner = state.inner.lock();
    let id = {
        let row = get_job(&inner, job_id)?;
        row.id.clone()
    };

    // Idempotence on the worker-supplied (job, stream, seq)
    if inner
        .store
        .state()
        .job_logs
        .get(job_id)
        .is_some_and(|tail| tail.is_duplicate(stream, body.seq))
    {
        return Ok(AppendLogResponse { ok: true, id: None });
    }

    let message = scrub::clean_line(&body.message);
    if message.is_empty() || scrub::is_progress_noise(&message) {
        return Ok(AppendLogResponse { ok: true, id: None });
    }
    let now_ms = state.clock.epoch_ms();
    let filter = inner
        .recent_lines
        .entry((job_id.to_string(), stream))
        .or_default();
    if !filter.admit(&message, now_ms) {
        return Ok(AppendLogResponse { ok: true, id: None });
    }

    let line_id = inner.store.state().job_logs.get(job_id).map(|t| t.next_id.max(1)).unwrap_or(1);
    let line = JobLogLine {
        id: line_id,
        job_id: id,
        stream,
        seq: body.seq,
        message,
        ts: state.clock.now_utc(),
    };
    inner.store.commit(LedgerEvent::JobLogAppended { line })?;

    Ok(AppendLogResponse { ok: true, id: Some(line_id) })
}

/// Newest-first page of the bounded log tail.
pub fn list_logs<C: Clock>(
    state: &AppState<C>,
    job_id: &str,
    limit: usize,
    after_id: Option<u64>,
) -> Result<JobLogPage, ApiError> {
    let inner = state.inner.lock();
    get_job(&inner, job_id)?;

    let after = after_id.unwrap_or(0);
    let mut lines: Vec<JobLogLine> = inner
        .store
        .state()
        .job_logs
        .get(job_id)
        .map(|tail| tail.lines.iter().filter(|l| l.id > after).cloned().collect())
        .unwrap_or_default();

    // Keep the newest `limit`, presented newest-first
    if lines.len() > limit {
        lines.drain(..lines.len() - limit);
    }
    let last_id = lines.last().map(|l| l.id);
    lines.reverse();

    Ok(JobLogPage { lines, last_id })
}

fn get_job<'a>(inner: &'a CoreInner, job_id: &str) -> Result<&'a Job, ApiError> {
    inner
        .store
        .state()
        .jobs
        .get(job_id)
        .ok_or_else(|| ApiError::NotFound(format!("job {job_id}")))
}

fn parse_stream(raw: &str) -> Result<LogStream, ApiError> {
    match raw {
        "stdout" => Ok(LogStream::Stdout),
        "stderr" => Ok(LogStream::Stderr),
        other => Err(ApiError::Validation(format!("unknown stream: {other}"))),
    }
}

#[cfg(test)]
#[path = "jobs_tests.rs"]
mod tests;
