// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion queue: FIFO of worker-produced commits awaiting integration.

use super::parse_session;
use crate::ctx::{AppState, CoreInner};
use crate::http::error::ApiError;
use crate::hub;
use pp_core::queue::NOT_IN_CLAIMED_STATE;
use pp_core::{Clock, Completion, CompletionId, CompletionStatus};
use pp_storage::LedgerEvent;
use pp_wire::{EnqueueCompletionBody, EnqueuedCompletionResponse, FailCompletionBody};
use tracing::debug;

pub fn enqueue<C: Clock>(
    state: &AppState<C>,
    body: EnqueueCompletionBody,
) -> Result<EnqueuedCompletionResponse, ApiError> {
    let session_id = parse_session(&body.session_id)?;
    if body.job_id.trim().is_empty() {
        return Err(ApiError::Validation("jobId must not be empty".to_string()));
    }
    if body.commit_sha.trim().is_empty() || body.branch.trim().is_empty() {
        return Err(ApiError::Validation("commitSha and branch must not be empty".to_string()));
    }

    let mut inner = state.inner.lock();
    hub::ensure_session_locked(&mut inner, &state.clock, &session_id)?;

    // One active completion per job
    let duplicate = inner.store.state().completions.values().any(|c| {
        c.job_id == body.job_id
            && matches!(c.status, CompletionStatus::Pending | CompletionStatus::Claimed)
    });
    if duplicate {
        return Err(ApiError::Conflict(format!(
            "completion already pending for job {}",
            body.job_id
        )));
    }

    let completion = Completion {
        id: CompletionId::new(),
        job_id: body.job_id,
        session_id,
        commit_sha: body.commit_sha,
        branch: body.branch,
        message: body.message,
        pr_title: body.pr_title,
        pr_body: body.pr_body,
        status: CompletionStatus::Pending,
        seq: inner.store.next_seq(),
        pusher_id: None,
        error: None,
        enqueued_at: state.clock.now_utc(),
        claimed_at: None,
        processed_at: None,
        failed_at: None,
    };
    let id = completion.id.clone();
    inner.store.commit(LedgerEvent::CompletionEnqueued { completion })?;
    debug!(completion = %id, "completion enqueued");

    Ok(EnqueuedCompletionResponse { completion_id: id.to_string() })
}

/// Atomically claim the FIFO head. `None` when empty.
pub fn claim<C: Clock>(
    state: &AppState<C>,
    pusher_id: &str,
) -> Result<Option<Completion>, ApiError> {
    if pusher_id.trim().is_empty() {
        return Err(ApiError::Validation("pusherId must not be empty".to_string()));
    }

    let mut inner = state.inner.lock();
    let Some(head) = inner.store.state().pending_completions().first().map(|c| c.id.clone())
    else {
        return Ok(None);
    };

    inner.store.commit(LedgerEvent::CompletionClaimed {
        completion_id: head.clone(),
        pusher_id: pusher_id.to_string(),
        claimed_at: state.clock.now_utc(),
    })?;

    get(&inner, head.as_str()).cloned().map(Some)
}

pub fn mark_processed<C: Clock>(
    state: &AppState<C>,
    completion_id: &str,
) -> Result<Completion, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status) = {
        let row = get(&inner, completion_id)?;
        (row.id.clone(), row.status)
    };
    if status != CompletionStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    inner.store.commit(LedgerEvent::CompletionProcessed {
        completion_id: id,
        processed_at: state.clock.now_utc(),
    })?;
    get(&inner, completion_id).cloned()
}

pub fn mark_failed<C: Clock>(
    state: &AppState<C>,
    completion_id: &str,
    body: FailCompletionBody,
) -> Result<Completion, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status) = {
        let row = get(&inner, completion_id)?;
        (row.id.clone(), row.status)
    };
    if status != CompletionStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    inner.store.commit(LedgerEvent::CompletionFailed {
        completion_id: id,
        error: body.error,
        failed_at: state.clock.now_utc(),
    })?;
    get(&inner, completion_id).cloned()
}

fn get<'a>(inner: &'a CoreInner, completion_id: &str) -> Result<&'a Completion, ApiError> {
    inner
        .store
        .state()
        .completions
        .get(completion_id)
        .ok_or_else(|| ApiError::NotFound(format!("completion {completion_id}")))
}

#[cfg(test)]
#[path = "completions_tests.rs"]
mod tests;
