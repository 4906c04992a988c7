// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request queue: durable priority FIFO of user prompts.

use super::parse_session;
use crate::ctx::AppState;
use crate::http::error::ApiError;
use crate::hub;
use pp_core::queue::NOT_IN_CLAIMED_STATE;
use pp_core::{Clock, Priority, QueueStatus, Request};
use pp_storage::LedgerEvent;
use pp_wire::{
    ClaimedRequest, CompleteRequestBody, EnqueueRequestBody, EnqueuedRequestResponse, FailBody,
};
use tracing::debug;

pub fn enqueue<C: Clock>(
    state: &AppState<C>,
    body: EnqueueRequestBody,
) -> Result<EnqueuedRequestResponse, ApiError> {
    let session_id = parse_session(&body.session_id)?;
    if body.prompt.trim().is_empty() {
        return Err(ApiError::Validation("prompt must not be empty".to_string()));
    }
    let priority = Priority::parse_lenient(body.priority.as_deref());
    let budget_ms = priority.normalize_budget_ms(body.queue_wait_budget_ms);

    let mut inner = state.inner.lock();
    hub::ensure_session_locked(&mut inner, &state.clock, &session_id)?;

    let mut request =
        Request::new(session_id, body.prompt, priority, budget_ms, state.clock.now_utc());
    request.seq = inner.store.next_seq();
    let id = request.id.clone();
    inner.store.commit(LedgerEvent::RequestEnqueued { request })?;

    let position = inner
        .store
        .state()
        .pending_requests()
        .iter()
        .position(|r| r.id == id)
        .map(|i| i + 1)
        .unwrap_or(1);
    debug!(request = %id, %priority, position, "request enqueued");

    Ok(EnqueuedRequestResponse {
        request_id: id.to_string(),
        queue_position: position,
        eta_ms: priority.eta_ms(position),
    })
}

/// Atomically claim the queue head for a planner. `None` when empty.
pub fn claim<C: Clock>(
    state: &AppState<C>,
    agent_id: &str,
) -> Result<Option<ClaimedRequest>, ApiError> {
    if agent_id.trim().is_empty() {
        return Err(ApiError::Validation("agentId must not be empty".to_string()));
    }

    let mut inner = state.inner.lock();
    let Some(head) = inner.store.state().pending_requests().first().map(|r| r.id.clone()) else {
        return Ok(None);
    };

    inner.store.commit(LedgerEvent::RequestClaimed {
        request_id: head.clone(),
        agent_id: agent_id.to_string(),
        claimed_at: state.clock.now_utc(),
    })?;

    let request = inner
        .store
        .state()
        .requests
        .get(head.as_str())
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("request {head}")))?;
    let queue_wait_ms = request.queue_wait_ms().unwrap_or(0);
    debug!(request = %head, agent_id, queue_wait_ms, "request claimed");

    Ok(Some(ClaimedRequest { request, queue_wait_ms }))
}

pub fn complete<C: Clock>(
    state: &AppState<C>,
    request_id: &str,
    body: CompleteRequestBody,
) -> Result<Request, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status) = {
        let row = inner
            .store
            .state()
            .requests
            .get(request_id)
            .ok_or_else(|| ApiError::NotFound(format!("request {request_id}")))?;
        (row.id.clone(), row.status)
    };
    if status != QueueStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    inner.store.commit(LedgerEvent::RequestCompleted {
        request_id: id,
        result: body.result,
        completed_at: state.clock.now_utc(),
    })?;
    updated(&inner, request_id)
}

pub fn fail<C: Clock>(
    state: &AppState<C>,
    request_id: &str,
    body: FailBody,
) -> Result<Request, ApiError> {
    let mut inner = state.inner.lock();
    let (id, status) = {
        let row = inner
            .store
            .state()
            .requests
            .get(request_id)
            .ok_or_else(|| ApiError::NotFound(format!("request {request_id}")))?;
        (row.id.clone(), row.status)
    };
    if status != QueueStatus::Claimed {
        return Err(ApiError::Conflict(NOT_IN_CLAIMED_STATE.to_string()));
    }

    inner.store.commit(LedgerEvent::RequestFailed {
        request_id: id,
        message: body.message,
        detail: body.detail,
        failed_at: state.clock.now_utc(),
    })?;
    updated(&inner, request_id)
}

fn updated(inner: &crate::ctx::CoreInner, request_id: &str) -> Result<Request, ApiError> {
    inner
        .store
        .state()
        .requests
        .get(request_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("request {request_id}")))
}

#[cfg(test)]
#[path = "requests_tests.rs"]
mod tests;
