// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Approval decision endpoint.

use super::error::ApiError;
use crate::approvals::APPROVAL_NOT_FOUND;
use crate::ctx::AppState;
use crate::hub;
use axum::extract::{Path, State};
use axum::Json;
use pp_core::envelope::ApprovalRefPayload;
use pp_core::{Clock, Envelope, EventBody};
use pp_wire::{AcceptedResponse, DecisionBody};
use tracing::info;

/// Resolve a pending approval. First decision wins; the entry is removed
/// and the owning session is told via `approved` / `denied`.
pub async fn decide<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let approve = match body.decision.as_str() {
        "approve" => true,
        "deny" => false,
        other => {
            return Err(ApiError::Validation(format!(
                "decision must be \"approve\" or \"deny\", got {other:?}"
            )))
        }
    };

    let Some(approval) = state.approvals.take(&id) else {
        return Err(ApiError::Conflict(APPROVAL_NOT_FOUND.to_string()));
    };

    let payload = ApprovalRefPayload { approval_id: approval.approval_id.clone(), ..Default::default() };
    let body = if approve { EventBody::Approved(payload) } else { EventBody::Denied(payload) };
    let envelope = Envelope::new(approval.session_id.clone(), state.clock.now_utc(), body)
        .from(hub::SERVER_FROM);
    let cursor = hub::emit(&state, envelope)?;
    info!(approval = %approval.approval_id, approve, "approval resolved");

    Ok(Json(AcceptedResponse { ok: true, cursor }))
}
