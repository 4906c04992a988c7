// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion queue endpoints.

use super::error::ApiError;
use crate::ctx::AppState;
use crate::queues::completions as ops;
use axum::extract::{Path, State};
use axum::Json;
use pp_core::{Clock, Completion};
use pp_wire::{
    ClaimCompletionBody, ClaimedCompletionResponse, EnqueueCompletionBody,
    EnqueuedCompletionResponse, FailCompletionBody,
};

pub async fn enqueue<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<EnqueueCompletionBody>,
) -> Result<Json<EnqueuedCompletionResponse>, ApiError> {
    ops::enqueue(&state, body).map(Json)
}

pub async fn claim<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<ClaimCompletionBody>,
) -> Result<Json<ClaimedCompletionResponse>, ApiError> {
    ops::claim(&state, &body.pusher_id)
        .map(|claimed| Json(ClaimedCompletionResponse { claimed }))
}

pub async fn processed<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> Result<Json<Completion>, ApiError> {
    ops::mark_processed(&state, &id).map(Json)
}

pub async fn fail<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<FailCompletionBody>,
) -> Result<Json<Completion>, ApiError> {
    ops::mark_failed(&state, &id, body).map(Json)
}
