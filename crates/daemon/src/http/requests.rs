// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request queue endpoints.

use super::error::ApiError;
use crate::ctx::AppState;
use crate::queues::requests as ops;
use axum::extract::{Path, State};
use axum::Json;
use pp_core::{Clock, Request};
use pp_wire::{
    ClaimRequestBody, ClaimedRequestResponse, CompleteRequestBody, EnqueueRequestBody,
    EnqueuedRequestResponse, FailBody,
};

pub async fn enqueue<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<EnqueueRequestBody>,
) -> Result<Json<EnqueuedRequestResponse>, ApiError> {
    ops::enqueue(&state, body).map(Json)
}

pub async fn claim<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<ClaimRequestBody>,
) -> Result<Json<ClaimedRequestResponse>, ApiError> {
    ops::claim(&state, &body.agent_id).map(|claimed| Json(ClaimedRequestResponse { claimed }))
}

pub async fn complete<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    body: Option<Json<CompleteRequestBody>>,
) -> Result<Json<Request>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    ops::complete(&state, &id, body).map(Json)
}

pub async fn fail<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<FailBody>,
) -> Result<Json<Request>, ApiError> {
    ops::fail(&state, &id, body).map(Json)
}
