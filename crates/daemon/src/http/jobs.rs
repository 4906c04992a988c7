// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job queue endpoints.

use super::error::ApiError;
use crate::ctx::AppState;
use crate::queues::jobs as ops;
use axum::extract::{Path, Query, State};
use axum::Json;
use pp_core::{Clock, Job};
use pp_wire::{
    AppendJobLogBody, AppendLogResponse, ClaimJobBody, ClaimedJobResponse, CompleteJobBody,
    EnqueueJobBody, EnqueuedJobResponse, FailBody, JobLogPage,
};
use serde::Deserialize;

/// Default page size for `GET /jobs/:id/logs`.
const DEFAULT_LOG_LIMIT: usize = 50;

pub async fn enqueue<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<EnqueueJobBody>,
) -> Result<Json<EnqueuedJobResponse>, ApiError> {
    ops::enqueue(&state, body).map(Json)
}

pub async fn claim<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<ClaimJobBody>,
) -> Result<Json<ClaimedJobResponse>, ApiError> {
    ops::claim(&state, &body.worker_id).map(|claimed| Json(ClaimedJobResponse { claimed }))
}

pub async fn complete<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    body: Option<Json<CompleteJobBody>>,
) -> Result<Json<Job>, ApiError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    ops::complete(&state, &id, body).map(Json)
}

pub async fn fail<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<FailBody>,
) -> Result<Json<Job>, ApiError> {
    ops::fail(&state, &id, body).map(Json)
}

pub async fn append_log<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<AppendJobLogBody>,
) -> Result<Json<AppendLogResponse>, ApiError> {
    ops::append_log(&state, &id, body).map(Json)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogParams {
    pub limit: Option<usize>,
    pub after_id: Option<u64>,
}

pub async fn list_logs<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Query(params): Query<LogParams>,
) -> Result<Json<JobLogPage>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT).max(1);
    ops::list_logs(&state, &id, limit, params.after_id).map(Json)
}
