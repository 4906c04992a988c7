// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry endpoints.

use super::error::ApiError;
use crate::ctx::AppState;
use crate::queues::workers as ops;
use axum::extract::State;
use axum::Json;
use pp_core::Clock;
use pp_wire::{HeartbeatBody, OkResponse, WorkersResponse};

pub async fn heartbeat<C: Clock>(
    State(state): State<AppState<C>>,
    Json(body): Json<HeartbeatBody>,
) -> Result<Json<OkResponse>, ApiError> {
    ops::heartbeat(&state, body).map(Json)
}

pub async fn list<C: Clock>(
    State(state): State<AppState<C>>,
) -> Result<Json<WorkersResponse>, ApiError> {
    ops::list(&state).map(Json)
}
