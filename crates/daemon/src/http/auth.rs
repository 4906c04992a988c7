// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static bearer-token authentication.
//!
//! When no token is configured, access is open (single-user local mode).

use super::error::ApiError;
use crate::ctx::AppState;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use pp_core::Clock;

pub async fn require_auth<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    req: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.cfg.auth_token {
        let provided = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        if provided != Some(expected.as_str()) {
            return ApiError::Auth.into_response();
        }
    }
    next.run(req).await
}
