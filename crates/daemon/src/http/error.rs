// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the HTTP surface.
//!
//! Maps failures to status codes and a uniform `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pp_storage::StoreError;
use pp_wire::ErrorBody;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input: 400.
    #[error("{0}")]
    Validation(String),
    /// Missing or wrong bearer token: 401.
    #[error("unauthorized")]
    Auth,
    /// Unknown row or session: 404.
    #[error("not found: {0}")]
    NotFound(String),
    /// Terminal operation on a row in the wrong state: 400, no mutation.
    #[error("{0}")]
    Conflict(String),
    /// Disk failure: 500, never swallowed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(message) => {
                error!(%message, "storage failure surfaced to client");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
