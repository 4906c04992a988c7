// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline queue operations.
//!
//! Each module implements one queue's mutations against the shared store.
//! Claims are linearizable: head selection and the status transition run
//! under the coordinator mutex, and the fold guards every transition with
//! a status compare-and-swap.

pub mod completions;
pub mod jobs;
pub mod requests;
pub mod sweep;
pub mod workers;

use crate::http::error::ApiError;
use pp_core::{SessionId, SessionIdError};

pub(crate) fn parse_session(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::parse(raw).map_err(|e: SessionIdError| ApiError::Validation(e.to_string()))
}
