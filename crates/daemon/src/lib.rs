// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pp-daemon: the PushPals pipeline coordinator.
//!
//! Composes the durable store, per-session event hub, pipeline queues,
//! and approvals registry behind an HTTP/SSE/WebSocket surface.

pub mod approvals;
pub mod ctx;
pub mod env;
pub mod http;
pub mod hub;
pub mod queues;
pub mod slo;

pub use ctx::{AppState, Config};
pub use http::build_router;
