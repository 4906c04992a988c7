// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP/SSE/WebSocket surface of the coordinator.

pub mod auth;
pub mod error;

mod approvals;
mod completions;
mod jobs;
mod requests;
mod sessions;
mod system;
mod workers;

use crate::ctx::AppState;
use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::middleware;
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use pp_core::Clock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the full router with all routes and middleware.
pub fn build_router<C: Clock + 'static>(state: AppState<C>) -> Router {
    // Agent and operator routes behind the bearer token
    let protected = Router::new()
        .route("/sessions/:id/command", post(sessions::command::<C>))
        .route("/approvals/:id", post(approvals::decide::<C>))
        .route("/requests/enqueue", post(requests::enqueue::<C>))
        .route("/requests/claim", post(requests::claim::<C>))
        .route("/requests/:id/complete", post(requests::complete::<C>))
        .route("/requests/:id/fail", post(requests::fail::<C>))
        .route("/jobs/enqueue", post(jobs::enqueue::<C>))
        .route("/jobs/claim", post(jobs::claim::<C>))
        .route("/jobs/:id/complete", post(jobs::complete::<C>))
        .route("/jobs/:id/fail", post(jobs::fail::<C>))
        .route("/jobs/:id/log", post(jobs::append_log::<C>))
        .route("/jobs/:id/logs", get(jobs::list_logs::<C>))
        .route("/workers/heartbeat", post(workers::heartbeat::<C>))
        .route("/workers", get(workers::list::<C>))
        .route("/completions/enqueue", post(completions::enqueue::<C>))
        .route("/completions/claim", post(completions::claim::<C>))
        .route("/completions/:id/processed", post(completions::processed::<C>))
        .route("/completions/:id/fail", post(completions::fail::<C>))
        .route("/system/status", get(system::status::<C>))
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_auth::<C>));

    // Client-facing routes (EventSource cannot set headers)
    let public = Router::new()
        .route("/healthz", get(system::healthz::<C>))
        .route("/sessions", post(sessions::create::<C>))
        .route("/sessions/:id/events", get(sessions::events_sse::<C>))
        .route("/sessions/:id/ws", get(sessions::events_ws::<C>))
        .route("/sessions/:id/message", post(sessions::message::<C>));

    public
        .merge(protected)
        .layer(middleware::map_response(no_store))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .entry(CACHE_CONTROL)
        .or_insert(HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
