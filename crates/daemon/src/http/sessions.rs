// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session endpoints: create/join, message ingest, command ingest, and
//! the SSE / WebSocket event streams.

use super::error::ApiError;
use crate::approvals::Approval;
use crate::ctx::AppState;
use crate::hub;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures_util::stream::{self, Stream, StreamExt};
use pp_core::envelope::{ApprovalPayload, ErrorPayload};
use pp_core::{scrub, Clock, Envelope, EventBody, SessionId, PROTOCOL_VERSION};
use pp_wire::{
    AcceptedResponse, CommandBody, CreateSessionBody, EventFrame, MessageBody,
    SessionCreatedResponse,
};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{debug, warn};

use crate::queues::jobs::{FAIL_DETAIL_MAX, FAIL_MESSAGE_MAX};

pub async fn create<C: Clock>(
    State(state): State<AppState<C>>,
    body: Option<Json<CreateSessionBody>>,
) -> Result<Response, ApiError> {
    let requested = body.and_then(|Json(b)| b.session_id);
    let session_id = match requested {
        Some(raw) => SessionId::parse(&raw).map_err(|e| ApiError::Validation(e.to_string()))?,
        None => SessionId::random(),
    };

    let mut inner = state.inner.lock();
    let created = hub::ensure_session_locked(&mut inner, &state.clock, &session_id)?;
    drop(inner);

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    let body = SessionCreatedResponse {
        session_id: session_id.to_string(),
        protocol_version: PROTOCOL_VERSION.to_string(),
    };
    Ok((status, Json(body)).into_response())
}

pub async fn message<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<MessageBody>,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let session_id = SessionId::parse(&id).map_err(|e| ApiError::Validation(e.to_string()))?;
    if body.text.trim().is_empty() {
        return Err(ApiError::Validation("text must not be empty".to_string()));
    }

    let envelope = Envelope::new(
        session_id,
        state.clock.now_utc(),
        EventBody::Message(pp_core::MessagePayload {
            text: body.text,
            intent: body.intent,
            ..Default::default()
        }),
    )
    .from("client");
    let cursor = hub::emit(&state, envelope)?;

    Ok(Json(AcceptedResponse { ok: true, cursor }))
}

/// Agent command ingest.
///
/// Validation failures persist an `error` event in place of the intended
/// one (so attached UIs see the rejection) and still return 400.
pub async fn command<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(body): Json<CommandBody>,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let session_id = SessionId::parse(&id).map_err(|e| ApiError::Validation(e.to_string()))?;

    let event_body = match EventBody::from_parts(&body.kind, body.payload.clone()) {
        Ok(parsed) => parsed,
        Err(validation) => {
            let message = validation.to_string();
            warn!(session = %session_id, kind = %body.kind, %message, "invalid command");
            let error_event = Envelope::new(
                session_id,
                state.clock.now_utc(),
                EventBody::Error(ErrorPayload { message: message.clone(), ..Default::default() }),
            )
            .from(hub::SERVER_FROM);
            hub::emit(&state, error_event)?;
            return Err(ApiError::Validation(message));
        }
    };

    let event_body = compact_failure_text(event_body);

    let mut envelope = Envelope::new(session_id.clone(), state.clock.now_utc(), event_body);
    envelope.from = body.from;
    envelope.to = body.to;
    envelope.correlation_id = body.correlation_id;
    envelope.parent_id = body.parent_id;
    envelope.turn_id = body.turn_id;

    let side_effect = approval_side_effect(&envelope.body);
    let cursor = hub::emit(&state, envelope)?;

    if let Some(pending) = side_effect {
        let cursor = register_approval(&state, &session_id, pending)?;
        debug!(session = %session_id, cursor, "approval registered");
    }

    Ok(Json(AcceptedResponse { ok: true, cursor }))
}

/// Pending approval data extracted from a command, if any.
struct PendingApproval {
    approval_id: String,
    action: String,
    summary: String,
    details: Option<serde_json::Value>,
    tool_call_id: Option<String>,
    /// Whether an `approval_required` event still needs to be emitted.
    announce: bool,
}

fn approval_side_effect(body: &EventBody) -> Option<PendingApproval> {
    match body {
        EventBody::ToolCall(p) if p.requires_approval => {
            let approval_id =
                p.tool_call_id.clone().unwrap_or_else(|| pp_core::EventId::new().to_string());
            Some(PendingApproval {
                approval_id,
                action: p.tool.clone().unwrap_or_else(|| "tool_call".to_string()),
                summary: p.summary.clone().unwrap_or_default(),
                details: p.details.clone(),
                tool_call_id: p.tool_call_id.clone(),
                announce: true,
            })
        }
        EventBody::ApprovalRequired(p) => Some(PendingApproval {
            approval_id: p.approval_id.clone(),
            action: p.action.clone().unwrap_or_else(|| "approval".to_string()),
            summary: p.summary.clone().unwrap_or_default(),
            details: p.details.clone(),
            tool_call_id: p.tool_call_id.clone(),
            // The incoming event already announced it
            announce: false,
        }),
        _ => None,
    }
}

fn register_approval<C: Clock>(
    state: &AppState<C>,
    session_id: &SessionId,
    pending: PendingApproval,
) -> Result<u64, ApiError> {
    state.approvals.insert(Approval {
        approval_id: pending.approval_id.clone(),
        session_id: session_id.clone(),
        action: pending.action.clone(),
        summary: pending.summary.clone(),
        details: pending.details.clone(),
        tool_call_id: pending.tool_call_id.clone(),
    });

    if !pending.announce {
        return Ok(hub::latest_cursor(state, session_id));
    }

    let envelope = Envelope::new(
        session_id.clone(),
        state.clock.now_utc(),
        EventBody::ApprovalRequired(ApprovalPayload {
            approval_id: pending.approval_id,
            action: Some(pending.action),
            summary: Some(pending.summary),
            details: pending.details,
            tool_call_id: pending.tool_call_id,
            ..Default::default()
        }),
    )
    .from(hub::SERVER_FROM);
    Ok(hub::emit(state, envelope)?)
}

/// Worker-reported failures carry raw terminal output; compact it.
fn compact_failure_text(body: EventBody) -> EventBody {
    match body {
        EventBody::JobFailed(mut p) => {
            p.message = p.message.as_deref().map(|m| scrub::compact(m, FAIL_MESSAGE_MAX));
            p.detail = p.detail.as_deref().map(|d| scrub::compact(d, FAIL_DETAIL_MAX));
            EventBody::JobFailed(p)
        }
        other => other,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    pub after: Option<u64>,
}

/// SSE stream: initial keepalive, replay from `after`, then live frames.
pub async fn events_sse<C: Clock>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Query(params): Query<StreamParams>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let session_id = SessionId::parse(&id).map_err(|e| ApiError::Validation(e.to_string()))?;
    let (replay, rx) = hub::subscribe(&state, &session_id, params.after.unwrap_or(0));

    let initial = stream::once(async { Ok::<_, Infallible>(SseEvent::default().comment("ok")) });
    let replayed = stream::iter(replay.into_iter().map(|frame| Ok(frame_to_sse(frame))));
    let live = stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|frame| (Ok(frame_to_sse(frame)), rx))
    });

    Ok(Sse::new(initial.chain(replayed).chain(live)).keep_alive(
        KeepAlive::new().interval(Duration::from_secs(15)).text("keepalive"),
    ))
}

fn frame_to_sse(frame: EventFrame) -> SseEvent {
    let cursor = frame.cursor;
    match serde_json::to_string(&frame) {
        Ok(data) => SseEvent::default().id(cursor.to_string()).data(data),
        Err(e) => SseEvent::default().comment(format!("unserializable frame: {e}")),
    }
}

/// WebSocket stream of the same `{envelope, cursor}` frames.
pub async fn events_ws<C: Clock + 'static>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Query(params): Query<StreamParams>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let session_id = SessionId::parse(&id).map_err(|e| ApiError::Validation(e.to_string()))?;
    let after = params.after.unwrap_or(0);
    Ok(ws.on_upgrade(move |socket| stream_ws(state, session_id, after, socket)))
}

async fn stream_ws<C: Clock>(
    state: AppState<C>,
    session_id: SessionId,
    after: u64,
    mut socket: WebSocket,
) {
    let (replay, mut rx) = hub::subscribe(&state, &session_id, after);
    for frame in replay {
        if send_ws_frame(&mut socket, &frame).await.is_err() {
            return;
        }
    }
    while let Some(frame) = rx.recv().await {
        if send_ws_frame(&mut socket, &frame).await.is_err() {
            return;
        }
    }
}

async fn send_ws_frame(socket: &mut WebSocket, frame: &EventFrame) -> Result<(), ()> {
    let Ok(data) = serde_json::to_string(frame) else {
        return Ok(());
    };
    socket.send(Message::Text(data)).await.map_err(|_| ())
}
