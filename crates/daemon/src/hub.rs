// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session event hub: persist-then-broadcast with cursor replay.
//!
//! Emission runs under the coordinator mutex: the envelope is committed
//! to the store (durable), folded into projections, then fanned out to
//! subscriber channels. A subscriber therefore never observes a cursor
//! that is not yet durable, and replay-then-live attachment is gap-free.

use crate::ctx::{AppState, CoreInner, Subscriber};
use pp_core::{ready, Clock, Envelope, EventBody, SessionId, TextPayload};
use pp_storage::{LedgerEvent, StoreError};
use pp_wire::EventFrame;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Bounded send buffer per subscriber; overflow drops the subscriber.
pub const SUBSCRIBER_BUFFER: usize = 256;

/// Tag for events the coordinator originates itself.
pub const SERVER_FROM: &str = "server:coordinator";

/// Emit an envelope into its session's log and fan it out.
///
/// Returns the assigned cursor.
pub fn emit<C: Clock>(state: &AppState<C>, envelope: Envelope) -> Result<u64, StoreError> {
    let mut inner = state.inner.lock();
    emit_locked(&mut inner, &state.clock, envelope)
}

/// Emission body shared with callers that already hold the lock.
pub(crate) fn emit_locked<C: Clock>(
    inner: &mut CoreInner,
    clock: &C,
    envelope: Envelope,
) -> Result<u64, StoreError> {
    let session_key = envelope.session_id.as_str().to_string();
    ensure_session_locked(inner, clock, &envelope.session_id)?;

    let cursor = inner.store.state().next_cursor(&session_key);
    inner.store.commit(LedgerEvent::EventAppended { cursor, envelope: envelope.clone() })?;

    broadcast(inner, &session_key, EventFrame { envelope, cursor });

    maybe_emit_ready(inner, clock, &session_key)?;
    Ok(cursor)
}

/// Create the session row if this is the first activity for it.
pub(crate) fn ensure_session_locked<C: Clock>(
    inner: &mut CoreInner,
    clock: &C,
    session_id: &SessionId,
) -> Result<bool, StoreError> {
    if inner.store.state().sessions.contains_key(session_id.as_str()) {
        return Ok(false);
    }
    inner.store.commit(LedgerEvent::SessionCreated {
        session_id: session_id.clone(),
        created_at: clock.now_utc(),
    })?;
    Ok(true)
}

/// Attach a subscriber: returns the replay batch and the live receiver.
///
/// A reconnect cursor ahead of the log (store reset under a long-lived
/// client) falls back to a full replay so the client cannot wedge on a
/// phantom cursor.
pub fn subscribe<C: Clock>(
    state: &AppState<C>,
    session_id: &SessionId,
    after: u64,
) -> (Vec<EventFrame>, mpsc::Receiver<EventFrame>) {
    let mut inner = state.inner.lock();

    let latest = inner.store.state().latest_cursor(session_id.as_str());
    let mut from = after;
    if after > latest {
        warn!(session = %session_id, after, latest, "replay cursor ahead of log, resetting to 0");
        from = 0;
    }

    let replay: Vec<EventFrame> = inner
        .store
        .state()
        .events_after(session_id.as_str(), from)
        .iter()
        .map(|stored| EventFrame { envelope: stored.envelope.clone(), cursor: stored.cursor })
        .collect();

    let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
    let id = inner.next_sub_id;
    inner.next_sub_id += 1;
    inner
        .subs
        .entry(session_id.as_str().to_string())
        .or_default()
        .push(Subscriber { id, tx });
    debug!(session = %session_id, subscriber = id, replay = replay.len(), "subscriber attached");

    (replay, rx)
}

/// Latest cursor of a session's log (0 when empty or unknown).
pub fn latest_cursor<C: Clock>(state: &AppState<C>, session_id: &SessionId) -> u64 {
    state.inner.lock().store.state().latest_cursor(session_id.as_str())
}

fn broadcast(inner: &mut CoreInner, session_key: &str, frame: EventFrame) {
    let Some(subs) = inner.subs.get_mut(session_key) else {
        return;
    };
    subs.retain(|sub| match sub.tx.try_send(frame.clone()) {
        Ok(()) => true,
        Err(_) => {
            // Full buffer and closed channel are the same signal: the
            // subscriber is gone and must reconnect with its last cursor.
            debug!(subscriber = sub.id, "dropping dead subscriber");
            false
        }
    });
    if subs.is_empty() {
        inner.subs.remove(session_key);
    }
}

/// Emit the one-time "all systems online" announcement when every
/// required agent has reported.
fn maybe_emit_ready<C: Clock>(
    inner: &mut CoreInner,
    clock: &C,
    session_key: &str,
) -> Result<(), StoreError> {
    let ready = {
        let Some(session) = inner.store.state().sessions.get(session_key) else {
            return Ok(());
        };
        !session.ready_emitted
            && ready::REQUIRED_AGENTS.iter().all(|a| session.ready_agents.contains(*a))
    };
    if !ready {
        return Ok(());
    }
    let envelope = Envelope::new(
        SessionId::new(session_key),
        clock.now_utc(),
        EventBody::AssistantMessage(TextPayload {
            text: ready::READY_TEXT.to_string(),
            ..Default::default()
        }),
    )
    .from(SERVER_FROM);
    // Recursion bottoms out: folding the announcement sets ready_emitted.
    emit_locked(inner, clock, envelope)?;
    Ok(())
}

#[cfg(test)]
#[path = "hub_tests.rs"]
mod tests;
