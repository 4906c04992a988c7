// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session and event-log handlers.

use super::types::SessionState;
use super::{MaterializedState, StoredEvent};
use crate::ledger::LedgerEvent;
use pp_core::{ready, task};

pub(crate) fn apply(state: &mut MaterializedState, event: &LedgerEvent) {
    match event {
        LedgerEvent::SessionCreated { session_id, created_at } => {
            // Idempotency: keep the original creation time
            state
                .sessions
                .entry(session_id.as_str().to_string())
                .or_insert_with(|| SessionState::new(session_id.clone(), *created_at));
        }

        LedgerEvent::EventAppended { cursor, envelope } => {
            let session = state
                .sessions
                .entry(envelope.session_id.as_str().to_string())
                .or_insert_with(|| SessionState::new(envelope.session_id.clone(), envelope.ts));

            // Idempotency: a cursor at or below the latest was already applied
            if *cursor <= session.latest_cursor {
                return;
            }
            session.latest_cursor = *cursor;
            session.events.push(StoredEvent { cursor: *cursor, envelope: envelope.clone() });

            task::fold(&mut session.tasks, &envelope.body);

            if let Some(agent) = ready::online_report(&envelope.body) {
                session.ready_agents.insert(agent.to_string());
            }
            if ready::is_ready_announcement(&envelope.body) {
                session.ready_emitted = true;
            }
        }

        _ => {}
    }
}
