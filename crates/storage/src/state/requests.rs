// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request queue event handlers.

use super::MaterializedState;
use crate::ledger::LedgerEvent;
use pp_core::{clock::elapsed_ms, QueueStatus};

pub(crate) fn apply(state: &mut MaterializedState, event: &LedgerEvent) {
    match event {
        LedgerEvent::RequestEnqueued { request } => {
            // Idempotency: skip if the row already exists
            state
                .requests
                .entry(request.id.as_str().to_string())
                .or_insert_with(|| request.clone());
        }

        LedgerEvent::RequestClaimed { request_id, agent_id, claimed_at } => {
            if let Some(row) = state.requests.get_mut(request_id.as_str()) {
                if row.status == QueueStatus::Pending {
                    row.status = QueueStatus::Claimed;
                    row.agent_id = Some(agent_id.clone());
                    row.claimed_at = Some(*claimed_at);
                }
            }
        }

        LedgerEvent::RequestCompleted { request_id, result, completed_at } => {
            if let Some(row) = state.requests.get_mut(request_id.as_str()) {
                if row.status == QueueStatus::Claimed {
                    row.status = QueueStatus::Completed;
                    row.result = result.clone();
                    row.completed_at = Some(*completed_at);
                    row.duration_ms = Some(elapsed_ms(row.enqueued_at, *completed_at));
                }
            }
        }

        LedgerEvent::RequestFailed { request_id, message, detail, failed_at } => {
            if let Some(row) = state.requests.get_mut(request_id.as_str()) {
                if row.status == QueueStatus::Claimed {
                    row.status = QueueStatus::Failed;
                    row.error = Some(match detail {
                        Some(detail) => format!("{message}: {detail}"),
                        None => message.clone(),
                    });
                    row.failed_at = Some(*failed_at);
                    row.duration_ms = Some(elapsed_ms(row.enqueued_at, *failed_at));
                }
            }
        }

        _ => {}
    }
}
