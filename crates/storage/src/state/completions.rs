// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion queue event handlers.

use super::MaterializedState;
use crate::ledger::LedgerEvent;
use pp_core::CompletionStatus;

pub(crate) fn apply(state: &mut MaterializedState, event: &LedgerEvent) {
    match event {
        LedgerEvent::CompletionEnqueued { completion } => {
            state
                .completions
                .entry(completion.id.as_str().to_string())
                .or_insert_with(|| completion.clone());
        }

        LedgerEvent::CompletionClaimed { completion_id, pusher_id, claimed_at } => {
            if let Some(row) = state.completions.get_mut(completion_id.as_str()) {
                if row.status == CompletionStatus::Pending {
                    row.status = CompletionStatus::Claimed;
                    row.pusher_id = Some(pusher_id.clone());
                    row.claimed_at = Some(*claimed_at);
                }
            }
        }

        LedgerEvent::CompletionProcessed { completion_id, processed_at } => {
            if let Some(row) = state.completions.get_mut(completion_id.as_str()) {
                if row.status == CompletionStatus::Claimed {
                    row.status = CompletionStatus::Processed;
                    row.processed_at = Some(*processed_at);
                }
            }
        }

        LedgerEvent::CompletionFailed { completion_id, error, failed_at } => {
            if let Some(row) = state.completions.get_mut(completion_id.as_str()) {
                if row.status == CompletionStatus::Claimed {
                    row.status = CompletionStatus::Failed;
                    row.error = Some(error.clone());
                    row.failed_at = Some(*failed_at);
                }
            }
        }

        _ => {}
    }
}
