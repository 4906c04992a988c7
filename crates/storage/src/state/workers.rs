// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry event handlers.

use super::MaterializedState;
use crate::ledger::LedgerEvent;

pub(crate) fn apply(state: &mut MaterializedState, event: &LedgerEvent) {
    match event {
        LedgerEvent::WorkerHeartbeat { worker } => {
            // Heartbeats replace the whole row; replaying one twice is a no-op.
            state.workers.insert(worker.worker_id.clone(), worker.clone());
        }
        _ => {}
    }
}
