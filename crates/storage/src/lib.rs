// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pp-storage: Durable store for the PushPals coordinator.
//!
//! The store is an append-only write-ahead ledger plus a materialized
//! in-memory state rebuilt by replay. Snapshots bound replay time.

mod ledger;
mod snapshot;
mod state;
mod store;
mod wal;

pub use ledger::LedgerEvent;
pub use snapshot::{Snapshot, SnapshotError, CURRENT_SNAPSHOT_VERSION};
pub use state::{JobLogTail, MaterializedState, SessionState, StoredEvent, JOB_LOG_TAIL_MAX};
pub use store::{Store, StoreError};
pub use wal::{Wal, WalEntry, WalError};
