// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The durable store: exclusive lock + ledger + materialized state.
//!
//! One store directory belongs to one process at a time (advisory file
//! lock). Every commit is flushed before it returns, so a caller that
//! observed a commit may hand its effects to subscribers.

use crate::ledger::LedgerEvent;
use crate::snapshot::{self, Snapshot, SnapshotError};
use crate::state::MaterializedState;
use crate::wal::{Wal, WalError};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const WAL_FILE: &str = "pushpals.wal";
const SNAPSHOT_FILE: &str = "pushpals.snapshot";
const LOCK_FILE: &str = "lock";

/// Ledger entries accumulated before the next checkpoint is due.
pub const CHECKPOINT_THRESHOLD: u64 = 512;

/// Errors from store operations. All are fatal to the calling operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store directory is locked by another process: {0}")]
    Locked(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Wal(#[from] WalError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Durable store for one deployment.
pub struct Store {
    state: MaterializedState,
    wal: Wal,
    snapshot_path: PathBuf,
    appended_since_checkpoint: u64,
    _lock: File,
}

impl Store {
    /// Open the store in `dir`, recovering state from snapshot + ledger.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;

        let lock = OpenOptions::new().create(true).write(true).open(dir.join(LOCK_FILE))?;
        lock.try_lock_exclusive().map_err(|_| StoreError::Locked(dir.to_path_buf()))?;

        let snapshot_path = dir.join(SNAPSHOT_FILE);
        let (mut state, snapshot_seq) = match snapshot::load(&snapshot_path) {
            Some(snapshot) => (snapshot.state, snapshot.seq),
            None => (MaterializedState::default(), 0),
        };

        let wal = Wal::open(&dir.join(WAL_FILE), snapshot_seq)?;
        let mut replayed = 0u64;
        for entry in wal.entries_after(snapshot_seq)? {
            state.apply(&entry.event);
            replayed += 1;
        }
        info!(
            dir = %dir.display(),
            snapshot_seq,
            replayed,
            sessions = state.sessions.len(),
            "store opened"
        );

        Ok(Self {
            state,
            wal,
            snapshot_path,
            appended_since_checkpoint: replayed,
            _lock: lock,
        })
    }

    /// Persist one event durably, then fold it into the state.
    ///
    /// Returns the ledger sequence assigned to the event.
    pub fn commit(&mut self, event: LedgerEvent) -> Result<u64, StoreError> {
        let seq = self.wal.append(&event)?;
        self.wal.flush()?;
        self.state.apply(&event);
        self.appended_since_checkpoint += 1;
        Ok(seq)
    }

    /// Read-only view of the materialized state.
    pub fn state(&self) -> &MaterializedState {
        &self.state
    }

    /// Sequence number the next commit will receive.
    ///
    /// Used to stamp FIFO tie-break sequences on queue rows.
    pub fn next_seq(&self) -> u64 {
        self.wal.write_seq() + 1
    }

    /// Whether enough entries accumulated to warrant a checkpoint.
    pub fn should_checkpoint(&self) -> bool {
        self.appended_since_checkpoint >= CHECKPOINT_THRESHOLD
    }

    /// Snapshot the state and drop the covered ledger prefix.
    pub fn checkpoint(&mut self, now: DateTime<Utc>) -> Result<(), StoreError> {
        let seq = self.wal.write_seq();
        snapshot::save(&self.snapshot_path, &Snapshot::new(seq, self.state.clone(), now))?;
        self.wal.truncate_before(seq + 1)?;
        self.appended_since_checkpoint = 0;
        debug!(seq, "checkpoint written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
