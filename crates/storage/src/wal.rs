// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-ahead ledger: one JSON entry per line, sequence-numbered.
//!
//! The WAL is the source of truth between snapshots. Appends are
//! buffered; callers flush before treating a write as durable. A corrupt
//! tail (torn write, binary garbage) is quarantined to a rotated `.bak`
//! on open and the valid prefix is preserved.

use crate::ledger::LedgerEvent;
use crate::snapshot::rotate_bak_path;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors from WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One sequenced ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    pub seq: u64,
    pub event: LedgerEvent,
}

/// Append-only ledger file.
pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
    write_seq: u64,
}

impl Wal {
    /// Open (or create) the WAL at `path`.
    ///
    /// `min_seq` is the sequence already covered by a snapshot; appends
    /// resume after `max(min_seq, last persisted seq)` so sequence numbers
    /// stay monotonic across checkpoint truncation.
    pub fn open(path: &Path, min_seq: u64) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut last_seq = 0;
        if path.exists() {
            let (entries, corrupt) = read_entries(path);
            last_seq = entries.last().map(|e| e.seq).unwrap_or(0);
            if corrupt {
                quarantine(path, &entries)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { path: path.to_path_buf(), writer: BufWriter::new(file), write_seq: last_seq.max(min_seq) })
    }

    /// Append an event, returning its assigned sequence number.
    pub fn append(&mut self, event: &LedgerEvent) -> Result<u64, WalError> {
        let seq = self.write_seq + 1;
        let entry = WalEntry { seq, event: event.clone() };
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.write_seq = seq;
        Ok(seq)
    }

    /// Flush buffered appends to disk.
    pub fn flush(&mut self) -> Result<(), WalError> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        Ok(())
    }

    /// Highest sequence number handed out so far.
    pub fn write_seq(&self) -> u64 {
        self.write_seq
    }

    /// All persisted entries with `seq > after`, in order.
    ///
    /// Stops at the first corrupt row (logged, not fatal) — entries past a
    /// torn write are unreachable until the next open quarantines it.
    pub fn entries_after(&self, after: u64) -> Result<Vec<WalEntry>, WalError> {
        let (entries, corrupt) = read_entries(&self.path);
        if corrupt {
            warn!(path = %self.path.display(), "skipping corrupt ledger tail");
        }
        Ok(entries.into_iter().filter(|e| e.seq > after).collect())
    }

    /// Drop entries with `seq < keep_from`, keeping the rest.
    ///
    /// Used after a snapshot covers the prefix.
    pub fn truncate_before(&mut self, keep_from: u64) -> Result<(), WalError> {
        self.writer.flush()?;
        let (entries, _) = read_entries(&self.path);
        let tmp = self.path.with_extension("wal.tmp");
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            for entry in entries.iter().filter(|e| e.seq >= keep_from) {
                let mut line = serde_json::to_vec(entry)?;
                line.push(b'\n');
                out.write_all(&line)?;
            }
            out.flush()?;
            out.get_ref().sync_data()?;
        }
        fs::rename(&tmp, &self.path)?;
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}

/// Parse entries from disk, stopping at the first unreadable line.
fn read_entries(path: &Path) -> (Vec<WalEntry>, bool) {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(_) => return (Vec::new(), false),
    };
    let mut entries = Vec::new();
    let mut corrupt = false;
    for raw in bytes.split(|&b| b == b'\n') {
        if raw.is_empty() {
            continue;
        }
        match std::str::from_utf8(raw).ok().and_then(|s| serde_json::from_str(s).ok()) {
            Some(entry) => entries.push(entry),
            None => {
                corrupt = true;
                break;
            }
        }
    }
    (entries, corrupt)
}

/// Preserve the corrupt file to a rotated `.bak` and rewrite the valid prefix.
fn quarantine(path: &Path, valid: &[WalEntry]) -> Result<(), WalError> {
    let bak = rotate_bak_path(path);
    warn!(path = %path.display(), bak = %bak.display(), "corrupt ledger quarantined");
    fs::rename(path, &bak)?;
    let mut out = BufWriter::new(File::create(path)?);
    for entry in valid {
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');
        out.write_all(&line)?;
    }
    out.flush()?;
    out.get_ref().sync_data()?;
    Ok(())
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
