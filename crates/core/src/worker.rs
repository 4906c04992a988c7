// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry records and liveness.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default TTL for the online flag in worker listings.
pub const ONLINE_TTL_MS: u64 = 15_000;

/// Default TTL after which a claimed job's worker counts as lost.
pub const STALE_CLAIM_TTL_MS: u64 = 120_000;

/// Self-reported worker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    #[default]
    Idle,
    Busy,
    Error,
    Offline,
}

crate::simple_display! {
    WorkerStatus {
        Idle => "idle",
        Busy => "busy",
        Error => "error",
        Offline => "offline",
    }
}

/// Capabilities a worker advertises in its heartbeat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCapabilities {
    #[serde(default)]
    pub docker: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
}

/// Registry entry for one worker daemon, upserted by heartbeats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub worker_id: String,
    pub status: WorkerStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_job_id: Option<String>,
    pub last_heartbeat_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_ms: Option<u64>,
    #[serde(default)]
    pub capabilities: WorkerCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl WorkerRecord {
    /// A worker is online iff its last heartbeat is within `ttl_ms` of `now`.
    pub fn is_online(&self, now: DateTime<Utc>, ttl_ms: u64) -> bool {
        crate::clock::elapsed_ms(self.last_heartbeat_at, now) <= ttl_ms
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
