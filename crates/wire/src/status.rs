// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Aggregated system status and SLO summaries.

use pp_core::{Job, MetricSummary, Request};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCounts {
    pub total: usize,
    pub online: usize,
    pub busy: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueCounts {
    pub pending: usize,
    pub claimed: usize,
    pub completed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCounts {
    pub pending: usize,
    pub claimed: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Rolling-window SLO summary for one queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSlo {
    pub terminal: usize,
    pub completed: usize,
    pub failed: usize,
    /// Rounded to 4 decimals.
    pub success_rate: f64,
    pub duration_ms: MetricSummary,
    pub queue_wait_ms: MetricSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SloReport {
    pub window_hours: u32,
    pub requests: QueueSlo,
    pub jobs: QueueSlo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub ok: bool,
    pub protocol_version: String,
    pub uptime_ms: u64,
    pub workers: WorkerCounts,
    pub requests: QueueCounts,
    pub jobs: QueueCounts,
    pub completions: CompletionCounts,
    /// Head of the pending request queue (up to 10 rows).
    pub pending_requests: Vec<Request>,
    /// Head of the pending job queue (up to 10 rows).
    pub pending_jobs: Vec<Job>,
    pub slo: SloReport,
}
