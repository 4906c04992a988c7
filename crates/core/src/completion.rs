// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-produced commits awaiting integration.

use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a completion record.
    pub struct CompletionId("cpl-");
}

/// Status of a completion through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Claimed,
    Processed,
    Failed,
}

crate::simple_display! {
    CompletionStatus {
        Pending => "pending",
        Claimed => "claimed",
        Processed => "processed",
        Failed => "failed",
    }
}

impl CompletionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CompletionStatus::Processed | CompletionStatus::Failed)
    }
}

/// One row in the completion queue (plain FIFO, no priorities).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub id: CompletionId,
    pub job_id: String,
    pub session_id: SessionId,
    pub commit_sha: String,
    pub branch: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_body: Option<String>,
    pub status: CompletionStatus,
    /// Insertion sequence for FIFO ordering among equal enqueue times.
    #[serde(default)]
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pusher_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
}
