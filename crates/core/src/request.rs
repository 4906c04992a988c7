// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queued user requests awaiting a planner.

use crate::clock::elapsed_ms;
use crate::priority::Priority;
use crate::queue::QueueStatus;
use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a queued request.
    pub struct RequestId("req-");
}

/// One row in the request queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub session_id: SessionId,
    pub prompt: String,
    pub priority: Priority,
    pub queue_wait_budget_ms: u64,
    pub status: QueueStatus,
    /// Insertion sequence for FIFO ordering among equal (priority, enqueuedAt).
    #[serde(default)]
    pub seq: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl Request {
    pub fn new(
        session_id: SessionId,
        prompt: impl Into<String>,
        priority: Priority,
        queue_wait_budget_ms: u64,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            session_id,
            prompt: prompt.into(),
            priority,
            queue_wait_budget_ms,
            status: QueueStatus::Pending,
            seq: 0,
            agent_id: None,
            result: None,
            error: None,
            enqueued_at,
            claimed_at: None,
            completed_at: None,
            failed_at: None,
            duration_ms: None,
        }
    }

    /// Timestamp at which the row became terminal, if it has.
    pub fn terminal_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.failed_at)
    }

    /// Time spent pending before claim, if claimed.
    pub fn queue_wait_ms(&self) -> Option<u64> {
        self.claimed_at.map(|c| elapsed_ms(self.enqueued_at, c))
    }

    /// Ordering key for head selection: priority rank, enqueue time, insertion order.
    pub fn order_key(&self) -> (u8, DateTime<Utc>, u64) {
        (self.priority.rank(), self.enqueued_at, self.seq)
    }
}
