// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared queue row status machine.
//!
//! Requests and jobs share one status machine:
//! `pending → claimed → {completed, failed}`. Stale-claim recovery is the
//! only backward move (`claimed → pending`).

use serde::{Deserialize, Serialize};

/// Status of a request or job through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Claimed,
    Completed,
    Failed,
}

crate::simple_display! {
    QueueStatus {
        Pending => "pending",
        Claimed => "claimed",
        Completed => "completed",
        Failed => "failed",
    }
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, QueueStatus::Completed | QueueStatus::Failed)
    }
}

/// Error message for a terminal operation on a row that is not claimed.
pub const NOT_IN_CLAIMED_STATE: &str = "not in claimed state";
