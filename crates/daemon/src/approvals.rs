// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending approvals gating side-effecting operations.
//!
//! Deliberately in-memory: an approval that nobody decided before a
//! restart is void, and the requesting agent re-asks.

use parking_lot::Mutex;
use pp_core::SessionId;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Error message for a decision on an unknown or already-resolved approval.
pub const APPROVAL_NOT_FOUND: &str = "Approval not found";

/// One pending approval.
#[derive(Debug, Clone)]
pub struct Approval {
    pub approval_id: String,
    pub session_id: SessionId,
    pub action: String,
    pub summary: String,
    pub details: Option<Value>,
    /// Back-link to the originating tool call, when implicit.
    pub tool_call_id: Option<String>,
}

/// Registry keyed by approval id. First decision wins and removes the entry.
#[derive(Clone, Default)]
pub struct Approvals {
    inner: Arc<Mutex<HashMap<String, Approval>>>,
}

impl Approvals {
    /// Register a pending approval. Re-registration under the same id
    /// replaces the entry (latest request wins).
    pub fn insert(&self, approval: Approval) {
        self.inner.lock().insert(approval.approval_id.clone(), approval);
    }

    /// Resolve: removes and returns the entry, if present.
    pub fn take(&self, approval_id: &str) -> Option<Approval> {
        self.inner.lock().remove(approval_id)
    }

    pub fn get(&self, approval_id: &str) -> Option<Approval> {
        self.inner.lock().get(approval_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "approvals_tests.rs"]
mod tests;
