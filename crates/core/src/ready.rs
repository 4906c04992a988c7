// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Startup-readiness aggregation.
//!
//! Each required agent reports `status` events while it boots; the bus
//! announces once when the full set has come online.

use crate::envelope::EventBody;

/// Agents that must report online before the ready announcement.
pub const REQUIRED_AGENTS: [&str; 3] = ["localbuddy", "remotebuddy", "source-control-manager"];

/// Canonical text of the one-time ready announcement.
pub const READY_TEXT: &str =
    "All systems online — localbuddy, remotebuddy, and source-control-manager are ready.";

/// If this event is a required agent reporting online, returns that
/// agent's canonical name.
///
/// Matches `status` events whose `agentId` starts with a required agent
/// name and whose `detail` contains the token "online".
pub fn online_report(body: &EventBody) -> Option<&'static str> {
    let EventBody::Status(payload) = body else {
        return None;
    };
    let agent_id = payload.agent_id.as_deref()?;
    let detail = payload.detail.as_deref()?;
    if !detail.to_ascii_lowercase().contains("online") {
        return None;
    }
    REQUIRED_AGENTS.iter().find(|name| agent_id.starts_with(*name)).copied()
}

/// Whether this event is the ready announcement itself.
pub fn is_ready_announcement(body: &EventBody) -> bool {
    matches!(body, EventBody::AssistantMessage(p) if p.text == READY_TEXT)
}

#[cfg(test)]
#[path = "ready_tests.rs"]
mod tests;
