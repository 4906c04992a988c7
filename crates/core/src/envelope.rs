// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned event envelope and the closed set of event bodies.
//!
//! Serializes with `{"type": "<name>", "payload": {...}}` adjacent tagging
//! so arbitrary payload shapes stay addressable per event type. Unknown
//! type tags fail deserialization — the bus substitutes an `error` event
//! for them instead of persisting the original.

use crate::session::SessionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Protocol version stamped on every envelope. Constant across a log.
pub const PROTOCOL_VERSION: &str = "0.1.0";

crate::define_id! {
    /// Unique identifier for an event envelope.
    pub struct EventId("evt-");
}

/// Envelope validation failure.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("unknown event type: {0}")]
    UnknownType(String),
    #[error("payload must be a JSON object")]
    PayloadNotObject,
    #[error("invalid payload for {kind}: {message}")]
    BadPayload { kind: String, message: String },
}

/// An event as it appears on the wire and in the event log.
///
/// `cursor` is not part of the envelope; the store assigns it at append
/// time and streams carry it alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub protocol_version: String,
    pub id: EventId,
    pub ts: DateTime<Utc>,
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    #[serde(flatten)]
    pub body: EventBody,
}

impl Envelope {
    /// Build an envelope with a fresh id for the given session and body.
    pub fn new(session_id: SessionId, ts: DateTime<Utc>, body: EventBody) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            id: EventId::new(),
            ts,
            session_id,
            from: None,
            to: None,
            correlation_id: None,
            parent_id: None,
            turn_id: None,
            body,
        }
    }

    crate::setters! {
        option {
            from: String,
            to: String,
            correlation_id: String,
            parent_id: String,
            turn_id: String,
        }
    }
}

/// The closed set of event types with their payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventBody {
    // -- conversational --
    Message(MessagePayload),
    AssistantMessage(TextPayload),
    Log(TextPayload),
    Error(ErrorPayload),
    Done(GenericPayload),

    // -- task lifecycle --
    TaskCreated(TaskCreatedPayload),
    TaskStarted(TaskRefPayload),
    TaskProgress(TaskProgressPayload),
    TaskCompleted(TaskCompletedPayload),
    TaskFailed(TaskFailedPayload),

    // -- tools --
    ToolCall(ToolCallPayload),
    ToolResult(GenericPayload),

    // -- delegation --
    DelegateRequest(GenericPayload),
    DelegateResponse(GenericPayload),

    // -- jobs --
    JobEnqueued(JobRefPayload),
    JobClaimed(JobRefPayload),
    JobLog(JobLogPayload),
    JobCompleted(JobOutcomePayload),
    JobFailed(JobFailurePayload),

    // -- approvals --
    ApprovalRequired(ApprovalPayload),
    Approved(ApprovalRefPayload),
    Denied(ApprovalRefPayload),

    // -- repo --
    DiffReady(GenericPayload),
    Committed(CommitPayload),

    // -- misc --
    AgentStatus(AgentStatusPayload),
    Status(AgentStatusPayload),
    ScanResult(GenericPayload),
    Suggestions(GenericPayload),
}

impl EventBody {
    /// Wire name of this event type.
    pub fn kind(&self) -> &'static str {
        match self {
            EventBody::Message(_) => "message",
            EventBody::AssistantMessage(_) => "assistant_message",
            EventBody::Log(_) => "log",
            EventBody::Error(_) => "error",
            EventBody::Done(_) => "done",
            EventBody::TaskCreated(_) => "task_created",
            EventBody::TaskStarted(_) => "task_started",
            EventBody::TaskProgress(_) => "task_progress",
            EventBody::TaskCompleted(_) => "task_completed",
            EventBody::TaskFailed(_) => "task_failed",
            EventBody::ToolCall(_) => "tool_call",
            EventBody::ToolResult(_) => "tool_result",
            EventBody::DelegateRequest(_) => "delegate_request",
            EventBody::DelegateResponse(_) => "delegate_response",
            EventBody::JobEnqueued(_) => "job_enqueued",
            EventBody::JobClaimed(_) => "job_claimed",
            EventBody::JobLog(_) => "job_log",
            EventBody::JobCompleted(_) => "job_completed",
            EventBody::JobFailed(_) => "job_failed",
            EventBody::ApprovalRequired(_) => "approval_required",
            EventBody::Approved(_) => "approved",
            EventBody::Denied(_) => "denied",
            EventBody::DiffReady(_) => "diff_ready",
            EventBody::Committed(_) => "committed",
            EventBody::AgentStatus(_) => "agent_status",
            EventBody::Status(_) => "status",
            EventBody::ScanResult(_) => "scan_result",
            EventBody::Suggestions(_) => "suggestions",
        }
    }

    /// Validate a raw `(type, payload)` pair from command ingest.
    pub fn from_parts(kind: &str, payload: Value) -> Result<Self, EnvelopeError> {
        if !payload.is_object() {
            return Err(EnvelopeError::PayloadNotObject);
        }
        let tagged = serde_json::json!({ "type": kind, "payload": payload });
        serde_json::from_value(tagged).map_err(|e| {
            let message = e.to_string();
            if message.contains("unknown variant") {
                EnvelopeError::UnknownType(kind.to_string())
            } else {
                EnvelopeError::BadPayload { kind: kind.to_string(), message }
            }
        })
    }
}

/// Untyped payload for event types the coordinator passes through verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenericPayload(pub Map<String, Value>);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPayload {
    pub text: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub message: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCreatedPayload {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRefPayload {
    pub task_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgressPayload {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCompletedPayload {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFailedPayload {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRefPayload {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobLogPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutcomePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobFailurePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalPayload {
    pub approval_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRefPayload {
    pub approval_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
