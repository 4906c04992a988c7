// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pp-core: Domain types for the PushPals pipeline coordinator

pub mod macros;

pub mod clock;
pub mod completion;
pub mod envelope;
pub mod id;
pub mod job;
pub mod metrics;
pub mod priority;
pub mod queue;
pub mod ready;
pub mod request;
pub mod scrub;
pub mod session;
pub mod task;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use completion::{Completion, CompletionId, CompletionStatus};
pub use envelope::{
    AgentStatusPayload, ApprovalPayload, ApprovalRefPayload, CommitPayload, Envelope, EnvelopeError,
    ErrorPayload, EventBody, EventId, GenericPayload, JobFailurePayload, JobLogPayload,
    JobOutcomePayload, JobRefPayload, MessagePayload, TaskCompletedPayload, TaskCreatedPayload,
    TaskFailedPayload, TaskProgressPayload, TaskRefPayload, TextPayload, ToolCallPayload,
    PROTOCOL_VERSION,
};
pub use id::short;
pub use job::{Job, JobId, JobLogLine, LogStream};
pub use metrics::MetricSummary;
pub use priority::Priority;
pub use queue::QueueStatus;
pub use request::{Request, RequestId};
pub use session::{SessionId, SessionIdError};
pub use task::{TaskState, TaskStatus};
pub use worker::{WorkerCapabilities, WorkerRecord, WorkerStatus};
