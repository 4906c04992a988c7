// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pp-wire: HTTP wire contract for the PushPals coordinator.
//!
//! Request and response bodies shared by the daemon and its clients.
//! All JSON is camelCase.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod requests;
mod responses;
mod status;

pub use requests::{
    AppendJobLogBody, ClaimCompletionBody, ClaimJobBody, ClaimRequestBody, CommandBody,
    CompleteJobBody, CompleteRequestBody, CreateSessionBody, DecisionBody, EnqueueCompletionBody,
    EnqueueJobBody, EnqueueRequestBody, FailBody, FailCompletionBody, HeartbeatBody, MessageBody,
};
pub use responses::{
    AcceptedResponse, AppendLogResponse, ClaimedCompletionResponse, ClaimedJob, ClaimedJobResponse,
    ClaimedRequest, ClaimedRequestResponse, EnqueuedCompletionResponse, EnqueuedJobResponse,
    EnqueuedRequestResponse, ErrorBody, EventFrame, HealthResponse, JobLogPage, OkResponse,
    SessionCreatedResponse, WorkerEntry, WorkersResponse,
};
pub use status::{CompletionCounts, QueueCounts, QueueSlo, SloReport, SystemStatus, WorkerCounts};
