// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task projection derived from `task_*` events.
//!
//! The projection is never stored on its own; it is folded from the
//! session event log, so replaying the log always reproduces it.

use crate::envelope::EventBody;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Started,
    InProgress,
    Completed,
    Failed,
}

crate::simple_display! {
    TaskStatus {
        Created => "created",
        Started => "started",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// Folded view of one task within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskState {
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_message: Option<String>,
}

/// Fold one event into the task map.
///
/// Idempotent: applying the same event twice produces the same map.
/// Events for unknown tasks (other than `task_created`) create a stub
/// entry so a lost `task_created` does not hide later transitions.
pub fn fold(tasks: &mut HashMap<String, TaskState>, body: &EventBody) {
    match body {
        EventBody::TaskCreated(p) => {
            let entry = tasks.entry(p.task_id.clone()).or_insert_with(|| stub(&p.task_id));
            entry.title = p.title.clone();
            entry.description = p.description.clone();
            entry.created_by = p.created_by.clone();
        }
        EventBody::TaskStarted(p) => {
            let entry = tasks.entry(p.task_id.clone()).or_insert_with(|| stub(&p.task_id));
            if entry.status == TaskStatus::Created {
                entry.status = TaskStatus::Started;
            }
        }
        EventBody::TaskProgress(p) => {
            let entry = tasks.entry(p.task_id.clone()).or_insert_with(|| stub(&p.task_id));
            if !matches!(entry.status, TaskStatus::Completed | TaskStatus::Failed) {
                entry.status = TaskStatus::InProgress;
            }
        }
        EventBody::TaskCompleted(p) => {
            let entry = tasks.entry(p.task_id.clone()).or_insert_with(|| stub(&p.task_id));
            entry.status = TaskStatus::Completed;
            entry.summary = p.summary.clone();
        }
        EventBody::TaskFailed(p) => {
            let entry = tasks.entry(p.task_id.clone()).or_insert_with(|| stub(&p.task_id));
            entry.status = TaskStatus::Failed;
            entry.fail_message = p.fail_message.clone();
        }
        _ => {}
    }
}

fn stub(task_id: &str) -> TaskState {
    TaskState {
        task_id: task_id.to_string(),
        title: None,
        description: None,
        created_by: None,
        status: TaskStatus::Created,
        summary: None,
        fail_message: None,
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
