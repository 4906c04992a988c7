// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn claimed(id: &str, worker: &str, at_ms: i64) -> LedgerEvent {
    LedgerEvent::JobClaimed {
        job_id: JobId::from_string(id),
        worker_id: worker.to_string(),
        claimed_at: t_plus_ms(at_ms),
    }
}

fn released(id: &str, worker: &str, at_ms: i64) -> LedgerEvent {
    LedgerEvent::JobReleased {
        job_id: JobId::from_string(id),
        lost_worker_id: worker.to_string(),
        released_at: t_plus_ms(at_ms),
    }
}

// ── Basic transitions ────────────────────────────────────────────────────────

#[test]
fn enqueued_starts_pending_with_attempt_one() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });

    assert_eq!(state.jobs["j1"].status, QueueStatus::Pending);
    assert_eq!(state.jobs["j1"].attempt_count, 1);
}

#[test]
fn claim_binds_worker() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));

    assert_eq!(state.jobs["j1"].status, QueueStatus::Claimed);
    assert_eq!(state.jobs["j1"].worker_id.as_deref(), Some("w1"));
}

#[test]
fn completed_records_summary_and_duration() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));
    state.apply(&LedgerEvent::JobCompleted {
        job_id: JobId::from_string("j1"),
        summary: Some("patched".into()),
        artifacts: Some(serde_json::json!({"commit": "abc"})),
        duration_ms: 4_000,
        completed_at: t_plus_ms(4_050),
    });

    let row = &state.jobs["j1"];
    assert_eq!(row.status, QueueStatus::Completed);
    assert_eq!(row.summary.as_deref(), Some("patched"));
    assert_eq!(row.duration_ms, Some(4_000));
}

#[test]
fn failed_records_message_and_detail() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));
    state.apply(&LedgerEvent::JobFailed {
        job_id: JobId::from_string("j1"),
        message: "tests failed".into(),
        detail: Some("2 assertions".into()),
        duration_ms: 900,
        failed_at: t_plus_ms(950),
    });

    let row = &state.jobs["j1"];
    assert_eq!(row.status, QueueStatus::Failed);
    assert_eq!(row.message.as_deref(), Some("tests failed"));
    assert_eq!(row.detail.as_deref(), Some("2 assertions"));
}

// ── Stale-claim release ──────────────────────────────────────────────────────

#[test]
fn release_returns_job_to_pending_and_bumps_attempts() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));
    state.apply(&released("j1", "w1", 130_000));

    let row = &state.jobs["j1"];
    assert_eq!(row.status, QueueStatus::Pending);
    assert!(row.worker_id.is_none());
    assert!(row.claimed_at.is_none());
    assert_eq!(row.attempt_count, 2);
}

#[test]
fn release_applied_twice_bumps_once() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));
    let release = released("j1", "w1", 130_000);
    state.apply(&release);
    state.apply(&release);

    assert_eq!(state.jobs["j1"].attempt_count, 2);
}

#[test]
fn release_for_wrong_worker_is_ignored() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w2", 50));
    state.apply(&released("j1", "w1", 130_000));

    assert_eq!(state.jobs["j1"].status, QueueStatus::Claimed);
    assert_eq!(state.jobs["j1"].attempt_count, 1);
}

#[test]
fn reclaim_after_release_succeeds() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobEnqueued { job: job_row("j1", Priority::Normal) });
    state.apply(&claimed("j1", "w1", 50));
    state.apply(&released("j1", "w1", 130_000));
    state.apply(&claimed("j1", "w2", 131_000));

    assert_eq!(state.jobs["j1"].status, QueueStatus::Claimed);
    assert_eq!(state.jobs["j1"].worker_id.as_deref(), Some("w2"));
    assert_eq!(state.jobs["j1"].attempt_count, 2);
}

// ── Log tails ────────────────────────────────────────────────────────────────

#[test]
fn log_lines_accumulate_in_order() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobLogAppended {
        line: log_line("j1", 1, LogStream::Stdout, 1, "starting"),
    });
    state.apply(&LedgerEvent::JobLogAppended {
        line: log_line("j1", 2, LogStream::Stdout, 2, "done"),
    });

    let tail = &state.job_logs["j1"];
    assert_eq!(tail.lines.len(), 2);
    assert_eq!(tail.next_id, 3);
    assert_eq!(tail.lines[1].message, "done");
}

#[test]
fn duplicate_seq_is_ignored() {
    let mut state = MaterializedState::default();
    let line = LedgerEvent::JobLogAppended {
        line: log_line("j1", 1, LogStream::Stdout, 7, "once"),
    };
    state.apply(&line);
    state.apply(&line);

    assert_eq!(state.job_logs["j1"].lines.len(), 1);
}

#[test]
fn streams_have_independent_seq_spaces() {
    let mut state = MaterializedState::default();
    state.apply(&LedgerEvent::JobLogAppended {
        line: log_line("j1", 1, LogStream::Stdout, 1, "out"),
    });
    state.apply(&LedgerEvent::JobLogAppended {
        line: log_line("j1", 2, LogStream::Stderr, 1, "err"),
    });

    assert_eq!(state.job_logs["j1"].lines.len(), 2);
}

#[test]
fn tail_is_bounded() {
    let mut state = MaterializedState::default();
    for i in 1..=(JOB_LOG_TAIL_MAX as u64 + 50) {
        state.apply(&LedgerEvent::JobLogAppended {
            line: log_line("j1", i, LogStream::Stdout, i, &format!("line {i}")),
        });
    }

    let tail = &state.job_logs["j1"];
    assert_eq!(tail.lines.len(), JOB_LOG_TAIL_MAX);
    // Oldest lines were evicted
    assert_eq!(tail.lines.front().map(|l| l.id), Some(51));
}

// ── Head-selection ordering ──────────────────────────────────────────────────

#[test]
fn pending_jobs_order_by_priority_then_fifo() {
    let mut state = MaterializedState::default();
    let mut a = job_row("jA", Priority::Background);
    a.seq = 1;
    let mut b = job_row("jB", Priority::Interactive);
    b.seq = 2;

    state.apply(&LedgerEvent::JobEnqueued { job: a });
    state.apply(&LedgerEvent::JobEnqueued { job: b });

    let order: Vec<&str> = state.pending_jobs().iter().map(|j| j.id.as_str()).collect();
    assert_eq!(order, vec!["jB", "jA"]);
}
