// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Latency summarization over terminal queue rows.
//!
//! Percentiles use the nearest-rank method with ceiling indexing:
//! `rank = ceil(p/100 · N) − 1`, clamped to `[0, N−1]`, over a sorted copy.

use serde::{Deserialize, Serialize};

/// Percentile-and-average view of one metric sample set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub p50: Option<u64>,
    pub p95: Option<u64>,
    pub avg: Option<u64>,
    pub sample_size: usize,
}

impl MetricSummary {
    pub fn empty() -> Self {
        Self { p50: None, p95: None, avg: None, sample_size: 0 }
    }
}

/// Nearest-rank percentile of a sorted sample set.
pub fn nearest_rank(sorted: &[u64], p: u32) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (p as f64 / 100.0 * sorted.len() as f64).ceil() as usize;
    let idx = rank.saturating_sub(1).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Summarize a sample set as {p50, p95, avg, sampleSize}.
///
/// The average is integer-rounded; empty input yields all-null.
pub fn summarize(samples: &[u64]) -> MetricSummary {
    if samples.is_empty() {
        return MetricSummary::empty();
    }
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let sum: u128 = sorted.iter().map(|&v| v as u128).sum();
    let avg = ((sum as f64 / sorted.len() as f64).round()) as u64;
    MetricSummary {
        p50: nearest_rank(&sorted, 50),
        p95: nearest_rank(&sorted, 95),
        avg: Some(avg),
        sample_size: sorted.len(),
    }
}

/// Success rate rounded to 4 decimals; 0.0 when there are no terminal rows.
pub fn success_rate(completed: usize, failed: usize) -> f64 {
    let terminal = completed + failed;
    if terminal == 0 {
        return 0.0;
    }
    let rate = completed as f64 / terminal as f64;
    (rate * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
