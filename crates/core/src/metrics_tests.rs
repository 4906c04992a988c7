// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[test]
fn empty_samples_are_all_null() {
    let summary = summarize(&[]);
    assert_eq!(summary, MetricSummary::empty());
    assert_eq!(summary.sample_size, 0);
}

#[test]
fn two_samples_match_slo_scenario() {
    // durations 100 and 300: p50=100, p95=300, avg=200
    let summary = summarize(&[100, 300]);
    assert_eq!(summary.p50, Some(100));
    assert_eq!(summary.p95, Some(300));
    assert_eq!(summary.avg, Some(200));
    assert_eq!(summary.sample_size, 2);
}

#[test]
fn queue_wait_slo_scenario() {
    let summary = summarize(&[40, 80]);
    assert_eq!(summary.p50, Some(40));
    assert_eq!(summary.p95, Some(80));
    assert_eq!(summary.avg, Some(60));
}

#[test]
fn single_sample_is_every_percentile() {
    let summary = summarize(&[7]);
    assert_eq!(summary.p50, Some(7));
    assert_eq!(summary.p95, Some(7));
    assert_eq!(summary.avg, Some(7));
}

#[test]
fn unsorted_input_is_sorted_first() {
    let summary = summarize(&[300, 100, 200]);
    assert_eq!(summary.p50, Some(200));
    assert_eq!(summary.p95, Some(300));
}

#[parameterized(
    ten_values_p50 = { 50, Some(5) },
    ten_values_p95 = { 95, Some(10) },
    ten_values_p100 = { 100, Some(10) },
)]
fn nearest_rank_on_one_to_ten(p: u32, expected: Option<u64>) {
    let sorted: Vec<u64> = (1..=10).collect();
    assert_eq!(nearest_rank(&sorted, p), expected);
}

#[test]
fn avg_is_integer_rounded() {
    assert_eq!(summarize(&[1, 2]).avg, Some(2)); // 1.5 rounds up
    assert_eq!(summarize(&[1, 1, 2]).avg, Some(1)); // 1.33 rounds down
}

#[parameterized(
    all_completed = { 3, 0, 1.0 },
    half = { 1, 1, 0.5 },
    third = { 1, 2, 0.3333 },
    none_terminal = { 0, 0, 0.0 },
)]
fn success_rates(completed: usize, failed: usize, expected: f64) {
    assert!((success_rate(completed, failed) - expected).abs() < f64::EPSILON);
}

proptest! {
    #[test]
    fn percentiles_are_members_of_the_sample(samples in prop::collection::vec(0u64..10_000, 1..100)) {
        let summary = summarize(&samples);
        let p50 = summary.p50.unwrap();
        let p95 = summary.p95.unwrap();
        prop_assert!(samples.contains(&p50));
        prop_assert!(samples.contains(&p95));
        prop_assert!(p50 <= p95);
    }

    #[test]
    fn avg_is_bounded_by_extremes(samples in prop::collection::vec(0u64..10_000, 1..100)) {
        let summary = summarize(&samples);
        let min = *samples.iter().min().unwrap();
        let max = *samples.iter().max().unwrap();
        let avg = summary.avg.unwrap();
        prop_assert!(avg >= min && avg <= max);
    }
}
