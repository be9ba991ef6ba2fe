//! Unit tests for the diff module.
//!
//! Covers alignment, signed deltas, bounds and the self-diff invariant.

use super::*;
use crate::snapshot::{ClassMetricsTable, Metric, MetricColumn, MetricValue, SnapshotKind};

/// Helper function to create an allocation table of (class, bytes, objects)
fn allocation_table(rows: &[(&str, i64, i64)]) -> ClassMetricsTable {
    ClassMetricsTable::new(
        SnapshotKind::Allocation,
        rows.iter().map(|r| r.0.to_string()).collect(),
        vec![
            (Metric::AllocatedBytes, MetricColumn::Counts(rows.iter().map(|r| r.1).collect())),
            (Metric::AllocatedObjects, MetricColumn::Counts(rows.iter().map(|r| r.2).collect())),
        ],
    )
    .unwrap()
}

/// Helper function to create a liveness table with a single class
fn liveness_table(class: &str, live_bytes: i64, avg_age: f64, generations: i64) -> ClassMetricsTable {
    ClassMetricsTable::new(
        SnapshotKind::Liveness,
        vec![class.to_string()],
        vec![
            (Metric::LiveBytes, MetricColumn::Counts(vec![live_bytes])),
            (Metric::LiveObjects, MetricColumn::Counts(vec![1])),
            (Metric::TrackedAllocations, MetricColumn::Counts(vec![1])),
            (Metric::AverageAge, MetricColumn::Averages(vec![avg_age])),
            (Metric::SurvivingGenerations, MetricColumn::Counts(vec![generations])),
            (Metric::TotalAllocations, MetricColumn::Counts(vec![10])),
        ],
    )
    .unwrap()
}

fn bytes(diff: &DiffTable, row: usize) -> i64 {
    match diff.metric(Metric::AllocatedBytes, row) {
        Some(MetricValue::Count(v)) => v,
        other => panic!("unexpected value {:?}", other),
    }
}

#[test]
fn test_foo_bar_baz_scenario() {
    let a = allocation_table(&[("Foo", 100, 1), ("Bar", 50, 1)]);
    let b = allocation_table(&[("Foo", 150, 1), ("Baz", 20, 1)]);

    let diff = generate_diff(&a, &b).unwrap();

    assert_eq!(diff.row_count(), 3);
    assert_eq!(diff.class_name(0), "Foo");
    assert_eq!(diff.class_name(1), "Baz");
    assert_eq!(diff.class_name(2), "Bar");

    assert_eq!(bytes(&diff, 0), 50);
    assert_eq!(bytes(&diff, 1), 20);
    assert_eq!(bytes(&diff, 2), -50);

    assert_eq!(diff.origin(0), RowOrigin::Both);
    assert_eq!(diff.origin(1), RowOrigin::NewerOnly);
    assert_eq!(diff.origin(2), RowOrigin::OlderOnly);

    assert_eq!(diff.bound(Metric::AllocatedBytes), Some(MetricValue::Count(50)));
}

#[test]
fn test_self_diff_is_all_zero() {
    let table = allocation_table(&[("A", 10, 1), ("B", 0, 0), ("C", 999, 7)]);
    let diff = generate_diff(&table, &table).unwrap();

    assert_eq!(diff.row_count(), 3);
    for row in 0..diff.row_count() {
        for &metric in SnapshotKind::Allocation.metrics() {
            assert!(diff.metric(metric, row).unwrap().is_zero());
        }
    }
    for &metric in SnapshotKind::Allocation.metrics() {
        assert!(diff.bound(metric).unwrap().is_zero());
    }
    assert!(diff.is_identical());
}

#[test]
fn test_average_age_delta_is_plain_subtraction() {
    let older = liveness_table("A", 100, 2.5, 3);
    let newer = liveness_table("A", 80, 4.0, 1);

    let diff = generate_diff(&older, &newer).unwrap();

    assert_eq!(diff.metric(Metric::AverageAge, 0), Some(MetricValue::Average(1.5)));
    assert_eq!(diff.metric(Metric::SurvivingGenerations, 0), Some(MetricValue::Count(-2)));
    assert_eq!(diff.metric(Metric::LiveBytes, 0), Some(MetricValue::Count(-20)));
    assert_eq!(diff.bound(Metric::SurvivingGenerations), Some(MetricValue::Count(2)));
}

#[test]
fn test_bound_uses_larger_magnitude_side() {
    let older = allocation_table(&[("A", 500, 1), ("B", 10, 1)]);
    let newer = allocation_table(&[("A", 100, 1), ("B", 40, 1)]);

    let diff = generate_diff(&older, &newer).unwrap();

    // max delta is +30, min delta is -400
    assert_eq!(diff.bound(Metric::AllocatedBytes), Some(MetricValue::Count(400)));
    assert_eq!(diff.table().scale_bound(Metric::AllocatedBytes), Some(MetricValue::Count(400)));
}

#[test]
fn test_incompatible_kinds_rejected() {
    let allocation = allocation_table(&[("A", 1, 1)]);
    let liveness = liveness_table("A", 1, 1.0, 1);

    let err = generate_diff(&allocation, &liveness).unwrap_err();
    assert!(matches!(err, DiffError::IncompatibleKinds(_, _)));
}

#[test]
fn test_nested_diff_rejected() {
    let table = allocation_table(&[("A", 1, 1)]);
    let diff = generate_diff(&table, &table).unwrap();

    let err = generate_diff(diff.table(), &table).unwrap_err();
    assert!(matches!(err, DiffError::NestedDiff(_)));
}

#[test]
fn test_diff_of_empty_tables() {
    let empty = ClassMetricsTable::empty(SnapshotKind::Sampled);
    let diff = generate_diff(&empty, &empty).unwrap();

    assert!(diff.is_empty());
    assert_eq!(diff.bound(Metric::LiveBytes), Some(MetricValue::Count(0)));
    assert_eq!(diff.summary(), DiffSummary::default());
}

#[test]
fn test_summary_classifies_rows() {
    let older = allocation_table(&[("Grow", 10, 1), ("Shrink", 10, 1), ("Same", 10, 1), ("Gone", 5, 1)]);
    let newer = allocation_table(&[("Grow", 20, 1), ("Shrink", 5, 1), ("Same", 10, 1), ("New", 5, 1)]);

    let summary = generate_diff(&older, &newer).unwrap().summary();

    assert_eq!(
        summary,
        DiffSummary {
            grown: 1,
            shrunk: 1,
            unchanged: 1,
            new_classes: 1,
            vanished_classes: 1,
        }
    );
}
