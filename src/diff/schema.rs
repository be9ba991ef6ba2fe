//! Diff table definitions.

use crate::snapshot::{ClassMetricsTable, Metric, MetricValue, Ratio, SnapshotKind};
use serde::Serialize;
use std::collections::BTreeMap;

/// Which side(s) of the comparison a diff row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    /// Present in both snapshots; values are `newer - older`
    Both,
    /// Only in the newer snapshot; values are the newer values
    NewerOnly,
    /// Only in the older snapshot; values are the negated older values
    OlderOnly,
}

/// Counts of classes by how they changed between the two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Classes whose primary metric went up
    pub grown: usize,

    /// Classes whose primary metric went down
    pub shrunk: usize,

    /// Classes present on both sides with no change in the primary metric
    pub unchanged: usize,

    /// Classes only in the newer snapshot
    pub new_classes: usize,

    /// Classes only in the older snapshot
    pub vanished_classes: usize,
}

/// Signed per-class deltas between two snapshots
///
/// **Public** - produced by [`generate_diff`](super::generate_diff)
///
/// The wrapped table has kind `Diff(base)`. Rows are the newer snapshot's
/// classes in newer order, followed by classes that vanished, in older order.
#[derive(Debug, Clone)]
pub struct DiffTable {
    pub(super) table: ClassMetricsTable,
    pub(super) origins: Vec<RowOrigin>,
    pub(super) bounds: BTreeMap<Metric, MetricValue>,
}

impl DiffTable {
    /// The delta table itself, usable wherever a plain table is read
    pub fn table(&self) -> &ClassMetricsTable {
        &self.table
    }

    /// Profiling mode of the two compared snapshots
    pub fn base_kind(&self) -> SnapshotKind {
        self.table.kind().base()
    }

    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// # Panics
    /// If `row >= self.row_count()`.
    pub fn class_name(&self, row: usize) -> &str {
        self.table.class_name(row)
    }

    /// Signed delta of `metric` at `row`
    ///
    /// # Panics
    /// If `row >= self.row_count()`.
    pub fn metric(&self, metric: Metric, row: usize) -> Option<MetricValue> {
        self.table.metric(metric, row)
    }

    /// # Panics
    /// If `row >= self.row_count()`.
    pub fn origin(&self, row: usize) -> RowOrigin {
        self.origins[row]
    }

    /// Symmetric scale bound `max(|max delta|, |min delta|)` of `metric`
    pub fn bound(&self, metric: Metric) -> Option<MetricValue> {
        self.bounds.get(&metric).copied()
    }

    /// Delta at `row` relative to the bound of `metric`, in -100%..=100%
    pub fn scaled(&self, metric: Metric, row: usize) -> Ratio {
        match (self.metric(metric, row), self.bound(metric)) {
            (Some(delta), Some(bound)) => Ratio::of(delta.as_f64(), bound.as_f64()),
            _ => Ratio::NotApplicable,
        }
    }

    /// True when every delta of every row is zero
    pub fn is_identical(&self) -> bool {
        self.bounds.values().all(|b| b.is_zero())
    }

    /// Classify rows by their change in the base kind's primary metric
    pub fn summary(&self) -> DiffSummary {
        let primary = self.base_kind().primary_metric();
        let mut summary = DiffSummary::default();

        for row in 0..self.row_count() {
            match self.origin(row) {
                RowOrigin::NewerOnly => summary.new_classes += 1,
                RowOrigin::OlderOnly => summary.vanished_classes += 1,
                RowOrigin::Both => {
                    let delta = self
                        .metric(primary, row)
                        .map(MetricValue::as_f64)
                        .unwrap_or(0.0);
                    if delta > 0.0 {
                        summary.grown += 1;
                    } else if delta < 0.0 {
                        summary.shrunk += 1;
                    } else {
                        summary.unchanged += 1;
                    }
                }
            }
        }

        summary
    }
}
