//! Core diff engine implementation.
//! Aligns two metrics tables by class name and computes signed deltas.

use crate::snapshot::{ClassMetricsTable, Metric, MetricColumn, MetricValue, TableKind};
use log::debug;
use std::collections::{BTreeMap, HashMap};

use super::schema::{DiffTable, RowOrigin};
use super::DiffError;

/// Generate a diff table comparing two snapshots of the same mode
///
/// # Arguments
/// * `older` - The snapshot to compare against
/// * `newer` - The snapshot to compare
///
/// # Returns
/// A DiffTable with one row per class present on either side:
/// - in both: `newer - older` for every metric, averages included
///   (a change in the average, not a re-averaged value)
/// - only in `newer`: the newer values, as if grown from zero
/// - only in `older`: the negated older values, as if shrunk to zero
///
/// Rows follow `newer` order, then vanished classes in `older` order.
///
/// # Errors
/// * `DiffError::NestedDiff` - If either input is already a diff
/// * `DiffError::IncompatibleKinds` - If the snapshots were captured in different modes
///
/// # Example
/// ```ignore
/// let diff = generate_diff(&older, &newer)?;
/// let bound = diff.bound(Metric::LiveBytes);
/// ```
pub fn generate_diff(
    older: &ClassMetricsTable,
    newer: &ClassMetricsTable,
) -> Result<DiffTable, DiffError> {
    // Step 1: Check compatibility
    check_compatibility(older, newer)?;

    let kind = older.kind().base();
    let metrics = kind.metrics();

    debug!(
        "Diffing {} snapshots: {} older rows, {} newer rows",
        kind,
        older.row_count(),
        newer.row_count()
    );

    // Step 2: Index the older side by class name
    let older_rows: HashMap<&str, usize> = older
        .class_names()
        .iter()
        .enumerate()
        .map(|(row, name)| (name.as_str(), row))
        .collect();

    let capacity = newer.row_count() + older.row_count();
    let mut class_names = Vec::with_capacity(capacity);
    let mut origins = Vec::with_capacity(capacity);
    let mut columns: Vec<DeltaColumn> = metrics.iter().map(|&m| DeltaColumn::new(m, capacity)).collect();
    let mut matched = vec![false; older.row_count()];

    // Step 3: Walk the newer side
    for row in 0..newer.row_count() {
        let name = newer.class_name(row);
        let baseline = older_rows.get(name).copied();

        for column in columns.iter_mut() {
            let current = cell(newer, column.metric, row);
            let delta = match baseline {
                Some(old_row) => current.delta(cell(older, column.metric, old_row)),
                None => current,
            };
            column.push(delta);
        }

        let origin = match baseline {
            Some(old_row) => {
                matched[old_row] = true;
                RowOrigin::Both
            }
            None => RowOrigin::NewerOnly,
        };

        class_names.push(name.to_string());
        origins.push(origin);
    }

    // Step 4: Append classes that vanished
    let vanished: Vec<usize> = (0..older.row_count()).filter(|&row| !matched[row]).collect();
    for old_row in vanished {
        for column in columns.iter_mut() {
            column.push(cell(older, column.metric, old_row).negate());
        }
        class_names.push(older.class_name(old_row).to_string());
        origins.push(RowOrigin::OlderOnly);
    }

    // Step 5: Symmetric bounds
    let bounds: BTreeMap<Metric, MetricValue> = columns.iter().map(|c| (c.metric, c.bound())).collect();

    debug!(
        "Diff produced {} rows ({} vanished)",
        class_names.len(),
        origins.iter().filter(|o| **o == RowOrigin::OlderOnly).count()
    );

    let table = ClassMetricsTable::from_parts(
        TableKind::Diff(kind),
        class_names,
        columns.into_iter().map(DeltaColumn::into_column),
    )?;

    Ok(DiffTable {
        table,
        origins,
        bounds,
    })
}

/// Check if two tables can be compared
///
/// # Returns
/// Ok if both are snapshots of the same mode, Err with reason if not
fn check_compatibility(older: &ClassMetricsTable, newer: &ClassMetricsTable) -> Result<(), DiffError> {
    for kind in [older.kind(), newer.kind()] {
        if kind.is_diff() {
            return Err(DiffError::NestedDiff(kind));
        }
    }

    if older.kind() != newer.kind() {
        return Err(DiffError::IncompatibleKinds(older.kind(), newer.kind()));
    }

    Ok(())
}

fn cell(table: &ClassMetricsTable, metric: Metric, row: usize) -> MetricValue {
    table.metric(metric, row).unwrap_or_else(|| MetricValue::zero(metric))
}

/// Deltas of one metric plus the running extremes seen so far
struct DeltaColumn {
    metric: Metric,
    values: Vec<MetricValue>,
    max: MetricValue,
    min: MetricValue,
}

impl DeltaColumn {
    fn new(metric: Metric, capacity: usize) -> Self {
        Self {
            metric,
            values: Vec::with_capacity(capacity),
            max: MetricValue::zero(metric),
            min: MetricValue::zero(metric),
        }
    }

    fn push(&mut self, delta: MetricValue) {
        self.max = self.max.max(delta);
        self.min = self.min.min(delta);
        self.values.push(delta);
    }

    fn bound(&self) -> MetricValue {
        self.max.abs().max(self.min.abs())
    }

    fn into_column(self) -> (Metric, MetricColumn) {
        (self.metric, MetricColumn::from_values(self.metric, self.values))
    }
}
