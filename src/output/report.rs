//! Serializable reports for the JSON outputs.
//!
//! Reports are plain views over tables, diffs and trees, built by iterating
//! their read accessors. Schema is versioned like capture files.

use crate::cct::{CallTree, NodeId, NodeMetrics};
use crate::diff::{DiffSummary, DiffTable, RowOrigin};
use crate::session::Snapshot;
use crate::snapshot::{ClassMetricsTable, Metric, MetricValue, Ratio, SnapshotKind, TableKind};
use crate::utils::config::CAPTURE_SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One table row
#[derive(Debug, Clone, Serialize)]
pub struct ClassRow {
    pub class_name: String,

    pub values: BTreeMap<Metric, MetricValue>,

    /// Share of the scale bound of the sort metric
    pub share: Ratio,

    /// Side of the comparison the row came from (diffs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<RowOrigin>,
}

/// Report of one snapshot's table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub version: String,
    pub kind: TableKind,
    pub captured_at: DateTime<Utc>,
    pub totals: BTreeMap<Metric, MetricValue>,
    pub rows: Vec<ClassRow>,
    pub generated_at: String,
}

/// Report of a comparison between two snapshots
#[derive(Debug, Clone, Serialize)]
pub struct DiffReport {
    pub version: String,
    pub kind: SnapshotKind,
    pub older_captured_at: DateTime<Utc>,
    pub newer_captured_at: DateTime<Utc>,
    pub summary: DiffSummary,
    /// Symmetric scale bound per metric
    pub bounds: BTreeMap<Metric, MetricValue>,
    pub rows: Vec<ClassRow>,
    pub generated_at: String,
}

/// Report of the materialized part of a call tree
#[derive(Debug, Clone, Serialize)]
pub struct TreeReport {
    pub version: String,
    pub class_name: String,
    pub reverse: bool,
    pub root: TreeNodeReport,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeNodeReport {
    pub name: String,
    pub metrics: NodeMetrics,
    /// Share of the root total of the report metric
    pub share: Ratio,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNodeReport>,
}

/// Build a report of `rows` of a snapshot table, shares taken against the
/// scale bound of `metric`
pub fn table_report(
    table: &ClassMetricsTable,
    captured_at: DateTime<Utc>,
    rows: &[usize],
    metric: Metric,
) -> TableReport {
    let totals = table
        .kind()
        .metrics()
        .iter()
        .filter_map(|&m| Some((m, table.total(m)?)))
        .collect();

    TableReport {
        version: CAPTURE_SCHEMA_VERSION.to_string(),
        kind: table.kind(),
        captured_at,
        totals,
        rows: rows.iter().map(|&row| class_row(table, row, metric, None)).collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Build a report of `rows` of a diff between the snapshots `older` and
/// `newer`
pub fn diff_report(diff: &DiffTable, rows: &[usize], metric: Metric, older: &Snapshot, newer: &Snapshot) -> DiffReport {
    let bounds = diff
        .base_kind()
        .metrics()
        .iter()
        .filter_map(|&m| Some((m, diff.bound(m)?)))
        .collect();

    DiffReport {
        version: CAPTURE_SCHEMA_VERSION.to_string(),
        kind: diff.base_kind(),
        older_captured_at: older.captured_at(),
        newer_captured_at: newer.captured_at(),
        summary: diff.summary(),
        bounds,
        rows: rows
            .iter()
            .map(|&row| class_row(diff.table(), row, metric, Some(diff.origin(row))))
            .collect(),
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Build a report of every materialized node of `tree`
pub fn tree_report(tree: &CallTree<'_>, metric: Metric) -> TreeReport {
    let root = tree.root();
    TreeReport {
        version: CAPTURE_SCHEMA_VERSION.to_string(),
        class_name: tree.node_name(root),
        reverse: tree.is_reverse(),
        root: tree_node(tree, root, metric),
        generated_at: Utc::now().to_rfc3339(),
    }
}

fn class_row(table: &ClassMetricsTable, row: usize, metric: Metric, origin: Option<RowOrigin>) -> ClassRow {
    let values = table
        .kind()
        .metrics()
        .iter()
        .filter_map(|&m| Some((m, table.metric(m, row)?)))
        .collect();

    ClassRow {
        class_name: table.class_name(row).to_string(),
        values,
        share: table.share(metric, row),
        origin,
    }
}

fn tree_node(tree: &CallTree<'_>, id: NodeId, metric: Metric) -> TreeNodeReport {
    TreeNodeReport {
        name: tree.node_name(id),
        metrics: *tree.metrics(id),
        share: tree.ratio(id, metric),
        children: tree
            .node(id)
            .child_ids()
            .iter()
            .map(|&child| tree_node(tree, child, metric))
            .collect(),
    }
}
