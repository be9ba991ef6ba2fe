//! Terminal rendering of tables, diffs and call trees.
//!
//! Growth is shown in red and shrinkage in green, matching the
//! "more memory is worse" reading of a profiler.

use crate::cct::{CallTree, NodeId};
use crate::diff::{DiffTable, RowOrigin};
use crate::selection::SelectionSet;
use crate::snapshot::{ClassMetricsTable, Metric, MetricValue};
use colored::*;

const NAME_WIDTH: usize = 48;
const VALUE_WIDTH: usize = 14;

/// Render `rows` of a snapshot table; selected classes are marked with `*`
pub fn render_table(table: &ClassMetricsTable, rows: &[usize], metric: Metric, selection: &SelectionSet) -> String {
    let metrics = table.kind().metrics();
    let mut out = String::new();

    out.push_str(&format!("\n{} ", table.kind().to_string().bold()));
    out.push_str(&format!("snapshot, {} classes\n", table.row_count()));
    out.push_str(&render_header(metrics));

    for &row in rows {
        let marker = if selection.is_row_selected(table, row) { "*" } else { " " };
        out.push_str(&format!("{} {:<width$}", marker, shorten(table.class_name(row)), width = NAME_WIDTH));
        for &m in metrics {
            let value = table.metric(m, row).map(|v| v.to_string()).unwrap_or_default();
            out.push_str(&format!(" {:>width$}", value, width = VALUE_WIDTH));
        }
        out.push_str(&format!(" {:>8}\n", table.share(metric, row).to_string()));
    }

    if let Some(total) = table.total(metric) {
        out.push_str(&format!("\nTotal {}: {}\n", metric.label(), total.to_string().bold()));
    }
    out
}

/// Render `rows` of a diff with signed, colored deltas
pub fn render_diff(diff: &DiffTable, rows: &[usize], metric: Metric) -> String {
    let metrics = diff.base_kind().metrics();
    let mut out = String::new();

    out.push_str(&format!("\n{}\n", "Snapshot Comparison".bold()));
    out.push_str("---------------------------------------------------\n");
    out.push_str(&render_header(metrics));

    for &row in rows {
        let marker = match diff.origin(row) {
            RowOrigin::Both => " ",
            RowOrigin::NewerOnly => "+",
            RowOrigin::OlderOnly => "-",
        };
        out.push_str(&format!("{} {:<width$}", marker, shorten(diff.class_name(row)), width = NAME_WIDTH));
        for &m in metrics {
            let cell = diff.metric(m, row).map(signed).unwrap_or_default();
            out.push_str(&format!(" {}", colorize(&format!("{:>width$}", cell, width = VALUE_WIDTH), diff.metric(m, row))));
        }
        out.push_str(&format!(" {:>8}\n", diff.scaled(metric, row).to_string()));
    }

    let summary = diff.summary();
    out.push_str("---------------------------------------------------\n");
    out.push_str(&format!(
        "{} grown, {} shrunk, {} unchanged, {} new, {} vanished\n",
        summary.grown.to_string().red(),
        summary.shrunk.to_string().green(),
        summary.unchanged,
        summary.new_classes,
        summary.vanished_classes
    ));
    if let Some(bound) = diff.bound(metric) {
        out.push_str(&format!("Scale bound ({}): {}\n", metric.label(), bound));
    }
    if diff.is_identical() {
        out.push_str(&format!("{}\n", "Snapshots are identical".green().bold()));
    }
    out
}

/// Render the materialized part of a call tree, indented by depth
pub fn render_tree(tree: &CallTree<'_>, metric: Metric) -> String {
    let mut out = String::new();
    let root = tree.root();

    if tree.is_empty() {
        out.push_str(&format!("{}: {}\n", tree.node_name(root), "no stack data".yellow()));
        return out;
    }

    let direction = if tree.is_reverse() { "reverse" } else { "forward" };
    out.push_str(&format!("\n{} ({} call tree, {})\n", tree.node_name(root).bold(), direction, metric.label()));
    render_subtree(tree, root, metric, &mut out);
    out
}

fn render_subtree(tree: &CallTree<'_>, id: NodeId, metric: Metric, out: &mut String) {
    for &child in tree.node(id).child_ids() {
        let node = tree.node(child);
        let indent = "  ".repeat(node.depth());
        let expander = if tree.is_leaf(child) {
            " "
        } else if node.is_expanded() {
            "-"
        } else {
            "+"
        };
        out.push_str(&format!(
            "{:>7} {:>width$}  {}{} {}\n",
            tree.ratio(child, metric).to_string(),
            node.metrics().value(metric).to_string(),
            indent,
            expander,
            tree.node_name(child),
            width = VALUE_WIDTH
        ));
        render_subtree(tree, child, metric, out);
    }
}

fn render_header(metrics: &[Metric]) -> String {
    let mut out = format!("  {:<width$}", "Class", width = NAME_WIDTH);
    for m in metrics {
        out.push_str(&format!(" {:>width$}", m.label(), width = VALUE_WIDTH));
    }
    out.push_str(&format!(" {:>8}\n", "Share"));
    out
}

/// Delta with an explicit sign
fn signed(value: MetricValue) -> String {
    match value {
        MetricValue::Count(v) => format!("{:+}", v),
        MetricValue::Average(v) => format!("{:+.1}", v),
    }
}

fn colorize(text: &str, value: Option<MetricValue>) -> ColoredString {
    match value.map(MetricValue::as_f64) {
        Some(v) if v > 0.0 => text.red(),
        Some(v) if v < 0.0 => text.green(),
        _ => text.normal(),
    }
}

fn shorten(class_name: &str) -> String {
    if class_name.chars().count() <= NAME_WIDTH {
        class_name.to_string()
    } else {
        let tail: String = class_name.chars().rev().take(NAME_WIDTH - 3).collect::<Vec<_>>().into_iter().rev().collect();
        format!("...{}", tail)
    }
}
