//! Diff command implementation.
//! Orchestrates the comparison of two captures and reports per-class deltas.

use super::models::DiffArgs;
use super::utils::validate_capture_path;
use crate::diff::{generate_diff, DiffTable};
use crate::output::{diff_report, render_diff, write_json};
use crate::parser::read_capture;
use crate::snapshot::{ClassFilter, Metric};
use anyhow::{bail, Context, Result};
use colored::*;
use log::info;

/// Validate diff arguments
pub fn validate_diff_args(args: &DiffArgs) -> Result<()> {
    validate_capture_path(&args.older)?;
    validate_capture_path(&args.newer)?;
    if args.top == 0 {
        bail!("--top must be at least 1");
    }
    Ok(())
}

/// Execute the diff command
pub fn execute_diff(args: DiffArgs) -> Result<()> {
    // Step 1: Load captures
    let older = read_capture(&args.older).context("Failed to read older capture")?;
    let newer = read_capture(&args.newer).context("Failed to read newer capture")?;

    // Step 2: Generate diff
    let diff = generate_diff(older.table(), newer.table()).context("Failed to generate diff")?;

    let kind = diff.base_kind();
    let metric = match args.sort {
        Some(metric) if kind.supports(metric) => metric,
        Some(metric) => bail!("{} captures do not record {}", kind, metric),
        None => kind.primary_metric(),
    };

    // Step 3: Pick rows
    let rows = ranked_rows(&diff, metric, &ClassFilter::new(&args.filters), args.top);

    let summary = diff.summary();
    info!(
        "Diff: {} grown, {} shrunk, {} new, {} vanished",
        summary.grown, summary.shrunk, summary.new_classes, summary.vanished_classes
    );

    // Step 4: Write output if requested
    if let Some(path) = &args.output {
        let report = diff_report(&diff, &rows, metric, &older, &newer);
        write_json(&report, path).context("Failed to write diff report JSON")?;
        println!("📊 Diff report written to {}", path.display().to_string().cyan());
    }

    // Step 5: Terminal summary
    println!("{}", render_diff(&diff, &rows, metric));

    Ok(())
}

/// Rows passing `filter`, largest absolute change of `metric` first, at
/// most `top`. Equal changes keep diff order.
pub fn ranked_rows(diff: &DiffTable, metric: Metric, filter: &ClassFilter, top: usize) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..diff.row_count())
        .filter(|&row| filter.passes(diff.class_name(row)))
        .collect();

    rows.sort_by(|&a, &b| {
        let magnitude = |row| diff.metric(metric, row).map(|v| v.abs().as_f64()).unwrap_or(0.0);
        magnitude(b).total_cmp(&magnitude(a))
    });
    rows.truncate(top);
    rows
}
