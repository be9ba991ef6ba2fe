//! Show command implementation.
//!
//! Loads one capture and prints its per-class table, filtered, sorted and
//! truncated.

use super::models::ShowArgs;
use super::utils::validate_capture_path;
use crate::output::{render_table, table_report, write_json};
use crate::parser::read_capture;
use crate::selection::{SelectionSet, Selector};
use crate::snapshot::{ClassFilter, RowOrder};
use anyhow::{bail, Context, Result};
use log::{debug, info};

/// Validate show arguments
pub fn validate_show_args(args: &ShowArgs) -> Result<()> {
    validate_capture_path(&args.capture)?;
    if args.top == 0 {
        bail!("--top must be at least 1");
    }
    Ok(())
}

/// Execute the show command
///
/// **Public** - main entry point called from main.rs
pub fn execute_show(args: ShowArgs) -> Result<()> {
    let snapshot = read_capture(&args.capture)
        .with_context(|| format!("Failed to read capture {}", args.capture.display()))?;

    let filter = ClassFilter::new(&args.filters);
    let table = snapshot.table().filtered(&filter);
    debug!(
        "{} of {} classes pass the filter",
        table.row_count(),
        snapshot.table().row_count()
    );

    let kind = snapshot.kind();
    let metric = match args.sort {
        Some(metric) if kind.supports(metric) => metric,
        Some(metric) => bail!("{} captures do not record {}", kind, metric),
        None => kind.primary_metric(),
    };

    let rows: Vec<usize> = table
        .sorted_rows(RowOrder::Metric(metric), args.ascending)
        .into_iter()
        .take(args.top)
        .collect();

    let mut selection = SelectionSet::new();
    for class_name in &args.select {
        selection.toggle(Selector::for_class(class_name.as_str()));
    }

    println!("{}", render_table(&table, &rows, metric, &selection));

    if let Some(path) = &args.output {
        let report = table_report(&table, snapshot.captured_at(), &rows, metric);
        write_json(&report, path).context("Failed to write table report JSON")?;
        info!("✓ Table report written to: {}", path.display());
    }

    Ok(())
}
