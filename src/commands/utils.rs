use crate::cct::{build_call_tree, SortKey};
use crate::parser::read_capture;
use crate::snapshot::Metric;
use crate::utils::config::CAPTURE_SCHEMA_VERSION;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Check that a capture path points at a file
pub fn validate_capture_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        bail!("Capture path cannot be empty");
    }
    if !path.is_file() {
        bail!("Capture file not found: {}", path.display());
    }
    Ok(())
}

/// Validate a capture file
pub fn validate_capture_file(file_path: PathBuf) -> Result<()> {
    println!("Validating capture: {}", file_path.display());

    let snapshot = read_capture(&file_path)
        .with_context(|| format!("Invalid capture {}", file_path.display()))?;
    let table = snapshot.table();
    let records = snapshot.records();

    let empty_trees = (0..table.row_count())
        .filter(|&row| build_call_tree(records, row, false).is_empty())
        .count();

    println!("✓ Valid capture JSON");
    println!("  Kind: {}", snapshot.kind());
    println!("  Captured: {}", snapshot.captured_at().to_rfc3339());
    println!("  Classes: {}", table.row_count());
    println!("  Methods: {}", records.methods().len());
    println!("  Records: {}", records.total_records());
    if snapshot.kind().has_stacks() {
        println!("  Classes without stacks: {}", empty_trees);
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Memsnap Capture Schema");
    println!("Current Version: {}", CAPTURE_SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  kind: string             - sampled | allocation | liveness");
        println!("  captured_at: string?     - ISO 8601 timestamp");
        println!("  current_epoch: number    - Epoch object ages are measured against");
        println!("  stack_order: string      - outermost_first | innermost_first");
        println!("  class_names: array       - Tracked classes, one per row");
        println!("  columns: object?         - Metric name -> per-class values");
        println!("  methods: array           - Frame table");
        println!("    class_name: string     - Declaring class");
        println!("    method_name: string    - Method name");
        println!("    signature: string      - VM signature");
        println!("    native: bool           - Native method");
        println!("  records: array           - Tracked allocations");
        println!("    class: number          - Index into class_names");
        println!("    frames: array          - Indices into methods");
        println!("    size: number           - Object size in bytes");
        println!("    epoch: number?         - Allocation epoch (liveness)");
        println!("    alive: bool            - Still reachable (liveness)");
        println!();
        println!("Metrics:");
        for metric in [
            Metric::AllocatedObjects,
            Metric::AllocatedBytes,
            Metric::LiveObjects,
            Metric::LiveBytes,
            Metric::TrackedAllocations,
            Metric::AverageAge,
            Metric::SurvivingGenerations,
            Metric::TotalAllocations,
        ] {
            println!("  {:<24} - {}", metric.as_str(), metric.label());
        }
        println!();
        println!("Tree sort keys:");
        for key in [
            SortKey::Name,
            SortKey::AllocatedBytes,
            SortKey::AllocatedObjects,
            SortKey::LiveBytes,
            SortKey::LiveObjects,
            SortKey::AverageAge,
            SortKey::SurvivingGenerations,
        ] {
            println!("  {}", key);
        }
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Memsnap v{}", env!("CARGO_PKG_VERSION"));
    println!("Capture Schema: v{}", CAPTURE_SCHEMA_VERSION);
    println!();
    println!("Allocation snapshot tables, diffs and call trees.");
}
