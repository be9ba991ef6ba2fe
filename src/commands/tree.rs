//! Tree command implementation.
//!
//! Builds the forward or reverse call tree of one class and prints the
//! first levels of it.

use super::models::TreeArgs;
use super::utils::validate_capture_path;
use crate::cct::{build_call_tree_with, CallTreeOptions, CancellationToken};
use crate::output::{render_tree, tree_report, write_json};
use crate::parser::read_capture;
use crate::snapshot::Metric;
use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use std::time::Instant;

/// Validate tree arguments
pub fn validate_tree_args(args: &TreeArgs) -> Result<()> {
    validate_capture_path(&args.capture)?;
    if args.class_name.trim().is_empty() {
        bail!("--class must name a class");
    }
    Ok(())
}

/// Execute the tree command
pub fn execute_tree(args: TreeArgs) -> Result<()> {
    let start_time = Instant::now();

    let snapshot = read_capture(&args.capture)
        .with_context(|| format!("Failed to read capture {}", args.capture.display()))?;

    if !snapshot.kind().has_stacks() {
        bail!("{} captures carry no allocation stacks", snapshot.kind());
    }

    let class_index = snapshot
        .records()
        .find_class(&args.class_name)
        .ok_or_else(|| anyhow!("Class {} is not in the capture", args.class_name))?;

    let options = CallTreeOptions {
        hide_dead_paths: args.hide_dead_paths,
    };
    let mut tree = build_call_tree_with(snapshot.records(), class_index, args.reverse, options);
    let root = tree.root();

    // Remember the order before expanding so every level comes out sorted.
    tree.sort_children(root, args.sort, args.ascending);

    let token = CancellationToken::new();
    if !tree.expand_to_depth(root, args.depth, &token) {
        warn!("Tree expansion was cancelled; showing the levels built so far");
    }

    let metric = args.sort.metric().unwrap_or(Metric::AllocatedBytes);
    println!("{}", render_tree(&tree, metric));

    if let Some(path) = &args.output {
        write_json(&tree_report(&tree, metric), path).context("Failed to write tree report JSON")?;
        info!("✓ Tree report written to: {}", path.display());
    }

    info!(
        "Built {} nodes in {:.2}s",
        tree.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
