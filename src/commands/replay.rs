//! Replay command implementation.
//!
//! Feeds a series of captures through a profiling session the way a live
//! view receives them, comparing each one with a reference capture.

use super::models::ReplayArgs;
use super::utils::validate_capture_path;
use crate::diff::DiffSummary;
use crate::parser::{CaptureFeed, FileFeed};
use crate::session::ProfilingSession;
use crate::snapshot::ClassFilter;
use anyhow::{bail, Context, Result};
use colored::*;
use log::info;

/// Validate replay arguments
pub fn validate_replay_args(args: &ReplayArgs) -> Result<()> {
    if args.captures.len() < 2 {
        bail!("replay needs at least two captures");
    }
    for path in &args.captures {
        validate_capture_path(path)?;
    }
    Ok(())
}

/// Execute the replay command
///
/// # Returns
/// The summary of every comparison, in capture order
pub fn execute_replay(args: ReplayArgs) -> Result<Vec<DiffSummary>> {
    let session = ProfilingSession::new();
    let mut feed = FileFeed::new(args.captures.iter().cloned());
    let filter = ClassFilter::new(&args.filters);
    let mut summaries = Vec::new();
    let mut step = 0;

    while let Some(capture) = feed.next_capture() {
        step += 1;
        let snapshot = capture.with_context(|| format!("Failed to read capture #{}", step))?;
        session.publish(snapshot);

        if step > 1 {
            summaries.push(compare(&session, step, &filter)?);
        }
        if step == 1 || !args.against_first {
            session.set_reference();
        }
    }

    session.end();
    info!("Replayed {} captures", session.published_count());
    Ok(summaries)
}

/// Compare the current capture with the reference and print one line
fn compare(session: &ProfilingSession, step: usize, filter: &ClassFilter) -> Result<DiffSummary> {
    let diff = match session.compare_with_reference() {
        Some(result) => result.with_context(|| format!("Failed to compare capture #{}", step))?,
        None => bail!("No reference capture to compare capture #{} with", step),
    };

    let summary = diff.summary();
    let changed: Vec<&str> = (0..diff.row_count())
        .filter(|&row| filter.passes(diff.class_name(row)))
        .filter(|&row| {
            let primary = diff.base_kind().primary_metric();
            diff.metric(primary, row).is_some_and(|v| !v.is_zero())
        })
        .map(|row| diff.class_name(row))
        .collect();

    println!(
        "#{:<3} {} grown, {} shrunk, {} new, {} vanished  {}",
        step,
        summary.grown.to_string().red(),
        summary.shrunk.to_string().green(),
        summary.new_classes,
        summary.vanished_classes,
        changed.join(", ").dimmed()
    );

    Ok(summary)
}
