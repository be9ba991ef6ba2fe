//! Snapshot diff generation.
//!
//! This module compares two metrics tables (older vs newer) captured in the
//! same profiling mode and produces a diff table of signed per-class deltas
//! with symmetric scale bounds.
//!
//! # Example
//! ```ignore
//! use memsnap::diff::generate_diff;
//!
//! let diff = generate_diff(older.table(), newer.table())?;
//! for row in 0..diff.row_count() {
//!     println!("{} {:?}", diff.class_name(row), diff.origin(row));
//! }
//! ```

mod engine;
mod schema;

// Public API exports
pub use engine::generate_diff;
pub use schema::{DiffSummary, DiffTable, RowOrigin};

// Error type
use crate::snapshot::TableKind;
use crate::utils::error::SnapshotError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    #[error("Incompatible snapshot kinds: older={0}, newer={1}")]
    IncompatibleKinds(TableKind, TableKind),

    #[error("Cannot diff a diff table ({0})")]
    NestedDiff(TableKind),

    #[error("Failed to assemble diff table: {0}")]
    Snapshot(#[from] SnapshotError),
}

#[cfg(test)]
mod tests;
