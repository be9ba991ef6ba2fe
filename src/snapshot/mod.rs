//! Per-class metric tables for captured snapshots.
//!
//! This module defines:
//! - Snapshot kinds and their capability sets
//! - The immutable, parallel-column `ClassMetricsTable`
//! - Class name filters applied by table consumers
//! - Percentages that never divide by zero

pub mod filter;
pub mod kind;
pub mod ratio;
pub mod table;

// Re-export main types
pub use filter::{ClassFilter, ClassPattern};
pub use kind::{Metric, SnapshotKind, TableKind};
pub use ratio::Ratio;
pub use table::{ClassMetricsTable, MetricColumn, MetricValue, RowOrder};
