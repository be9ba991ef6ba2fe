//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Note what is *not* here: mismatched column lengths, classes missing on one
//! side of a diff, classes without stack data and zero ratio denominators are
//! all normal conditions with a defined result, never errors.

use crate::snapshot::{Metric, TableKind};
use thiserror::Error;

/// Errors raised while assembling a metrics table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("metric {metric} is not captured by {kind} tables")]
    UnsupportedMetric { metric: Metric, kind: TableKind },

    #[error("{kind} table is missing the {metric} column")]
    MissingMetric { metric: Metric, kind: TableKind },

    #[error("{metric} column must hold whole numbers")]
    FractionalCounts { metric: Metric },

    #[error("duplicate class name in table: {0}")]
    DuplicateClass(String),

    #[error("{0} snapshots carry no allocation stacks")]
    NoStacks(TableKind),

    #[error("allocation records do not match the table: {0}")]
    StoreMismatch(String),
}

/// Errors that can occur while reading a capture file
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to read capture: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid capture format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported capture version: {0}")]
    UnsupportedVersion(String),

    #[error("Invalid snapshot data: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while loading view settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}
