//! Utility modules for configuration constants and error handling.

pub mod error;
pub mod config;

// Re-export commonly used error types for convenience
pub use error::{ConfigError, OutputError, ParseError, SnapshotError};
