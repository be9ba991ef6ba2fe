//! Capture parsing and schema definitions.
//!
//! This module handles:
//! - Defining the capture file schema
//! - Validating captures and building snapshots from them
//! - Feeding captures to a profiling session

pub mod capture;
pub mod feed;
pub mod schema;

// Re-export main types
pub use capture::{into_snapshot, parse_capture, read_capture, to_capture};
pub use feed::{CaptureFeed, FileFeed};
pub use schema::{CaptureFile, CapturedRecord};
