//! Memsnap
//!
//! Results processing for an allocation profiler: per-class snapshot
//! tables, diffs between snapshots, and lazily built calling-context trees
//! over the captured allocation stacks.
//!
//! This crate provides the core implementation for the `memsnap` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! memsnap show capture.json --top 20
//! memsnap diff before.json after.json
//! memsnap tree capture.json --class java.util.HashMap --reverse
//! ```

pub mod cct;
pub mod commands;
pub mod config;
pub mod diff;
pub mod output;
pub mod parser;
pub mod records;
pub mod selection;
pub mod session;
pub mod snapshot;
pub mod utils;
