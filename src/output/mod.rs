//! Output writers for tables, diffs and call trees.
//!
//! This module handles:
//! - JSON reports and capture files
//! - Colored terminal rendering

pub mod json;
pub mod report;
pub mod terminal;

// Re-export main functions
pub use json::{to_json_string, write_capture, write_json};
pub use report::{diff_report, table_report, tree_report, ClassRow, DiffReport, TableReport, TreeNodeReport, TreeReport};
pub use terminal::{render_diff, render_table, render_tree};
