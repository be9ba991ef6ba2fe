//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod diff;
pub mod models;
pub mod replay;
pub mod show;
pub mod tree;
pub mod utils;

// Re-export main command functions
pub use diff::{execute_diff, ranked_rows, validate_diff_args};
pub use models::{DiffArgs, ReplayArgs, ShowArgs, TreeArgs};
pub use replay::{execute_replay, validate_replay_args};
pub use show::{execute_show, validate_show_args};
pub use tree::{execute_tree, validate_tree_args};
pub use utils::{display_schema, display_version, validate_capture_file, validate_capture_path};
