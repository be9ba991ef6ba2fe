use crate::cct::SortKey;
use crate::config::ViewConfig;
use crate::snapshot::Metric;
use std::path::PathBuf;

/// Arguments for the show command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ShowArgs {
    /// Capture file to display
    pub capture: PathBuf,

    /// Sort metric; the capture's primary metric when `None`
    pub sort: Option<Metric>,

    /// Sort smallest first
    pub ascending: bool,

    /// Rows to print
    pub top: usize,

    /// Class filter patterns
    pub filters: Vec<String>,

    /// Classes to mark as selected
    pub select: Vec<String>,

    /// Output path for a JSON table report (optional)
    pub output: Option<PathBuf>,
}

impl ShowArgs {
    /// Arguments for `capture` with view defaults from `config`
    pub fn from_config(capture: PathBuf, config: &ViewConfig) -> Self {
        Self {
            capture,
            sort: config.sort,
            ascending: config.ascending,
            top: config.top,
            filters: config.filters.clone(),
            select: Vec::new(),
            output: None,
        }
    }
}

/// Arguments for the diff command
#[derive(Debug, Clone)]
pub struct DiffArgs {
    /// Baseline capture
    pub older: PathBuf,

    /// Capture compared against the baseline
    pub newer: PathBuf,

    /// Metric rows are ranked by (largest change first)
    pub sort: Option<Metric>,

    /// Rows to print
    pub top: usize,

    /// Class filter patterns
    pub filters: Vec<String>,

    /// Output path for a JSON diff report (optional)
    pub output: Option<PathBuf>,
}

impl DiffArgs {
    pub fn from_config(older: PathBuf, newer: PathBuf, config: &ViewConfig) -> Self {
        Self {
            older,
            newer,
            sort: config.sort,
            top: config.top,
            filters: config.filters.clone(),
            output: None,
        }
    }
}

/// Arguments for the tree command
#[derive(Debug, Clone)]
pub struct TreeArgs {
    /// Capture holding the allocation records
    pub capture: PathBuf,

    /// Class whose allocations are shown
    pub class_name: String,

    /// Walk from the allocation site up to the callers
    pub reverse: bool,

    /// Levels expanded below the root
    pub depth: usize,

    /// Sort key for children
    pub sort: SortKey,

    /// Sort smallest first
    pub ascending: bool,

    /// Omit call paths whose objects are all dead
    pub hide_dead_paths: bool,

    /// Output path for a JSON tree report (optional)
    pub output: Option<PathBuf>,
}

impl TreeArgs {
    pub fn from_config(capture: PathBuf, class_name: String, config: &ViewConfig) -> Self {
        Self {
            capture,
            class_name,
            reverse: false,
            depth: 3,
            sort: config.tree_sort,
            ascending: false,
            hide_dead_paths: config.hide_dead_paths,
            output: None,
        }
    }
}

/// Arguments for the replay command
#[derive(Debug, Clone)]
pub struct ReplayArgs {
    /// Captures in capture order
    pub captures: Vec<PathBuf>,

    /// Compare every capture with the first one instead of its predecessor
    pub against_first: bool,

    /// Class filter patterns applied to the per-step summaries
    pub filters: Vec<String>,
}
