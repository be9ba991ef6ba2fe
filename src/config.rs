//! View settings loaded from TOML.
//!
//! Every field is optional in the file; missing ones take their defaults.
//!
//! ```toml
//! sort = "live_bytes"
//! ascending = false
//! tree_sort = "allocated_bytes"
//! hide_dead_paths = true
//! top = 40
//! filters = ["java.util.**", "com.example.*"]
//! ```

use crate::cct::{CallTreeOptions, SortKey};
use crate::snapshot::{ClassFilter, Metric, SnapshotKind};
use crate::utils::config::DEFAULT_TOP_ROWS;
use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How tables and trees are presented
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Table sort metric; the snapshot kind's primary metric when unset
    pub sort: Option<Metric>,

    /// Sort tables smallest first
    pub ascending: bool,

    /// Sort key for call tree children
    pub tree_sort: SortKey,

    /// Omit call paths whose objects are all dead (liveness captures)
    pub hide_dead_paths: bool,

    /// Rows printed per table
    pub top: usize,

    /// Class filter patterns; empty shows every class
    pub filters: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            sort: None,
            ascending: false,
            tree_sort: SortKey::AllocatedBytes,
            hide_dead_paths: false,
            top: DEFAULT_TOP_ROWS,
            filters: Vec::new(),
        }
    }
}

impl ViewConfig {
    /// Sort metric for a table of `kind`, falling back to its primary
    /// metric when the configured one is not captured
    pub fn sort_metric(&self, kind: SnapshotKind) -> Metric {
        match self.sort {
            Some(metric) if kind.supports(metric) => metric,
            _ => kind.primary_metric(),
        }
    }

    pub fn class_filter(&self) -> ClassFilter {
        ClassFilter::new(&self.filters)
    }

    pub fn tree_options(&self) -> CallTreeOptions {
        CallTreeOptions {
            hide_dead_paths: self.hide_dead_paths,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top == 0 {
            return Err(ConfigError::InvalidValue("top must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Load view settings from a TOML file
///
/// # Errors
/// * `ConfigError::IoError` - If file cannot be read
/// * `ConfigError::ParseFailed` - If TOML is invalid
/// * `ConfigError::InvalidValue` - If a value is out of range
///
/// # Example
/// ```ignore
/// let config = load_view_config("memsnap.toml")?;
/// ```
pub fn load_view_config(path: impl AsRef<Path>) -> Result<ViewConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading view config from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let config: ViewConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file = write_config("hide_dead_paths = true\nfilters = [\"java.util.*\"]\n");
        let config = load_view_config(file.path()).unwrap();

        assert!(config.hide_dead_paths);
        assert_eq!(config.top, DEFAULT_TOP_ROWS);
        assert_eq!(config.tree_sort, SortKey::AllocatedBytes);
        assert!(config.class_filter().passes("java.util.HashMap"));
    }

    #[test]
    fn test_sort_metric_falls_back_to_primary() {
        let config = ViewConfig {
            sort: Some(Metric::AverageAge),
            ..Default::default()
        };
        assert_eq!(config.sort_metric(SnapshotKind::Liveness), Metric::AverageAge);
        assert_eq!(config.sort_metric(SnapshotKind::Allocation), Metric::AllocatedBytes);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("top = 0\n");
        assert!(matches!(load_view_config(file.path()), Err(ConfigError::InvalidValue(_))));

        let file = write_config("tree_sort = \"size\"\n");
        assert!(matches!(load_view_config(file.path()), Err(ConfigError::ParseFailed(_))));
    }
}
