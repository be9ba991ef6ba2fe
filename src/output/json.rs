//! JSON output writer.
//!
//! Writes reports and capture files to disk with pretty formatting.

use crate::parser::to_capture;
use crate::session::Snapshot;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write any serializable value to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `value` - Report or capture to write
/// * `output_path` - Path to output JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
///
/// # Example
/// ```ignore
/// let report = diff_report(&diff, &rows, Metric::LiveBytes, &older, &newer);
/// write_json(&report, "diff.json")?;
/// ```
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing JSON to: {}", output_path.display());

    validate_output_path(output_path)?;

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory {}: {}", parent.display(), e))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, value).map_err(OutputError::SerializationFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!("JSON written successfully ({} bytes)", calculate_file_size(output_path));

    Ok(())
}

/// Write a snapshot as a capture file that [`read_capture`](crate::parser::read_capture)
/// loads back
pub fn write_capture(snapshot: &Snapshot, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_json(&to_capture(snapshot), output_path)
}

/// Serialize a value to a pretty JSON string
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, OutputError> {
    serde_json::to_string_pretty(value).map_err(OutputError::SerializationFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Check if we're trying to overwrite a directory
    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!("Path is a directory: {}", path.display())));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::read_capture;
    use crate::records::{AllocationRecord, AllocationRecordStore, MethodInfo, MethodTable};
    use crate::snapshot::SnapshotKind;
    use chrono::{TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn create_test_snapshot() -> Snapshot {
        let mut methods = MethodTable::default();
        let main = methods.push(MethodInfo::new("App", "main", "()V"));
        let mut store = AllocationRecordStore::new(
            SnapshotKind::Liveness,
            vec!["Foo".to_string()],
            methods,
            5,
        );
        store.push(0, AllocationRecord::new(vec![main], 24).with_epoch(2, true));
        let captured_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Snapshot::from_records(store, captured_at).unwrap()
    }

    #[test]
    fn test_write_and_read_capture() {
        let snapshot = create_test_snapshot();
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path();

        write_capture(&snapshot, path).unwrap();
        let loaded = read_capture(path).unwrap();

        assert_eq!(loaded.kind(), snapshot.kind());
        assert_eq!(loaded.captured_at(), snapshot.captured_at());
        assert_eq!(loaded.table().class_names(), snapshot.table().class_names());
        assert_eq!(loaded.records().records(0), snapshot.records().records(0));
    }

    #[test]
    fn test_validate_output_path_empty() {
        let result = validate_output_path(Path::new(""));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_output_path_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = validate_output_path(temp_dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/capture.json");

        write_capture(&create_test_snapshot(), &nested_path).unwrap();

        assert!(nested_path.exists());
    }
}
