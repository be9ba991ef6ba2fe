//! Capture file reader.
//!
//! Turns a capture file into a [`Snapshot`], validating every reference
//! inside it, and turns snapshots back into capture files.

use super::schema::{CaptureFile, CapturedRecord};
use crate::records::{AllocationRecord, AllocationRecordStore, MethodTable, StackOrder};
use crate::session::Snapshot;
use crate::snapshot::{ClassMetricsTable, TableKind};
use crate::utils::config::CAPTURE_SCHEMA_VERSION;
use crate::utils::error::{ParseError, SnapshotError};
use chrono::Utc;
use log::{debug, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read a snapshot from a capture file
///
/// **Public** - main entry point for file input
///
/// # Arguments
/// * `input_path` - Path to the capture JSON file
///
/// # Errors
/// * `ParseError::IoError` - File cannot be opened
/// * `ParseError::JsonError` - Invalid JSON structure
/// * `ParseError::UnsupportedVersion` - Incompatible schema version
/// * `ParseError::InvalidFormat` - Dangling class or frame references
/// * `ParseError::Snapshot` - Columns inconsistent with the capture kind
pub fn read_capture(input_path: impl AsRef<Path>) -> Result<Snapshot, ParseError> {
    let input_path = input_path.as_ref();

    debug!("Reading capture from: {}", input_path.display());

    let file = File::open(input_path)?;
    let capture: CaptureFile = serde_json::from_reader(BufReader::new(file))?;

    into_snapshot(capture)
}

/// Parse a snapshot from capture JSON text
pub fn parse_capture(json: &str) -> Result<Snapshot, ParseError> {
    let capture: CaptureFile = serde_json::from_str(json)?;
    into_snapshot(capture)
}

/// Validate a capture and build its snapshot
///
/// # Algorithm
/// 1. Check the schema version
/// 2. Resolve every record's class and frames
/// 3. Normalize stacks to outermost frame first
/// 4. Build the table from the columns, or summarize it from the records
pub fn into_snapshot(capture: CaptureFile) -> Result<Snapshot, ParseError> {
    check_version(&capture.version)?;

    let CaptureFile {
        kind,
        captured_at,
        current_epoch,
        stack_order,
        class_names,
        columns,
        methods,
        records,
        ..
    } = capture;

    if !kind.has_stacks() && !records.is_empty() {
        return Err(SnapshotError::NoStacks(TableKind::Snapshot(kind)).into());
    }

    let captured_at = captured_at.unwrap_or_else(|| {
        warn!("Capture has no timestamp, using the current time");
        Utc::now()
    });

    let methods = MethodTable::new(methods);
    let mut store = AllocationRecordStore::new(kind, class_names.clone(), methods, current_epoch);

    for (index, record) in records.into_iter().enumerate() {
        let (class, record) = convert_record(index, record, stack_order, &store)?;
        store.push(class, record);
    }

    let table = match columns {
        Some(columns) => ClassMetricsTable::new(kind, class_names, columns)?,
        None => {
            debug!("Capture has no columns, summarizing {} records", store.total_records());
            store.summarize()?
        }
    };

    debug!(
        "Loaded {} capture: {} classes, {} methods, {} records",
        kind,
        table.row_count(),
        store.methods().len(),
        store.total_records()
    );

    Ok(Snapshot::new(table, store, captured_at)?)
}

/// Convert a snapshot into its capture file form, columns included
pub fn to_capture(snapshot: &Snapshot) -> CaptureFile {
    let table = snapshot.table();
    let store = snapshot.records();

    let columns = snapshot
        .kind()
        .metrics()
        .iter()
        .filter_map(|&metric| {
            let values = table.values(metric)?;
            Some((metric, crate::snapshot::MetricColumn::from_values(metric, values)))
        })
        .collect();

    let records = (0..store.class_count())
        .flat_map(|class| {
            store.records(class).iter().map(move |record| CapturedRecord {
                class,
                frames: record.frames.clone(),
                size: record.size,
                epoch: record.epoch,
                alive: record.alive,
            })
        })
        .collect();

    CaptureFile {
        version: CAPTURE_SCHEMA_VERSION.to_string(),
        kind: snapshot.kind(),
        captured_at: Some(snapshot.captured_at()),
        current_epoch: store.current_epoch(),
        stack_order: StackOrder::OutermostFirst,
        class_names: store.class_names().to_vec(),
        columns: Some(columns),
        methods: store.methods().iter().cloned().collect(),
        records,
    }
}

/// Accept captures with the same major version
///
/// **Private** - internal validation
fn check_version(version: &str) -> Result<(), ParseError> {
    let major = |v: &str| v.split('.').next().map(str::to_string);
    if major(version).is_some() && major(version) == major(CAPTURE_SCHEMA_VERSION) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedVersion(version.to_string()))
    }
}

/// Resolve one record against the store
///
/// **Private** - internal conversion
fn convert_record(
    index: usize,
    record: CapturedRecord,
    order: StackOrder,
    store: &AllocationRecordStore,
) -> Result<(usize, AllocationRecord), ParseError> {
    if record.class >= store.class_count() {
        return Err(ParseError::InvalidFormat(format!(
            "record {} refers to class {} but only {} classes exist",
            index,
            record.class,
            store.class_count()
        )));
    }

    if let Some(frame) = record.frames.iter().find(|f| !store.methods().contains(**f)) {
        return Err(ParseError::InvalidFormat(format!(
            "record {} refers to unknown frame {}",
            index, frame
        )));
    }

    let mut converted = AllocationRecord::new(order.normalize(record.frames), record.size);
    if let Some(epoch) = record.epoch {
        converted = converted.with_epoch(epoch, record.alive);
    } else {
        converted.alive = record.alive;
    }

    Ok((record.class, converted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::FrameId;
    use crate::snapshot::{Metric, MetricValue, SnapshotKind};

    const ALLOCATION_CAPTURE: &str = r#"{
        "version": "1.0.0",
        "kind": "allocation",
        "captured_at": "2024-01-01T00:00:00Z",
        "stack_order": "innermost_first",
        "class_names": ["Foo", "Bar"],
        "methods": [
            {"class_name": "App", "method_name": "main"},
            {"class_name": "App", "method_name": "make"}
        ],
        "records": [
            {"class": 0, "frames": [1, 0], "size": 24},
            {"class": 0, "frames": [0], "size": 16}
        ]
    }"#;

    #[test]
    fn test_summarizes_when_columns_absent() {
        let snapshot = parse_capture(ALLOCATION_CAPTURE).unwrap();

        assert_eq!(snapshot.kind(), SnapshotKind::Allocation);
        assert_eq!(snapshot.table().metric(Metric::AllocatedBytes, 0), Some(MetricValue::Count(40)));
        assert_eq!(snapshot.table().metric(Metric::AllocatedObjects, 1), Some(MetricValue::Count(0)));
    }

    #[test]
    fn test_stacks_normalized_to_outermost_first() {
        let snapshot = parse_capture(ALLOCATION_CAPTURE).unwrap();
        assert_eq!(snapshot.records().records(0)[0].frames, vec![FrameId(0), FrameId(1)]);
    }

    #[test]
    fn test_unsupported_version() {
        let json = ALLOCATION_CAPTURE.replace("\"1.0.0\"", "\"2.0.0\"");
        assert!(matches!(parse_capture(&json), Err(ParseError::UnsupportedVersion(_))));
    }

    #[test]
    fn test_dangling_references_rejected() {
        let json = ALLOCATION_CAPTURE.replace("\"frames\": [0]", "\"frames\": [7]");
        assert!(matches!(parse_capture(&json), Err(ParseError::InvalidFormat(_))));

        let json = ALLOCATION_CAPTURE.replace("\"class\": 0, \"frames\": [0]", "\"class\": 5, \"frames\": [0]");
        assert!(matches!(parse_capture(&json), Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_sampled_capture_with_records_rejected() {
        let json = ALLOCATION_CAPTURE.replace("\"allocation\"", "\"sampled\"");
        assert!(matches!(
            parse_capture(&json),
            Err(ParseError::Snapshot(SnapshotError::NoStacks(_)))
        ));
    }

    #[test]
    fn test_columns_clamped() {
        let json = r#"{
            "version": "1.0.0",
            "kind": "sampled",
            "class_names": ["A", "B", "C", "D", "E"],
            "columns": {
                "live_bytes": [10, 20, 30],
                "live_objects": [1, 2, 3, 4, 5]
            }
        }"#;
        let snapshot = parse_capture(json).unwrap();
        assert_eq!(snapshot.table().row_count(), 3);
    }
}
