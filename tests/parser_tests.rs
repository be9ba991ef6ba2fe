use memsnap::output::write_capture;
use memsnap::parser::{parse_capture, read_capture, CaptureFeed, FileFeed};
use memsnap::snapshot::{Metric, MetricValue, SnapshotKind};
use memsnap::utils::error::ParseError;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

const LIVENESS_CAPTURE: &str = r#"{
    "version": "1.2.0",
    "kind": "liveness",
    "captured_at": "2024-03-01T12:00:00Z",
    "current_epoch": 10,
    "class_names": ["java.util.HashMap$Node", "char[]"],
    "methods": [
        {"class_name": "java/util/HashMap", "method_name": "putVal", "signature": "(ILjava/lang/Object;)V"},
        {"class_name": "app/Main", "method_name": "main"}
    ],
    "records": [
        {"class": 0, "frames": [1, 0], "size": 32, "epoch": 4, "alive": true},
        {"class": 0, "frames": [1, 0], "size": 32, "epoch": 8, "alive": true},
        {"class": 0, "frames": [1], "size": 32, "epoch": 2, "alive": false},
        {"class": 1, "frames": [], "size": 48, "epoch": 10}
    ]
}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_liveness_capture_summarized() {
    let snapshot = parse_capture(LIVENESS_CAPTURE).unwrap();
    let table = snapshot.table();

    assert_eq!(snapshot.kind(), SnapshotKind::Liveness);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.metric(Metric::LiveObjects, 0), Some(MetricValue::Count(2)));
    assert_eq!(table.metric(Metric::LiveBytes, 0), Some(MetricValue::Count(64)));
    assert_eq!(table.metric(Metric::AverageAge, 0), Some(MetricValue::Average(4.0)));
    assert_eq!(table.metric(Metric::SurvivingGenerations, 0), Some(MetricValue::Count(2)));
    assert_eq!(table.metric(Metric::LiveObjects, 1), Some(MetricValue::Count(1)));
    assert_eq!(snapshot.records().records(1)[0].frames.len(), 0);
}

#[test]
fn test_write_then_read_capture() {
    let snapshot = parse_capture(LIVENESS_CAPTURE).unwrap();
    let dir = tempdir().unwrap();
    let path = dir.path().join("capture.json");

    write_capture(&snapshot, &path).unwrap();
    let loaded = read_capture(&path).unwrap();

    assert_eq!(loaded.captured_at(), snapshot.captured_at());
    assert_eq!(loaded.table().class_names(), snapshot.table().class_names());
    assert_eq!(
        loaded.table().metric(Metric::AverageAge, 0),
        snapshot.table().metric(Metric::AverageAge, 0)
    );
    assert_eq!(loaded.records().total_records(), 4);
    assert_eq!(loaded.records().records(0), snapshot.records().records(0));
}

#[test]
fn test_newer_major_version_rejected() {
    let json = LIVENESS_CAPTURE.replace("\"1.2.0\"", "\"2.0.0\"");
    let err = parse_capture(&json).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedVersion(_)));
}

#[test]
fn test_read_missing_file() {
    let err = read_capture("/nonexistent/capture.json").unwrap_err();
    assert!(matches!(err, ParseError::IoError(_)));
}

#[test]
fn test_file_feed_in_order() {
    let first = write_temp(LIVENESS_CAPTURE);
    let second = write_temp(&LIVENESS_CAPTURE.replace("\"current_epoch\": 10", "\"current_epoch\": 12"));

    let mut feed = FileFeed::new(vec![first.path().to_path_buf(), second.path().to_path_buf()]);
    assert_eq!(feed.remaining(), 2);

    let a = feed.next_capture().unwrap().unwrap();
    let b = feed.next_capture().unwrap().unwrap();
    assert!(feed.next_capture().is_none());

    assert_eq!(a.records().current_epoch(), 10);
    assert_eq!(b.records().current_epoch(), 12);
}

#[test]
fn test_file_feed_reports_bad_capture() {
    let bad = write_temp("{ not json");
    let mut feed = FileFeed::new(vec![bad.path().to_path_buf()]);

    assert!(matches!(feed.next_capture(), Some(Err(ParseError::JsonError(_)))));
    assert!(feed.next_capture().is_none());
}

#[test]
fn test_clamped_table_round_trips() {
    let json = r#"{
        "version": "1.0.0",
        "kind": "allocation",
        "captured_at": "2024-03-01T12:00:00Z",
        "class_names": ["A", "B", "C", "D", "E"],
        "columns": {
            "allocated_bytes": [10, 20, 30],
            "allocated_objects": [1, 1, 1, 1, 1]
        },
        "methods": [{"class_name": "app/Main", "method_name": "main"}],
        "records": [{"class": 4, "frames": [0], "size": 8}]
    }"#;
    let snapshot = parse_capture(json).unwrap();
    assert_eq!(snapshot.table().row_count(), 3);

    let dir = tempdir().unwrap();
    let path = dir.path().join("clamped.json");
    write_capture(&snapshot, &path).unwrap();
    let loaded = read_capture(&path).unwrap();

    assert_eq!(loaded.table().row_count(), 3);
    assert_eq!(loaded.records().class_count(), 5);
    assert_eq!(loaded.records().records(4), snapshot.records().records(4));
}

#[test]
fn test_huge_sizes_summarize_without_overflow() {
    let json = r#"{
        "version": "1.0.0",
        "kind": "allocation",
        "class_names": ["byte[]"],
        "records": [
            {"class": 0, "frames": [], "size": 18446744073709551615},
            {"class": 0, "frames": [], "size": 18446744073709551615}
        ]
    }"#;
    let snapshot = parse_capture(json).unwrap();

    assert_eq!(
        snapshot.table().metric(Metric::AllocatedBytes, 0),
        Some(MetricValue::Count(i64::MAX))
    );
    assert_eq!(snapshot.table().metric(Metric::AllocatedObjects, 0), Some(MetricValue::Count(2)));
}
