//! Capture file schema definitions.
//!
//! A capture file is what the capture feed delivers for one snapshot: the
//! per-class columns, the method table and the raw allocation records.
//! The schema is versioned to allow future evolution.

use crate::records::{FrameId, MethodInfo, StackOrder};
use crate::snapshot::{Metric, MetricColumn, SnapshotKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level structure of a capture file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureFile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Profiling mode of the capture
    pub kind: SnapshotKind,

    /// When the target process was sampled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<DateTime<Utc>>,

    /// Epoch counter at capture time; object ages are measured against it
    #[serde(default)]
    pub current_epoch: u32,

    /// Frame order of every record's stack
    #[serde(default)]
    pub stack_order: StackOrder,

    /// Tracked classes, one per table row
    pub class_names: Vec<String>,

    /// Per-class columns. When absent the table is summarized from records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<BTreeMap<Metric, MetricColumn>>,

    /// Methods referenced by record frames, indexed by frame id
    #[serde(default)]
    pub methods: Vec<MethodInfo>,

    /// Raw allocation records
    #[serde(default)]
    pub records: Vec<CapturedRecord>,
}

/// One allocation record as delivered by the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRecord {
    /// Index into `class_names`
    pub class: usize,

    /// Stack frames in the file's `stack_order`
    #[serde(default)]
    pub frames: Vec<FrameId>,

    /// Object size in bytes
    pub size: u64,

    /// Allocation epoch (liveness captures)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u32>,

    /// Whether the object is still alive
    #[serde(default = "default_alive")]
    pub alive: bool,
}

fn default_alive() -> bool {
    true
}
