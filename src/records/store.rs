//! Raw per-object allocation records backing one snapshot.
//!
//! Records are the source data for call trees. Every record holds the
//! captured stack of one tracked allocation, normalized to outermost frame
//! first, and in liveness mode the epoch the object was allocated in plus
//! whether it is still alive.

use super::method_table::{FrameId, MethodTable};
use crate::snapshot::{ClassMetricsTable, Metric, MetricColumn, MetricValue, SnapshotKind};
use crate::utils::error::SnapshotError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Order in which the capture feed lists stack frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackOrder {
    /// `main` first, allocation site last
    #[default]
    OutermostFirst,
    /// Allocation site first, `main` last
    InnermostFirst,
}

impl StackOrder {
    /// Reorder `frames` to outermost first
    pub fn normalize(self, mut frames: Vec<FrameId>) -> Vec<FrameId> {
        if self == StackOrder::InnermostFirst {
            frames.reverse();
        }
        frames
    }
}

/// One tracked allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    /// Captured stack, outermost frame first, allocation site last
    pub frames: Vec<FrameId>,

    /// Object size in bytes
    pub size: u64,

    /// Allocation epoch (liveness mode only)
    pub epoch: Option<u32>,

    /// Whether the object was still reachable at capture time
    pub alive: bool,
}

impl AllocationRecord {
    pub fn new(frames: Vec<FrameId>, size: u64) -> Self {
        Self {
            frames,
            size,
            epoch: None,
            alive: true,
        }
    }

    pub fn with_epoch(mut self, epoch: u32, alive: bool) -> Self {
        self.epoch = Some(epoch);
        self.alive = alive;
        self
    }

    /// Age in epochs of a live object; `None` for dead objects and records
    /// without an epoch
    pub fn age(&self, current_epoch: u32) -> Option<u32> {
        if !self.alive {
            return None;
        }
        self.epoch.map(|epoch| current_epoch.saturating_sub(epoch))
    }

    /// Frame at `depth` when walking the stack from the outermost frame
    /// (`reverse == false`) or from the allocation site (`reverse == true`)
    pub fn frame_at(&self, depth: usize, reverse: bool) -> Option<FrameId> {
        if depth >= self.frames.len() {
            return None;
        }
        let index = if reverse { self.frames.len() - 1 - depth } else { depth };
        Some(self.frames[index])
    }
}

/// Running totals over a set of allocation records
///
/// Used for per-class summaries and for call tree node aggregates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationTotals {
    pub allocated_objects: u64,
    pub allocated_bytes: u64,
    pub live_objects: u64,
    pub live_bytes: u64,
    aged_objects: u64,
    age_sum: u64,
    ages: BTreeSet<u32>,
}

impl AllocationTotals {
    pub fn add(&mut self, record: &AllocationRecord, current_epoch: u32) {
        self.allocated_objects = self.allocated_objects.saturating_add(1);
        self.allocated_bytes = self.allocated_bytes.saturating_add(record.size);
        if record.alive {
            self.live_objects = self.live_objects.saturating_add(1);
            self.live_bytes = self.live_bytes.saturating_add(record.size);
        }
        if let Some(age) = record.age(current_epoch) {
            self.aged_objects = self.aged_objects.saturating_add(1);
            self.age_sum = self.age_sum.saturating_add(u64::from(age));
            self.ages.insert(age);
        }
    }

    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r AllocationRecord>, current_epoch: u32) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record, current_epoch);
        }
        totals
    }

    /// Mean age of the live objects that carry an epoch, weighted by
    /// object count
    pub fn average_age(&self) -> f64 {
        if self.aged_objects == 0 {
            0.0
        } else {
            self.age_sum as f64 / self.aged_objects as f64
        }
    }

    /// Number of distinct ages among the live objects
    pub fn surviving_generations(&self) -> u64 {
        self.ages.len() as u64
    }

    /// Value of `metric` over the records seen so far.
    ///
    /// Records only cover tracked allocations, so the tracked and total
    /// allocation counts coincide.
    pub fn value(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::AllocatedObjects | Metric::TrackedAllocations | Metric::TotalAllocations => {
                MetricValue::Count(clamp(self.allocated_objects))
            }
            Metric::AllocatedBytes => MetricValue::Count(clamp(self.allocated_bytes)),
            Metric::LiveObjects => MetricValue::Count(clamp(self.live_objects)),
            Metric::LiveBytes => MetricValue::Count(clamp(self.live_bytes)),
            Metric::AverageAge => MetricValue::Average(self.average_age()),
            Metric::SurvivingGenerations => MetricValue::Count(clamp(self.surviving_generations())),
        }
    }
}

fn clamp(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Allocation records of every tracked class of one capture
///
/// **Public** - paired 1:1 with a [`ClassMetricsTable`] inside a snapshot
#[derive(Debug, Clone)]
pub struct AllocationRecordStore {
    kind: SnapshotKind,
    class_names: Vec<String>,
    methods: MethodTable,
    records: Vec<Vec<AllocationRecord>>,
    current_epoch: u32,
}

impl AllocationRecordStore {
    /// An empty store for `class_names`, indexed like the capture's table
    pub fn new(kind: SnapshotKind, class_names: Vec<String>, methods: MethodTable, current_epoch: u32) -> Self {
        let records = vec![Vec::new(); class_names.len()];
        Self {
            kind,
            class_names,
            methods,
            records,
            current_epoch,
        }
    }

    /// Add a record for the class at `class_index`
    ///
    /// # Panics
    /// If `class_index >= self.class_count()`.
    pub fn push(&mut self, class_index: usize, record: AllocationRecord) {
        self.check_class(class_index);
        self.records[class_index].push(record);
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn current_epoch(&self) -> u32 {
        self.current_epoch
    }

    pub fn class_count(&self) -> usize {
        self.class_names.len()
    }

    /// # Panics
    /// If `class_index >= self.class_count()`.
    pub fn class_name(&self, class_index: usize) -> &str {
        self.check_class(class_index);
        &self.class_names[class_index]
    }

    /// Every tracked class, including any past the paired table's rows
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn find_class(&self, class_name: &str) -> Option<usize> {
        self.class_names.iter().position(|name| name == class_name)
    }

    /// Records of one class; empty for classes without stack data
    ///
    /// # Panics
    /// If `class_index >= self.class_count()`.
    pub fn records(&self, class_index: usize) -> &[AllocationRecord] {
        self.check_class(class_index);
        &self.records[class_index]
    }

    pub fn total_records(&self) -> usize {
        self.records.iter().map(Vec::len).sum()
    }

    /// Derive a per-class metrics table from the records
    ///
    /// # Errors
    /// * `SnapshotError::DuplicateClass` - the store's class names repeat
    pub fn summarize(&self) -> Result<ClassMetricsTable, SnapshotError> {
        let totals: Vec<AllocationTotals> = self
            .records
            .iter()
            .map(|records| AllocationTotals::from_records(records, self.current_epoch))
            .collect();

        debug!(
            "Summarizing {} records over {} classes into a {} table",
            self.total_records(),
            self.class_count(),
            self.kind
        );

        let columns = self.kind.metrics().iter().map(|&metric| {
            let values = totals.iter().map(|t| t.value(metric));
            (metric, MetricColumn::from_values(metric, values))
        });

        ClassMetricsTable::new(self.kind, self.class_names.clone(), columns)
    }

    fn check_class(&self, class_index: usize) {
        assert!(
            class_index < self.class_names.len(),
            "class index {} out of range for a store of {} classes",
            class_index,
            self.class_names.len()
        );
    }
}
