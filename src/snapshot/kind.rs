//! Snapshot kinds and the metrics each kind captures.
//!
//! Which columns a table has depends on the profiling mode it was captured
//! in. Instead of carrying nullable arrays around, every table is tagged with
//! a [`TableKind`] and asks it for its capability set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profiling mode a snapshot was captured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// Periodic heap histogram, no stacks
    Sampled,
    /// Instrumented allocation tracking with stacks
    Allocation,
    /// Instrumented liveness tracking with stacks and object ages
    Liveness,
}

/// One per-class metric column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AllocatedObjects,
    AllocatedBytes,
    LiveObjects,
    LiveBytes,
    TrackedAllocations,
    AverageAge,
    SurvivingGenerations,
    TotalAllocations,
}

const SAMPLED_METRICS: &[Metric] = &[Metric::LiveBytes, Metric::LiveObjects];

const ALLOCATION_METRICS: &[Metric] = &[Metric::AllocatedBytes, Metric::AllocatedObjects];

const LIVENESS_METRICS: &[Metric] = &[
    Metric::LiveBytes,
    Metric::LiveObjects,
    Metric::TrackedAllocations,
    Metric::AverageAge,
    Metric::SurvivingGenerations,
    Metric::TotalAllocations,
];

impl SnapshotKind {
    /// Metrics captured in this mode, in display order
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            SnapshotKind::Sampled => SAMPLED_METRICS,
            SnapshotKind::Allocation => ALLOCATION_METRICS,
            SnapshotKind::Liveness => LIVENESS_METRICS,
        }
    }

    pub fn supports(self, metric: Metric) -> bool {
        self.metrics().contains(&metric)
    }

    /// Whether per-object allocation stacks are recorded in this mode
    pub fn has_stacks(self) -> bool {
        !matches!(self, SnapshotKind::Sampled)
    }

    /// The metric tables in this mode are usually sorted by
    pub fn primary_metric(self) -> Metric {
        self.metrics()[0]
    }
}

impl Metric {
    /// Additive metrics can be summed across classes or call paths.
    /// Averages and generation counts cannot.
    pub fn is_additive(self) -> bool {
        !matches!(self, Metric::AverageAge | Metric::SurvivingGenerations)
    }

    /// Whether values of this metric are fractional
    pub fn is_fractional(self) -> bool {
        matches!(self, Metric::AverageAge)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::AllocatedObjects => "allocated_objects",
            Metric::AllocatedBytes => "allocated_bytes",
            Metric::LiveObjects => "live_objects",
            Metric::LiveBytes => "live_bytes",
            Metric::TrackedAllocations => "tracked_allocations",
            Metric::AverageAge => "average_age",
            Metric::SurvivingGenerations => "surviving_generations",
            Metric::TotalAllocations => "total_allocations",
        }
    }

    /// Short column header
    pub fn label(self) -> &'static str {
        match self {
            Metric::AllocatedObjects => "Allocated Objects",
            Metric::AllocatedBytes => "Allocated Bytes",
            Metric::LiveObjects => "Live Objects",
            Metric::LiveBytes => "Live Bytes",
            Metric::TrackedAllocations => "Allocated (Tracked)",
            Metric::AverageAge => "Avg. Age",
            Metric::SurvivingGenerations => "Generations",
            Metric::TotalAllocations => "Total Alloc. Obj.",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let metric = match s {
            "allocated_objects" => Metric::AllocatedObjects,
            "allocated_bytes" => Metric::AllocatedBytes,
            "live_objects" => Metric::LiveObjects,
            "live_bytes" => Metric::LiveBytes,
            "tracked_allocations" => Metric::TrackedAllocations,
            "average_age" => Metric::AverageAge,
            "surviving_generations" => Metric::SurvivingGenerations,
            "total_allocations" => Metric::TotalAllocations,
            other => return Err(format!("unknown metric: {}", other)),
        };
        Ok(metric)
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotKind::Sampled => "sampled",
            SnapshotKind::Allocation => "allocation",
            SnapshotKind::Liveness => "liveness",
        };
        f.write_str(name)
    }
}

/// Kind of a metrics table: a captured snapshot or a diff of two snapshots
/// of the same mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "mode", rename_all = "snake_case")]
pub enum TableKind {
    Snapshot(SnapshotKind),
    Diff(SnapshotKind),
}

impl TableKind {
    pub fn base(self) -> SnapshotKind {
        match self {
            TableKind::Snapshot(kind) | TableKind::Diff(kind) => kind,
        }
    }

    pub fn is_diff(self) -> bool {
        matches!(self, TableKind::Diff(_))
    }

    pub fn metrics(self) -> &'static [Metric] {
        self.base().metrics()
    }

    pub fn supports(self, metric: Metric) -> bool {
        self.base().supports(metric)
    }

    /// Diff tables never carry stacks, there is nothing to build a tree from
    pub fn has_stacks(self) -> bool {
        !self.is_diff() && self.base().has_stacks()
    }

    /// Diff values are signed, snapshot values never go below zero
    pub fn is_signed(self) -> bool {
        self.is_diff()
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Snapshot(kind) => write!(f, "{}", kind),
            TableKind::Diff(kind) => write!(f, "{} diff", kind),
        }
    }
}
