//! Sort keys for call tree children.

use super::node::NodeMetrics;
use crate::snapshot::Metric;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Column a call tree can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    AllocatedBytes,
    AllocatedObjects,
    LiveBytes,
    LiveObjects,
    AverageAge,
    SurvivingGenerations,
}

impl SortKey {
    /// Metric compared by this key; `None` for [`SortKey::Name`]
    pub fn metric(self) -> Option<Metric> {
        match self {
            SortKey::Name => None,
            SortKey::AllocatedBytes => Some(Metric::AllocatedBytes),
            SortKey::AllocatedObjects => Some(Metric::AllocatedObjects),
            SortKey::LiveBytes => Some(Metric::LiveBytes),
            SortKey::LiveObjects => Some(Metric::LiveObjects),
            SortKey::AverageAge => Some(Metric::AverageAge),
            SortKey::SurvivingGenerations => Some(Metric::SurvivingGenerations),
        }
    }

    /// Compare two nodes by this key's metric. Names compare equal here;
    /// they are ordered by the tree, which owns the method table.
    pub fn compare(self, a: &NodeMetrics, b: &NodeMetrics) -> Ordering {
        match self.metric() {
            Some(metric) => a.value(metric).cmp_value(&b.value(metric)),
            None => Ordering::Equal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::AllocatedBytes => "allocated_bytes",
            SortKey::AllocatedObjects => "allocated_objects",
            SortKey::LiveBytes => "live_bytes",
            SortKey::LiveObjects => "live_objects",
            SortKey::AverageAge => "average_age",
            SortKey::SurvivingGenerations => "surviving_generations",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "name" => SortKey::Name,
            "allocated_bytes" | "bytes" => SortKey::AllocatedBytes,
            "allocated_objects" | "count" => SortKey::AllocatedObjects,
            "live_bytes" => SortKey::LiveBytes,
            "live_objects" => SortKey::LiveObjects,
            "average_age" | "age" => SortKey::AverageAge,
            "surviving_generations" | "generations" => SortKey::SurvivingGenerations,
            other => return Err(format!("unknown sort key: {}", other)),
        };
        Ok(key)
    }
}

/// A sort request remembered by the tree and reapplied to children
/// materialized later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub ascending: bool,
}

impl SortSpec {
    pub fn new(key: SortKey, ascending: bool) -> Self {
        Self { key, ascending }
    }

    /// Apply the direction to an ascending comparison
    pub fn direct(self, ord: Ordering) -> Ordering {
        if self.ascending {
            ord
        } else {
            ord.reverse()
        }
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortKey::AllocatedBytes, false)
    }
}
