//! Call tree nodes.
//!
//! Nodes live in the arena of their [`CallTree`](super::CallTree) and refer
//! to each other by [`NodeId`]. Each node keeps the indices of the records
//! whose stacks pass through it so its children can be grouped on demand.

use crate::records::{AllocationTotals, FrameId};
use crate::snapshot::{Metric, MetricValue};
use serde::Serialize;

/// Index of a node in its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeFrame {
    /// The allocated class the tree was built for
    Root { class_name: String },
    /// A captured stack frame
    Method(FrameId),
    /// Allocations recorded without any stack frame
    Unknown,
}

/// Aggregates of all records passing through a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NodeMetrics {
    pub allocated_objects: u64,
    pub allocated_bytes: u64,
    pub live_objects: u64,
    pub live_bytes: u64,
    /// Mean age of the live objects, weighted by object count
    pub average_age: f64,
    /// Distinct ages among the live objects
    pub surviving_generations: u64,
}

impl NodeMetrics {
    pub fn value(&self, metric: Metric) -> MetricValue {
        let count = |v: u64| MetricValue::Count(i64::try_from(v).unwrap_or(i64::MAX));
        match metric {
            Metric::AllocatedObjects | Metric::TrackedAllocations | Metric::TotalAllocations => {
                count(self.allocated_objects)
            }
            Metric::AllocatedBytes => count(self.allocated_bytes),
            Metric::LiveObjects => count(self.live_objects),
            Metric::LiveBytes => count(self.live_bytes),
            Metric::AverageAge => MetricValue::Average(self.average_age),
            Metric::SurvivingGenerations => count(self.surviving_generations),
        }
    }
}

impl From<&AllocationTotals> for NodeMetrics {
    fn from(totals: &AllocationTotals) -> Self {
        Self {
            allocated_objects: totals.allocated_objects,
            allocated_bytes: totals.allocated_bytes,
            live_objects: totals.live_objects,
            live_bytes: totals.live_bytes,
            average_age: totals.average_age(),
            surviving_generations: totals.surviving_generations(),
        }
    }
}

/// Lazy expansion state of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionState {
    /// Children never requested
    Unexpanded,
    /// Grouping in progress
    Expanding,
    /// Children materialized; never recomputed
    Expanded(Vec<NodeId>),
    /// Last expansion was cancelled; the next request retries
    Cancelled,
}

/// One call-chain prefix aggregated over its records
#[derive(Debug, Clone)]
pub struct CctNode {
    pub(crate) frame: NodeFrame,
    pub(crate) parent: Option<NodeId>,
    pub(crate) depth: usize,
    pub(crate) records: Vec<usize>,
    pub(crate) metrics: NodeMetrics,
    pub(crate) leaf: bool,
    pub(crate) state: ExpansionState,
}

impl CctNode {
    pub fn frame(&self) -> &NodeFrame {
        &self.frame
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Distance from the root; the root is at depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Totals fixed at creation; expanding the node does not change them
    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    /// Number of records passing through this node
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn state(&self) -> &ExpansionState {
        &self.state
    }

    pub fn is_expanded(&self) -> bool {
        matches!(self.state, ExpansionState::Expanded(_))
    }

    /// Materialized children, empty until expanded
    pub fn child_ids(&self) -> &[NodeId] {
        match &self.state {
            ExpansionState::Expanded(children) => children,
            _ => &[],
        }
    }
}
