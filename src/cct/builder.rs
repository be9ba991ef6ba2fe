//! Lazy calling-context tree construction.
//!
//! A tree covers the allocation records of one class. Building it only
//! creates the root; every other level is grouped on demand the first time
//! its parent's children are requested, then cached.
//!
//! Forward trees follow stacks from the outermost frame down to the
//! allocation site. Reverse trees start at the allocation site and walk up
//! the callers, answering "who allocated these objects".

use super::cancel::CancellationToken;
use super::node::{CctNode, ExpansionState, NodeFrame, NodeId, NodeMetrics};
use super::sort::{SortKey, SortSpec};
use crate::records::{AllocationRecordStore, AllocationTotals};
use crate::snapshot::{Metric, Ratio, SnapshotKind};
use crate::utils::config::{CANCEL_CHECK_INTERVAL, UNKNOWN_FRAME_LABEL};
use log::debug;
use std::collections::HashMap;

/// Options applied while children are materialized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTreeOptions {
    /// In liveness mode, skip children whose objects are all dead
    pub hide_dead_paths: bool,
}

/// Result of an expansion request
#[derive(Debug, PartialEq, Eq)]
pub enum Expansion<'t> {
    Expanded(&'t [NodeId]),
    /// Cancelled before finishing; nothing was cached
    Cancelled,
}

/// Build the call tree of the class at `class_index`
///
/// # Arguments
/// * `store` - Records of the snapshot
/// * `class_index` - Row of the class in the snapshot's table
/// * `reverse` - Start at the allocation site and walk callers
///
/// # Returns
/// A tree holding only its root. A class without records gives a tree for
/// which [`CallTree::is_empty`] is true.
///
/// # Panics
/// If `class_index >= store.class_count()`.
///
/// # Example
/// ```ignore
/// let mut tree = build_call_tree(snapshot.records(), row, true);
/// for &child in tree.children(tree.root()).to_vec().iter() {
///     println!("{}", tree.node_name(child));
/// }
/// ```
pub fn build_call_tree(store: &AllocationRecordStore, class_index: usize, reverse: bool) -> CallTree<'_> {
    build_call_tree_with(store, class_index, reverse, CallTreeOptions::default())
}

/// [`build_call_tree`] with explicit options
pub fn build_call_tree_with(
    store: &AllocationRecordStore,
    class_index: usize,
    reverse: bool,
    options: CallTreeOptions,
) -> CallTree<'_> {
    let record_count = store.records(class_index).len();
    let mut tree = CallTree {
        store,
        class_index,
        reverse,
        options,
        nodes: Vec::new(),
        sort: None,
    };

    let root_frame = NodeFrame::Root {
        class_name: store.class_name(class_index).to_string(),
    };
    let root = tree.make_node(root_frame, None, 0, (0..record_count).collect());
    tree.nodes.push(root);

    debug!(
        "Built {} call tree root for {} over {} records",
        if reverse { "reverse" } else { "forward" },
        store.class_name(class_index),
        record_count
    );

    tree
}

/// Arena-backed aggregate call tree of one class
///
/// Expansion takes `&mut self`: a tree has a single consumer. The store is
/// borrowed, so trees never outlive their snapshot.
#[derive(Debug, Clone)]
pub struct CallTree<'s> {
    store: &'s AllocationRecordStore,
    class_index: usize,
    reverse: bool,
    options: CallTreeOptions,
    nodes: Vec<CctNode>,
    sort: Option<SortSpec>,
}

impl<'s> CallTree<'s> {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// # Panics
    /// If `id` does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &CctNode {
        &self.nodes[id.0]
    }

    /// Number of materialized nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the class has no allocation records
    pub fn is_empty(&self) -> bool {
        self.nodes[0].records.is_empty()
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn store(&self) -> &'s AllocationRecordStore {
        self.store
    }

    /// The sort last requested through [`sort_children`](Self::sort_children)
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort
    }

    pub fn metrics(&self, id: NodeId) -> &NodeMetrics {
        &self.node(id).metrics
    }

    /// Whether `id` has no children, answered without expanding it. Paths
    /// hidden by [`CallTreeOptions::hide_dead_paths`] do not count.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).leaf
    }

    /// Children of `id`, grouped on the first call and cached afterwards
    pub fn children(&mut self, id: NodeId) -> &[NodeId] {
        let token = CancellationToken::new();
        match self.expand_with(id, &token) {
            Expansion::Expanded(children) => children,
            Expansion::Cancelled => &[],
        }
    }

    /// Expand `id`, giving up when `token` is cancelled.
    ///
    /// A cancelled expansion leaves the node in
    /// [`ExpansionState::Cancelled`] and the next request starts over.
    pub fn expand_with(&mut self, id: NodeId, token: &CancellationToken) -> Expansion<'_> {
        if self.node(id).is_expanded() {
            return Expansion::Expanded(self.nodes[id.0].child_ids());
        }

        self.nodes[id.0].state = ExpansionState::Expanding;

        let groups = match self.group_children(id, token) {
            Some(groups) => groups,
            None => {
                debug!("Expansion of node {} cancelled", id.0);
                self.nodes[id.0].state = ExpansionState::Cancelled;
                return Expansion::Cancelled;
            }
        };

        let depth = self.nodes[id.0].depth + 1;
        let hide_dead = self.hides_dead_paths();
        let mut children = Vec::with_capacity(groups.len());

        for (frame, records) in groups {
            let child = self.make_node(frame, Some(id), depth, records);
            if hide_dead && child.metrics.live_objects == 0 {
                continue;
            }
            self.nodes.push(child);
            children.push(NodeId(self.nodes.len() - 1));
        }

        if let Some(spec) = self.sort {
            self.order(&mut children, spec);
        }

        self.nodes[id.0].state = ExpansionState::Expanded(children);
        Expansion::Expanded(self.nodes[id.0].child_ids())
    }

    /// Expand `depth` levels below `id`, checking `token` between levels.
    ///
    /// # Returns
    /// `false` if cancellation stopped the walk. Levels finished before
    /// that stay expanded.
    pub fn expand_to_depth(&mut self, id: NodeId, depth: usize, token: &CancellationToken) -> bool {
        let mut level = vec![id];

        for _ in 0..depth {
            if token.is_cancelled() {
                return false;
            }

            let mut next = Vec::new();
            for node in level {
                match self.expand_with(node, token) {
                    Expansion::Expanded(children) => next.extend_from_slice(children),
                    Expansion::Cancelled => return false,
                }
            }

            if next.is_empty() {
                break;
            }
            level = next;
        }

        true
    }

    /// Sort the materialized children below `id` by `key`, stably.
    ///
    /// The sort is remembered for the whole tree and applied to children
    /// materialized afterwards, so the tree stays ordered as it grows.
    pub fn sort_children(&mut self, id: NodeId, key: SortKey, ascending: bool) {
        let spec = SortSpec::new(key, ascending);
        self.sort = Some(spec);

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            let mut children = match &self.nodes[current.0].state {
                ExpansionState::Expanded(children) => children.clone(),
                _ => continue,
            };
            self.order(&mut children, spec);
            pending.extend(children.iter().copied());
            self.nodes[current.0].state = ExpansionState::Expanded(children);
        }
    }

    /// Share of `id` in the root's total of `metric`
    pub fn ratio(&self, id: NodeId, metric: Metric) -> Ratio {
        let part = self.metrics(id).value(metric).as_f64();
        let whole = self.metrics(self.root()).value(metric).as_f64();
        Ratio::of(part, whole)
    }

    /// Display name of the node's frame
    pub fn node_name(&self, id: NodeId) -> String {
        match &self.node(id).frame {
            NodeFrame::Root { class_name } => class_name.clone(),
            NodeFrame::Method(frame) => self.store.methods().display_name(*frame),
            NodeFrame::Unknown => UNKNOWN_FRAME_LABEL.to_string(),
        }
    }

    /// Names from the root down to `id`
    pub fn path_to(&self, id: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            path.push(self.node_name(node));
            current = self.node(node).parent;
        }
        path.reverse();
        path
    }

    fn hides_dead_paths(&self) -> bool {
        self.options.hide_dead_paths && self.store.kind() == SnapshotKind::Liveness
    }

    fn make_node(&self, frame: NodeFrame, parent: Option<NodeId>, depth: usize, records: Vec<usize>) -> CctNode {
        let all = self.store.records(self.class_index);
        let totals = AllocationTotals::from_records(records.iter().map(|&r| &all[r]), self.store.current_epoch());

        // A child is shown when one of its records continues past this node;
        // the root groups frameless records under an unknown child.
        let hide_dead = self.hides_dead_paths();
        let continues = |r: usize| (parent.is_none() || all[r].frames.len() > depth) && (!hide_dead || all[r].alive);
        let leaf = !records.iter().any(|&r| continues(r));

        CctNode {
            frame,
            parent,
            depth,
            records,
            metrics: NodeMetrics::from(&totals),
            leaf,
            state: ExpansionState::Unexpanded,
        }
    }

    /// Group the records of `id` by their frame one level down, in order of
    /// first appearance. `None` when cancelled.
    fn group_children(&self, id: NodeId, token: &CancellationToken) -> Option<Vec<(NodeFrame, Vec<usize>)>> {
        let node = &self.nodes[id.0];
        let all = self.store.records(self.class_index);
        let is_root = node.parent.is_none();

        let mut groups: Vec<(NodeFrame, Vec<usize>)> = Vec::new();
        let mut slots: HashMap<NodeFrame, usize> = HashMap::new();

        for (n, &r) in node.records.iter().enumerate() {
            if n % CANCEL_CHECK_INTERVAL == 0 && token.is_cancelled() {
                return None;
            }

            let frame = match all[r].frame_at(node.depth, self.reverse) {
                Some(frame) => NodeFrame::Method(frame),
                None if is_root => NodeFrame::Unknown,
                // record ends at this node
                None => continue,
            };

            let slot = *slots.entry(frame.clone()).or_insert_with(|| {
                groups.push((frame, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(r);
        }

        Some(groups)
    }

    fn order(&self, ids: &mut Vec<NodeId>, spec: SortSpec) {
        match spec.key {
            SortKey::Name => {
                let mut keyed: Vec<(String, NodeId)> = ids.iter().map(|&id| (self.node_name(id), id)).collect();
                keyed.sort_by(|a, b| spec.direct(a.0.cmp(&b.0)));
                *ids = keyed.into_iter().map(|(_, id)| id).collect();
            }
            key => ids.sort_by(|&a, &b| spec.direct(key.compare(&self.nodes[a.0].metrics, &self.nodes[b.0].metrics))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AllocationRecord, FrameId, MethodInfo, MethodTable};

    /// main -> a -> alloc (16B), main -> b -> alloc (32B), main -> a (8B)
    fn store() -> (AllocationRecordStore, [FrameId; 4]) {
        let mut methods = MethodTable::default();
        let main = methods.push(MethodInfo::new("App", "main", ""));
        let a = methods.push(MethodInfo::new("App", "a", ""));
        let b = methods.push(MethodInfo::new("App", "b", ""));
        let alloc = methods.push(MethodInfo::new("App", "alloc", ""));

        let mut store = AllocationRecordStore::new(
            SnapshotKind::Allocation,
            vec!["Foo".to_string(), "Empty".to_string()],
            methods,
            0,
        );
        store.push(0, AllocationRecord::new(vec![main, a, alloc], 16));
        store.push(0, AllocationRecord::new(vec![main, b, alloc], 32));
        store.push(0, AllocationRecord::new(vec![main, a], 8));
        (store, [main, a, b, alloc])
    }

    #[test]
    fn test_root_only_until_expanded() {
        let (store, _) = store();
        let tree = build_call_tree(&store, 0, false);

        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.metrics(tree.root()).allocated_bytes, 56);
        assert_eq!(tree.node(tree.root()).state(), &ExpansionState::Unexpanded);
    }

    #[test]
    fn test_forward_grouping_and_self_records() {
        let (store, [main, a, _, _]) = store();
        let mut tree = build_call_tree(&store, 0, false);
        let root = tree.root();

        let level1 = tree.children(root).to_vec();
        assert_eq!(level1.len(), 1);
        assert_eq!(tree.node(level1[0]).frame(), &NodeFrame::Method(main));

        let level2 = tree.children(level1[0]).to_vec();
        assert_eq!(level2.len(), 2);
        assert_eq!(tree.node(level2[0]).frame(), &NodeFrame::Method(a));

        // a: 16B continue to alloc, 8B end at a
        let a_node = level2[0];
        assert_eq!(tree.metrics(a_node).allocated_bytes, 24);
        assert!(!tree.is_leaf(a_node));
        let below_a = tree.children(a_node).to_vec();
        assert_eq!(below_a.len(), 1);
        assert_eq!(tree.metrics(below_a[0]).allocated_bytes, 16);
        assert!(tree.is_leaf(below_a[0]));
    }

    #[test]
    fn test_reverse_starts_at_allocation_site() {
        let (store, [_, a, _, alloc]) = store();
        let mut tree = build_call_tree(&store, 0, true);
        let root = tree.root();

        let level1 = tree.children(root).to_vec();
        let frames: Vec<&NodeFrame> = level1.iter().map(|&id| tree.node(id).frame()).collect();
        assert_eq!(frames, vec![&NodeFrame::Method(alloc), &NodeFrame::Method(a)]);
        assert_eq!(tree.node(level1[0]).depth(), 1);
        assert_eq!(tree.metrics(level1[0]).allocated_bytes, 48);
    }

    #[test]
    fn test_empty_class() {
        let (store, _) = store();
        let mut tree = build_call_tree(&store, 1, false);
        let root = tree.root();

        assert!(tree.is_empty());
        assert!(tree.is_leaf(root));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.ratio(root, Metric::AllocatedBytes), Ratio::NotApplicable);
    }

    #[test]
    fn test_frameless_records_become_unknown_child() {
        let mut store = AllocationRecordStore::new(
            SnapshotKind::Allocation,
            vec!["Foo".to_string()],
            MethodTable::default(),
            0,
        );
        store.push(0, AllocationRecord::new(Vec::new(), 40));
        let mut tree = build_call_tree(&store, 0, false);
        let root = tree.root();

        let children = tree.children(root).to_vec();
        assert_eq!(children.len(), 1);
        assert_eq!(tree.node_name(children[0]), UNKNOWN_FRAME_LABEL);
        assert!(tree.is_leaf(children[0]));
        assert_eq!(tree.path_to(children[0]), vec!["Foo".to_string(), UNKNOWN_FRAME_LABEL.to_string()]);
    }

    #[test]
    fn test_cancelled_expansion_retries() {
        let (store, _) = store();
        let mut tree = build_call_tree(&store, 0, false);
        let root = tree.root();

        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(tree.expand_with(root, &token), Expansion::Cancelled);
        assert_eq!(tree.node(root).state(), &ExpansionState::Cancelled);
        assert_eq!(tree.len(), 1);

        assert_eq!(tree.children(root).len(), 1);
        assert!(tree.node(root).is_expanded());
    }
}
