//! Calling-context trees over allocation records.
//!
//! # Example
//! ```ignore
//! use memsnap::cct::{build_call_tree, SortKey};
//!
//! let mut tree = build_call_tree(snapshot.records(), row, false);
//! let root = tree.root();
//! tree.children(root);
//! tree.sort_children(root, SortKey::AllocatedBytes, false);
//! ```

pub mod builder;
pub mod cancel;
pub mod node;
pub mod sort;

pub use builder::{build_call_tree, build_call_tree_with, CallTree, CallTreeOptions, Expansion};
pub use cancel::CancellationToken;
pub use node::{CctNode, ExpansionState, NodeFrame, NodeId, NodeMetrics};
pub use sort::{SortKey, SortSpec};
