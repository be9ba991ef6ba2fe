//! User selections keyed by value.
//!
//! A selection names classes and methods, never row positions, so it stays
//! meaningful when the next capture reorders or resizes every table.

use crate::cct::{CallTree, NodeFrame, NodeId};
use crate::snapshot::ClassMetricsTable;
use crate::utils::config::ALL_METHODS_WILDCARD;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Method part of a selector
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodPattern {
    /// Every method of the class
    All,
    Named(String),
}

/// A (class, method, signature) triple compared structurally
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub class_name: String,
    pub method: MethodPattern,
    pub signature: Option<String>,
}

impl Selector {
    /// Select a whole class
    pub fn for_class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method: MethodPattern::All,
            signature: None,
        }
    }

    /// Select one method, optionally narrowed to one signature
    pub fn for_method(class_name: impl Into<String>, method_name: impl Into<String>, signature: Option<String>) -> Self {
        let method_name = method_name.into();
        let method = if method_name == ALL_METHODS_WILDCARD {
            MethodPattern::All
        } else {
            MethodPattern::Named(method_name)
        };
        Self {
            class_name: class_name.into(),
            method,
            signature,
        }
    }

    /// Selector for a call tree node: the class for the root, the method for
    /// a frame. Frameless nodes cannot be selected.
    pub fn for_node(tree: &CallTree<'_>, id: NodeId) -> Option<Self> {
        match tree.node(id).frame() {
            NodeFrame::Root { class_name } => Some(Self::for_class(class_name.clone())),
            NodeFrame::Method(frame) => {
                let method = tree.store().methods().get(*frame)?;
                Some(Self::for_method(
                    method.class_name.clone(),
                    method.method_name.clone(),
                    Some(method.signature.clone()),
                ))
            }
            NodeFrame::Unknown => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            MethodPattern::All => write!(f, "{}.{}", self.class_name, ALL_METHODS_WILDCARD)?,
            MethodPattern::Named(name) => write!(f, "{}.{}", self.class_name, name)?,
        }
        if let Some(signature) = &self.signature {
            write!(f, "{}", signature)?;
        }
        Ok(())
    }
}

/// The set of selectors a user has marked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    selectors: BTreeSet<Selector>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.selectors.contains(selector)
    }

    /// Flip the membership of `selector`
    ///
    /// # Returns
    /// Whether `selector` is selected afterwards
    pub fn toggle(&mut self, selector: Selector) -> bool {
        if self.selectors.remove(&selector) {
            false
        } else {
            self.selectors.insert(selector);
            true
        }
    }

    /// Whether the class at `row` of `table` is selected, resolved by name
    ///
    /// # Panics
    /// If `row >= table.row_count()`.
    pub fn is_row_selected(&self, table: &ClassMetricsTable, row: usize) -> bool {
        self.contains(&Selector::for_class(table.class_name(row)))
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }

    pub fn clear(&mut self) {
        self.selectors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_involution() {
        let mut set = SelectionSet::new();
        let selector = Selector::for_method("java.util.HashMap", "put", Some("(Ljava/lang/Object;)V".to_string()));

        assert!(set.toggle(selector.clone()));
        assert!(set.contains(&selector));
        assert!(!set.toggle(selector.clone()));
        assert!(!set.contains(&selector));
        assert!(set.is_empty());
    }

    #[test]
    fn test_selectors_compare_by_value() {
        let mut set = SelectionSet::new();
        set.toggle(Selector::for_class(String::from("Foo")));

        assert!(set.contains(&Selector::for_class("Foo")));
        assert!(!set.contains(&Selector::for_method("Foo", "bar", None)));
    }

    #[test]
    fn test_wildcard_method_is_whole_class() {
        assert_eq!(Selector::for_method("Foo", "*", None), Selector::for_class("Foo"));
        assert_eq!(Selector::for_class("Foo").to_string(), "Foo.*");
    }
}
