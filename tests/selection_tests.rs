use memsnap::cct::build_call_tree;
use memsnap::records::{AllocationRecord, AllocationRecordStore, FrameId, MethodInfo, MethodTable};
use memsnap::selection::{MethodPattern, SelectionSet, Selector};
use memsnap::session::Snapshot;
use memsnap::snapshot::SnapshotKind;
use chrono::Utc;
use pretty_assertions::assert_eq;

fn snapshot(classes: &[(&str, u64)]) -> Snapshot {
    let mut store = AllocationRecordStore::new(
        SnapshotKind::Allocation,
        classes.iter().map(|c| c.0.to_string()).collect(),
        MethodTable::new(vec![MethodInfo::new("app/Main", "main", "()V")]),
        0,
    );
    for (class, &(_, size)) in classes.iter().enumerate() {
        store.push(class, AllocationRecord::new(vec![FrameId(0)], size));
    }
    Snapshot::from_records(store, Utc::now()).unwrap()
}

#[test]
fn test_selection_survives_snapshot_replacement() {
    let mut selection = SelectionSet::new();
    let first = snapshot(&[("java.lang.String", 10), ("byte[]", 20)]);
    let row = first.table().find_row("byte[]").unwrap();
    selection.toggle(Selector::for_class(first.table().class_name(row)));

    // Next capture reorders the classes and adds one in front
    let second = snapshot(&[("int[]", 5), ("byte[]", 99), ("java.lang.String", 1)]);

    let selected: Vec<&str> = (0..second.table().row_count())
        .filter(|&row| selection.is_row_selected(second.table(), row))
        .map(|row| second.table().class_name(row))
        .collect();
    assert_eq!(selected, vec!["byte[]"]);
}

#[test]
fn test_selection_of_vanished_class_is_kept() {
    let mut selection = SelectionSet::new();
    selection.toggle(Selector::for_class("gone.Class"));

    let next = snapshot(&[("byte[]", 1)]);
    assert!(!selection.is_row_selected(next.table(), 0));
    assert_eq!(selection.len(), 1);
}

#[test]
fn test_selector_for_tree_nodes() {
    let snapshot = snapshot(&[("byte[]", 64)]);
    let mut tree = build_call_tree(snapshot.records(), 0, false);
    let root = tree.root();
    let main = tree.children(root)[0];

    assert_eq!(Selector::for_node(&tree, root), Some(Selector::for_class("byte[]")));

    let selector = Selector::for_node(&tree, main).unwrap();
    assert_eq!(selector.class_name, "app/Main");
    assert_eq!(selector.method, MethodPattern::Named("main".to_string()));
    assert_eq!(selector.signature.as_deref(), Some("()V"));

    let mut selection = SelectionSet::new();
    assert!(selection.toggle(selector.clone()));
    assert!(selection.contains(&Selector::for_method("app/Main", "main", Some("()V".to_string()))));
    assert!(!selection.contains(&Selector::for_method("app/Main", "main", None)));
    assert!(!selection.toggle(selector));
    assert!(selection.is_empty());
}
