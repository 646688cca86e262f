// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `canopy_tree` crate.
//!
//! These cover snapshot ingestion (every structural rejection path), compass
//! slot exclusivity, and how edits interact with the two revision counters.

use canopy_tree::{
    Direction, NodeId, NodeRecord, SlotConflictError, StructuralError, Tree, TreeError,
};

fn n(id: u64) -> NodeId {
    NodeId(id)
}

fn three_nodes() -> Vec<NodeRecord> {
    vec![
        NodeRecord::new(n(1), None)
            .with_children([n(2), n(3)])
            .with_label("root"),
        NodeRecord::new(n(2), Some(n(1))).with_label("a"),
        NodeRecord::new(n(3), Some(n(1))).with_label("b"),
    ]
}

#[test]
fn from_records_derives_levels_and_keeps_order() {
    let tree = Tree::from_records(three_nodes()).unwrap();
    assert_eq!(tree.root(), n(1));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.children(n(1)), &[n(2), n(3)]);
    assert_eq!(tree.get(n(3)).unwrap().level(), 1);
    assert_eq!(tree.revision(), 0);
    assert!(tree.validate().is_ok());
}

#[test]
fn records_round_trip_through_ingestion() {
    let tree = Tree::from_records(three_nodes()).unwrap();
    let again = Tree::from_records(tree.records()).unwrap();
    assert_eq!(tree, again);
}

#[test]
fn rejects_empty_and_duplicate_input() {
    assert_eq!(Tree::from_records(Vec::new()), Err(StructuralError::Empty));

    let mut records = three_nodes();
    records.push(NodeRecord::new(n(2), Some(n(1))));
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::DuplicateId(n(2)))
    );
}

#[test]
fn rejects_missing_and_multiple_roots() {
    let records = vec![
        NodeRecord::new(n(1), Some(n(2))).with_children([n(2)]),
        NodeRecord::new(n(2), Some(n(1))).with_children([n(1)]),
    ];
    assert_eq!(Tree::from_records(records), Err(StructuralError::NoRoot));

    let records = vec![NodeRecord::new(n(7), None), NodeRecord::new(n(3), None)];
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::MultipleRoots {
            first: n(3),
            second: n(7)
        })
    );
}

#[test]
fn rejects_dangling_references() {
    let records = vec![
        NodeRecord::new(n(1), None).with_children([n(2)]),
        NodeRecord::new(n(2), Some(n(1))),
        NodeRecord::new(n(3), Some(n(9))),
    ];
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::DanglingParent {
            node: n(3),
            parent: n(9)
        })
    );

    let records = vec![NodeRecord::new(n(1), None).with_children([n(4)])];
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::DanglingChild {
            parent: n(1),
            child: n(4)
        })
    );
}

#[test]
fn rejects_parent_child_disagreement() {
    // 2 claims 1 as parent but 1 does not list it.
    let records = vec![NodeRecord::new(n(1), None), NodeRecord::new(n(2), Some(n(1)))];
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::ParentMismatch {
            parent: n(1),
            child: n(2)
        })
    );
}

#[test]
fn rejects_detached_cycle() {
    let records = vec![
        NodeRecord::new(n(1), None),
        NodeRecord::new(n(5), Some(n(6))).with_children([n(6)]),
        NodeRecord::new(n(6), Some(n(5))).with_children([n(5)]),
    ];
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::Cycle { node: n(5) })
    );
}

#[test]
fn rejects_wrong_level_and_shared_slot() {
    let mut records = three_nodes();
    records[2] = NodeRecord::new(n(3), Some(n(1))).with_level(4);
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::LevelMismatch {
            node: n(3),
            expected: 1,
            found: 4
        })
    );

    let mut records = three_nodes();
    records[1] = NodeRecord::new(n(2), Some(n(1))).with_slot(Direction::E);
    records[2] = NodeRecord::new(n(3), Some(n(1))).with_slot(Direction::E);
    assert_eq!(
        Tree::from_records(records),
        Err(StructuralError::DuplicateSlot {
            parent: n(1),
            slot: Direction::E
        })
    );
}

#[test]
fn second_child_in_same_slot_is_rejected_and_tree_unchanged() {
    let mut tree = Tree::with_root(n(1), "root");
    tree.add_child_in_slot(n(1), n(2), "east", Direction::E)
        .unwrap();
    let before = tree.clone();
    let revision = tree.revision();

    let err = tree
        .add_child_in_slot(n(1), n(3), "east again", Direction::E)
        .unwrap_err();
    assert_eq!(
        err,
        TreeError::SlotConflict(SlotConflictError {
            parent: n(1),
            slot: Direction::E,
            occupant: n(2),
        })
    );
    assert_eq!(tree, before);
    assert_eq!(tree.revision(), revision);
    assert!(!tree.contains(n(3)));
}

#[test]
fn moving_into_an_occupied_slot_is_rejected() {
    let mut tree = Tree::with_root(n(1), "root");
    tree.add_child_in_slot(n(1), n(2), "north", Direction::N)
        .unwrap();
    tree.add_child_in_slot(n(1), n(3), "south", Direction::S)
        .unwrap();
    let before = tree.clone();

    assert!(matches!(
        tree.set_slot(n(3), Some(Direction::N)),
        Err(TreeError::SlotConflict(_))
    ));
    assert_eq!(tree, before);

    // Re-asserting your own slot is fine and changes nothing.
    tree.set_slot(n(2), Some(Direction::N)).unwrap();
    assert_eq!(tree, before);
}

#[test]
fn free_slots_skip_occupied_directions() {
    let mut tree = Tree::with_root(n(1), "root");
    tree.add_child_in_slot(n(1), n(2), "x", Direction::NE)
        .unwrap();
    tree.add_child_in_slot(n(1), n(3), "y", Direction::S)
        .unwrap();
    let free: Vec<_> = tree.free_slots(n(1)).collect();
    assert_eq!(
        free,
        [
            Direction::N,
            Direction::E,
            Direction::SE,
            Direction::SW,
            Direction::W,
            Direction::NW
        ]
    );
}

#[test]
fn structural_edits_bump_topology_labels_do_not() {
    let mut tree = Tree::from_records(three_nodes()).unwrap();
    tree.add_child(n(2), n(4), "a.1").unwrap();
    assert_eq!((tree.revision(), tree.topology_revision()), (1, 1));

    tree.set_label(n(4), "renamed").unwrap();
    assert_eq!((tree.revision(), tree.topology_revision()), (2, 1));

    tree.move_node(n(4), n(3), None).unwrap();
    assert_eq!((tree.revision(), tree.topology_revision()), (3, 2));

    tree.remove_subtree(n(3)).unwrap();
    assert_eq!((tree.revision(), tree.topology_revision()), (4, 3));
    assert!(!tree.contains(n(4)));
}

#[test]
fn shape_id_follows_structure_not_labels() {
    let mut tree = Tree::from_records(three_nodes()).unwrap();
    let other = Tree::from_records(three_nodes()).unwrap();
    assert_ne!(tree.shape_id(), other.shape_id());

    let copy = tree.clone();
    assert_eq!(copy.shape_id(), tree.shape_id());

    let shape = tree.shape_id();
    tree.set_label(n(2), "renamed").unwrap();
    assert_eq!(tree.shape_id(), shape);

    tree.add_child(n(2), n(4), "a.1").unwrap();
    assert_ne!(tree.shape_id(), shape);
    assert_ne!(tree.shape_id(), copy.shape_id());
    assert!(tree.add_child(n(42), n(5), "x").is_err());
    assert_ne!(tree.shape_id(), copy.shape_id());
}

#[test]
fn add_child_rejects_unknown_parent_and_duplicate_id() {
    let mut tree = Tree::from_records(three_nodes()).unwrap();
    assert_eq!(
        tree.add_child(n(42), n(5), "x"),
        Err(StructuralError::UnknownNode(n(42)))
    );
    assert_eq!(
        tree.add_child(n(1), n(2), "x"),
        Err(StructuralError::DuplicateId(n(2)))
    );
    assert_eq!(tree.revision(), 0);
}

#[test]
fn root_cannot_be_moved() {
    let mut tree = Tree::from_records(three_nodes()).unwrap();
    assert_eq!(
        tree.move_node(n(1), n(2), None),
        Err(TreeError::Structural(StructuralError::RootRemoval))
    );
}

#[test]
fn is_ancestor_follows_parent_chain() {
    let mut tree = Tree::from_records(three_nodes()).unwrap();
    tree.add_child(n(2), n(4), "deep").unwrap();
    assert!(tree.is_ancestor(n(1), n(4)));
    assert!(tree.is_ancestor(n(2), n(4)));
    assert!(!tree.is_ancestor(n(3), n(4)));
    assert!(!tree.is_ancestor(n(4), n(4)));
}
