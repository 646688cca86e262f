// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree store: a flat table of nodes keyed by id.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};

use crate::error::{SlotConflictError, StructuralError, TreeError};
use crate::types::{Direction, Node, NodeId, NodeRecord};

/// Authoritative node graph for one displayed map.
///
/// Nodes live in a flat table keyed by [`NodeId`]; parent and children are
/// stored as ids rather than links. Every structural edit is validated before
/// anything is written, so a failed edit leaves the tree untouched.
///
/// Two counters describe the tree's history:
/// - [`Tree::revision`] bumps on every successful mutation.
/// - [`Tree::topology_revision`] bumps only when the shape changes (insert,
///   move, slot change, removal).
///
/// [`Tree::shape_id`] names the current shape. It is drawn from a
/// process-wide counter on construction and on every structural edit, so two
/// trees share it only when one is an unmodified clone of the other. Layout
/// caches key on it, since label edits never move anything and the per-tree
/// counters restart for every loaded tree.
///
/// Equality compares the root and the node table, not the counters.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    revision: u64,
    topology_revision: u64,
    shape_id: u64,
}

static NEXT_SHAPE_ID: AtomicU64 = AtomicU64::new(1);

fn next_shape_id() -> u64 {
    NEXT_SHAPE_ID.fetch_add(1, Ordering::Relaxed)
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.nodes == other.nodes
    }
}

impl Eq for Tree {}

impl Tree {
    /// Creates a tree holding only a root node.
    #[must_use]
    pub fn with_root(id: NodeId, label: impl Into<String>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            id,
            Node {
                id,
                parent: None,
                children: Vec::new(),
                level: 0,
                label: label.into(),
                revision: 1,
                slot: None,
            },
        );
        Self {
            nodes,
            root: id,
            revision: 0,
            topology_revision: 0,
            shape_id: next_shape_id(),
        }
    }

    /// Builds a tree from a flat list of records, failing fast on any
    /// structural problem.
    ///
    /// Checks, in order: duplicate ids, exactly one root, parent pointers and
    /// children lists agree, every node is reachable from the root (no
    /// cycles), supplied levels match depth, and no two siblings share a
    /// compass slot. Records with `level: None` get their level derived.
    pub fn from_records(
        records: impl IntoIterator<Item = NodeRecord>,
    ) -> Result<Self, StructuralError> {
        let mut by_id: HashMap<NodeId, NodeRecord> = HashMap::new();
        for record in records {
            if by_id.contains_key(&record.id) {
                return Err(StructuralError::DuplicateId(record.id));
            }
            by_id.insert(record.id, record);
        }
        if by_id.is_empty() {
            return Err(StructuralError::Empty);
        }

        let mut ids: Vec<NodeId> = by_id.keys().copied().collect();
        ids.sort_unstable();

        let root = {
            let mut roots = ids.iter().copied().filter(|id| by_id[id].parent.is_none());
            let first = roots.next().ok_or(StructuralError::NoRoot)?;
            if let Some(second) = roots.next() {
                return Err(StructuralError::MultipleRoots { first, second });
            }
            first
        };

        for id in &ids {
            let record = &by_id[id];
            if let Some(parent) = record.parent {
                let Some(parent_record) = by_id.get(&parent) else {
                    return Err(StructuralError::DanglingParent { node: *id, parent });
                };
                if !parent_record.children.contains(id) {
                    return Err(StructuralError::ParentMismatch { parent, child: *id });
                }
            }
            let mut seen = HashSet::with_capacity(record.children.len());
            for &child in &record.children {
                let Some(child_record) = by_id.get(&child) else {
                    return Err(StructuralError::DanglingChild { parent: *id, child });
                };
                if child_record.parent != Some(*id) || !seen.insert(child) {
                    return Err(StructuralError::ParentMismatch { parent: *id, child });
                }
            }
        }

        // Children lists now agree with parent pointers, so a walk from the
        // root visits each reachable node once. Anything left over loops.
        let mut levels: HashMap<NodeId, u32> = HashMap::with_capacity(ids.len());
        levels.insert(root, 0);
        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let level = levels[&id];
            for &child in &by_id[&id].children {
                levels.insert(child, level + 1);
                queue.push_back(child);
            }
        }
        if let Some(node) = ids.iter().copied().find(|id| !levels.contains_key(id)) {
            return Err(StructuralError::Cycle { node });
        }

        for id in &ids {
            let record = &by_id[id];
            let expected = levels[id];
            if let Some(found) = record.level
                && found != expected
            {
                return Err(StructuralError::LevelMismatch {
                    node: *id,
                    expected,
                    found,
                });
            }
            let mut taken = [false; 8];
            for child in &record.children {
                if let Some(slot) = by_id[child].slot {
                    if taken[slot.index()] {
                        return Err(StructuralError::DuplicateSlot { parent: *id, slot });
                    }
                    taken[slot.index()] = true;
                }
            }
        }

        let nodes = by_id
            .into_iter()
            .map(|(id, record)| {
                let node = Node {
                    id,
                    parent: record.parent,
                    children: record.children,
                    level: levels[&id],
                    label: record.label,
                    revision: record.revision,
                    slot: record.slot,
                };
                (id, node)
            })
            .collect();

        Ok(Self {
            nodes,
            root,
            revision: 0,
            topology_revision: 0,
            shape_id: next_shape_id(),
        })
    }

    /// Sets both revision counters, for trees rebuilt from another history.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self.topology_revision = revision;
        self
    }

    /// The root node id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Bumps on every successful mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bumps only on structural mutations.
    #[must_use]
    pub fn topology_revision(&self) -> u64 {
        self.topology_revision
    }

    /// Identity of the current shape, unique across every tree in the process.
    ///
    /// Clones keep it until either side changes shape.
    #[must_use]
    pub fn shape_id(&self) -> u64 {
        self.shape_id
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the tree has no nodes. A constructed tree always has a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns `true` if the node exists.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Ordered children of `id`; empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Parent of `id`, `None` for the root and unknown ids.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// All nodes, in unspecified order. Use [`Tree::preorder`] for a stable walk.
    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// Depth-first walk of the subtree rooted at `start`, children in order.
    #[must_use]
    pub fn preorder(&self, start: NodeId) -> Preorder<'_> {
        let stack = if self.contains(start) {
            alloc::vec![start]
        } else {
            Vec::new()
        };
        Preorder { tree: self, stack }
    }

    /// Returns `true` if `ancestor` lies strictly above `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Child of `parent` occupying `slot`, if any.
    #[must_use]
    pub fn slot_occupant(&self, parent: NodeId, slot: Direction) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|child| self.nodes.get(child).and_then(|n| n.slot) == Some(slot))
    }

    /// Compass slots under `parent` with no child in them, in [`Direction::ALL`] order.
    pub fn free_slots(&self, parent: NodeId) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |slot| self.slot_occupant(parent, *slot).is_none())
    }

    /// Exports every node as a record, in preorder from the root.
    #[must_use]
    pub fn records(&self) -> Vec<NodeRecord> {
        self.preorder(self.root).map(Node::to_record).collect()
    }

    /// Re-checks every invariant from scratch.
    pub fn validate(&self) -> Result<(), StructuralError> {
        if self.preorder(self.root).count() != self.nodes.len() {
            let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
            ids.sort_unstable();
            let reachable: HashSet<NodeId> = self.preorder(self.root).map(Node::id).collect();
            if let Some(node) = ids.into_iter().find(|id| !reachable.contains(id)) {
                return Err(StructuralError::Cycle { node });
            }
        }
        Self::from_records(self.records()).map(|_| ())
    }

    /// Appends a new child under `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        id: NodeId,
        label: impl Into<String>,
    ) -> Result<(), StructuralError> {
        let level = self.check_insert(parent, id)?;
        self.attach(parent, id, label.into(), level, None);
        Ok(())
    }

    /// Appends a new child under `parent` in a compass slot.
    ///
    /// Fails with [`SlotConflictError`] if a sibling already sits in `slot`;
    /// the occupant is never displaced.
    pub fn add_child_in_slot(
        &mut self,
        parent: NodeId,
        id: NodeId,
        label: impl Into<String>,
        slot: Direction,
    ) -> Result<(), TreeError> {
        let level = self.check_insert(parent, id)?;
        if let Some(occupant) = self.slot_occupant(parent, slot) {
            return Err(SlotConflictError {
                parent,
                slot,
                occupant,
            }
            .into());
        }
        self.attach(parent, id, label.into(), level, Some(slot));
        Ok(())
    }

    /// Re-parents `id` (and its subtree) under `new_parent`, optionally into a slot.
    ///
    /// Moving within the same parent keeps the child's position and only
    /// changes its slot. Levels of the whole subtree are recomputed.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        slot: Option<Direction>,
    ) -> Result<(), TreeError> {
        let node = self
            .nodes
            .get(&id)
            .ok_or(StructuralError::UnknownNode(id))?;
        let old_parent = node.parent.ok_or(StructuralError::RootRemoval)?;
        let old_slot = node.slot;
        let Some(new_level) = self.nodes.get(&new_parent).map(|p| p.level + 1) else {
            return Err(StructuralError::UnknownNode(new_parent).into());
        };
        if new_parent == id || self.is_ancestor(id, new_parent) {
            return Err(StructuralError::WouldCreateCycle { node: id, new_parent }.into());
        }
        if let Some(slot) = slot
            && let Some(occupant) = self.slot_occupant(new_parent, slot)
            && occupant != id
        {
            return Err(SlotConflictError {
                parent: new_parent,
                slot,
                occupant,
            }
            .into());
        }
        if old_parent == new_parent && old_slot == slot {
            return Ok(());
        }

        if old_parent != new_parent {
            if let Some(parent) = self.nodes.get_mut(&old_parent) {
                parent.children.retain(|child| *child != id);
            }
            if let Some(parent) = self.nodes.get_mut(&new_parent) {
                parent.children.push(id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(new_parent);
            node.slot = slot;
            node.revision += 1;
        }
        self.relevel(id, new_level);
        self.bump_topology();
        Ok(())
    }

    /// Moves `id` into another slot under its current parent, or clears its slot.
    pub fn set_slot(&mut self, id: NodeId, slot: Option<Direction>) -> Result<(), TreeError> {
        let parent = self
            .nodes
            .get(&id)
            .ok_or(StructuralError::UnknownNode(id))?
            .parent
            .ok_or(StructuralError::RootRemoval)?;
        self.move_node(id, parent, slot)
    }

    /// Removes `id` and all of its descendants, returning their ids in preorder.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<NodeId>, StructuralError> {
        let node = self.nodes.get(&id).ok_or(StructuralError::UnknownNode(id))?;
        let parent = node.parent.ok_or(StructuralError::RootRemoval)?;
        let removed: Vec<NodeId> = self.preorder(id).map(Node::id).collect();
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.retain(|child| *child != id);
        }
        for gone in &removed {
            self.nodes.remove(gone);
        }
        self.bump_topology();
        Ok(removed)
    }

    /// Replaces a node's label, bumping the node's revision if it changed.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> Result<(), StructuralError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(StructuralError::UnknownNode(id))?;
        let label = label.into();
        if node.label != label {
            node.label = label;
            node.revision += 1;
            self.revision += 1;
        }
        Ok(())
    }

    fn check_insert(&self, parent: NodeId, id: NodeId) -> Result<u32, StructuralError> {
        let Some(parent) = self.nodes.get(&parent) else {
            return Err(StructuralError::UnknownNode(parent));
        };
        if self.nodes.contains_key(&id) {
            return Err(StructuralError::DuplicateId(id));
        }
        Ok(parent.level + 1)
    }

    fn attach(
        &mut self,
        parent: NodeId,
        id: NodeId,
        label: String,
        level: u32,
        slot: Option<Direction>,
    ) {
        self.nodes.insert(
            id,
            Node {
                id,
                parent: Some(parent),
                children: Vec::new(),
                level,
                label,
                revision: 1,
                slot,
            },
        );
        if let Some(parent) = self.nodes.get_mut(&parent) {
            parent.children.push(id);
        }
        self.bump_topology();
    }

    fn relevel(&mut self, id: NodeId, level: u32) {
        let mut stack = alloc::vec![(id, level)];
        while let Some((id, level)) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.level = level;
                stack.extend(node.children.iter().map(|child| (*child, level + 1)));
            }
        }
    }

    fn bump_topology(&mut self) {
        self.revision += 1;
        self.topology_revision += 1;
        self.shape_id = next_shape_id();
    }
}

/// Depth-first iterator returned by [`Tree::preorder`].
#[derive(Debug)]
pub struct Preorder<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.tree.nodes.get(&id)?;
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId(id)
    }

    fn sample() -> Tree {
        let mut tree = Tree::with_root(n(1), "root");
        tree.add_child(n(1), n(2), "a").unwrap();
        tree.add_child(n(1), n(3), "b").unwrap();
        tree.add_child(n(2), n(4), "a.1").unwrap();
        tree
    }

    #[test]
    fn preorder_visits_children_in_order() {
        let tree = sample();
        let order: Vec<u64> = tree.preorder(tree.root()).map(|node| node.id().0).collect();
        assert_eq!(order, [1, 2, 4, 3]);
    }

    #[test]
    fn move_relevels_subtree() {
        let mut tree = sample();
        tree.add_child(n(3), n(5), "b.1").unwrap();
        tree.move_node(n(3), n(4), None).unwrap();

        assert_eq!(tree.get(n(3)).unwrap().level(), 3);
        assert_eq!(tree.get(n(5)).unwrap().level(), 4);
        assert_eq!(tree.children(n(1)), &[n(2)]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn move_under_descendant_is_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        let err = tree.move_node(n(2), n(4), None).unwrap_err();
        assert_eq!(
            err,
            TreeError::Structural(StructuralError::WouldCreateCycle {
                node: n(2),
                new_parent: n(4)
            })
        );
        assert_eq!(tree, before);
        assert_eq!(tree.topology_revision(), before.topology_revision());
    }

    #[test]
    fn label_edit_does_not_touch_topology() {
        let mut tree = sample();
        let topo = tree.topology_revision();
        tree.set_label(n(4), "renamed").unwrap();
        assert_eq!(tree.topology_revision(), topo);
        assert_eq!(tree.get(n(4)).unwrap().revision(), 2);

        // Same label again is a no-op.
        let rev = tree.revision();
        tree.set_label(n(4), "renamed").unwrap();
        assert_eq!(tree.revision(), rev);
    }

    #[test]
    fn remove_subtree_returns_preorder_and_rejects_root() {
        let mut tree = sample();
        assert_eq!(tree.remove_subtree(n(2)).unwrap(), [n(2), n(4)]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.remove_subtree(n(1)), Err(StructuralError::RootRemoval));
    }
}
