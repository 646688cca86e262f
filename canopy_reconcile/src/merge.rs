// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_tree::{Direction, Node, NodeId, NodeRecord, Tree};
use hashbrown::{HashMap, HashSet};

use crate::error::ReconcileError;

/// Why a node needed a decision the snapshots could not make on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConflictKind {
    /// Both sides changed the node to different states, placement agreeing.
    Content,
    /// Both sides placed the node differently (parent or slot), or both put
    /// a child into the same slot.
    Structure,
    /// One side moved the node, the other deleted it.
    MoveDelete,
    /// One side edited the node in place, the other deleted it.
    EditDelete,
    /// The node had been deleted but a kept node still hangs under it, so it
    /// was restored.
    Orphan,
    /// Moves from both sides combined into a cycle, so this node went back
    /// to its base parent.
    Cycle,
}

/// One conflict found while reconciling.
///
/// Revisions are `None` where the snapshot does not contain the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConflictRecord {
    /// The node.
    pub node: NodeId,
    /// Revision in the common ancestor.
    pub base_revision: Option<u64>,
    /// Revision in the local snapshot.
    pub local_revision: Option<u64>,
    /// Revision in the incoming snapshot.
    pub incoming_revision: Option<u64>,
    /// What went wrong.
    pub kind: ConflictKind,
}

/// Result of [`reconcile`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    /// The merged tree, with a revision above both inputs.
    pub merged: Tree,
    /// Conflicts, sorted by node id.
    pub conflicts: Vec<ConflictRecord>,
}

impl Reconciliation {
    /// Returns `true` if the merge needed no arbitration.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Base,
    Local,
    Incoming,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct State {
    revision: u64,
    label: String,
    parent: Option<NodeId>,
    slot: Option<Direction>,
}

impl State {
    fn of(node: &Node) -> Self {
        Self {
            revision: node.revision(),
            label: node.label().to_owned(),
            parent: node.parent(),
            slot: node.slot(),
        }
    }

    fn placement(&self) -> (Option<NodeId>, Option<Direction>) {
        (self.parent, self.slot)
    }

    /// Same label and placement, whatever the revision.
    fn same_content(&self, other: &Self) -> bool {
        self.label == other.label && self.placement() == other.placement()
    }
}

/// Both sides ended up in the same place: both deleted, or both holding the
/// same content, possibly after a different number of edits.
fn converged(local: Option<&State>, incoming: Option<&State>) -> bool {
    match (local, incoming) {
        (None, None) => true,
        (Some(l), Some(i)) => l.same_content(i),
        _ => false,
    }
}

/// Three-way merge of tree snapshots.
///
/// `base` is the last state both sides agreed on; `local` and `incoming` are
/// the two divergent descendants. Each node's state is its revision, label,
/// parent and slot. A side changed a node if the node's presence or state
/// differs from `base`.
///
/// - Changed on one side only: that side wins, including deletions.
/// - Changed to the same label and placement on both sides: taken as is,
///   with the higher of the two revisions.
/// - Changed differently on both sides: the base version is kept (local's
///   if base never had the node) and a [`ConflictRecord`] is emitted.
///
/// The merged result is then repaired: deleted parents of kept nodes are
/// restored ([`ConflictKind::Orphan`]), moves that combine into a cycle are
/// reverted to base ([`ConflictKind::Cycle`]), and siblings left sharing a
/// compass slot keep it in base-then-id order, the others losing their slot
/// ([`ConflictKind::Structure`]).
///
/// Children keep the order of the side that won their parent (or the side
/// that reordered them), followed by any new children in local, incoming,
/// then base order.
///
/// The merged tree's revision is one above the larger input revision.
pub fn reconcile(
    base: &Tree,
    local: &Tree,
    incoming: &Tree,
) -> Result<Reconciliation, ReconcileError> {
    if base.root() != local.root() || base.root() != incoming.root() {
        return Err(ReconcileError::RootMismatch {
            base: base.root(),
            local: local.root(),
            incoming: incoming.root(),
        });
    }
    let mut merge = Merge {
        base,
        local,
        incoming,
        chosen: HashMap::new(),
        conflicts: Vec::new(),
        reverted: HashSet::new(),
    };
    merge.decide();
    loop {
        let restored = merge.restore_orphans();
        let reverted = merge.break_cycle();
        if !restored && !reverted {
            break;
        }
    }
    merge.free_slots();

    let records = merge.records();
    let revision = local.revision().max(incoming.revision()) + 1;
    let merged = Tree::from_records(records)?.with_revision(revision);
    let mut conflicts = merge.conflicts;
    conflicts.sort_by_key(|c| c.node);
    tracing::debug!(
        nodes = merged.len(),
        conflicts = conflicts.len(),
        revision,
        "reconciled snapshots"
    );
    Ok(Reconciliation { merged, conflicts })
}

struct Merge<'a> {
    base: &'a Tree,
    local: &'a Tree,
    incoming: &'a Tree,
    chosen: HashMap<NodeId, (State, Side)>,
    conflicts: Vec<ConflictRecord>,
    reverted: HashSet<NodeId>,
}

impl Merge<'_> {
    fn decide(&mut self) {
        let mut ids: Vec<NodeId> = self
            .base
            .iter()
            .chain(self.local.iter())
            .chain(self.incoming.iter())
            .map(Node::id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        for id in ids {
            let b = self.base.get(id).map(State::of);
            let l = self.local.get(id).map(State::of);
            let i = self.incoming.get(id).map(State::of);
            let local_changed = l != b;
            let incoming_changed = i != b;

            let pick = match (local_changed, incoming_changed) {
                (false, false) => b.map(|s| (s, Side::Base)),
                (true, false) => l.map(|s| (s, Side::Local)),
                (false, true) => i.map(|s| (s, Side::Incoming)),
                (true, true) if converged(l.as_ref(), i.as_ref()) => match (l, i) {
                    (Some(l), Some(i)) if i.revision > l.revision => Some((i, Side::Incoming)),
                    (l, _) => l.map(|s| (s, Side::Local)),
                },
                (true, true) => {
                    let (kind, keep) = match (b, l, i) {
                        (b, Some(l), Some(i)) => {
                            let kind = if l.placement() == i.placement() {
                                ConflictKind::Content
                            } else {
                                ConflictKind::Structure
                            };
                            let keep = match b {
                                Some(b) => (b, Side::Base),
                                None => (l, Side::Local),
                            };
                            (kind, keep)
                        }
                        (Some(b), Some(kept), None) | (Some(b), None, Some(kept)) => {
                            let kind = if kept.placement() == b.placement() {
                                ConflictKind::EditDelete
                            } else {
                                ConflictKind::MoveDelete
                            };
                            (kind, (b, Side::Base))
                        }
                        // Both sides changed and disagree, so at most one is absent,
                        // and base is present whenever one is.
                        (b, l, i) => match b.or(l).or(i) {
                            Some(s) => (ConflictKind::Content, (s, Side::Base)),
                            None => continue,
                        },
                    };
                    self.conflict(id, kind);
                    Some(keep)
                }
            };
            if let Some(pick) = pick {
                self.chosen.insert(id, pick);
            }
        }
    }

    /// Brings back deleted parents of kept nodes. Returns `true` if any were restored.
    fn restore_orphans(&mut self) -> bool {
        let mut any = false;
        let mut pending: Vec<NodeId> = self.sorted_ids();
        while let Some(id) = pending.pop() {
            let Some(parent) = self.chosen.get(&id).and_then(|(s, _)| s.parent) else {
                continue;
            };
            if self.chosen.contains_key(&parent) {
                continue;
            }
            let restored = [
                (self.base, Side::Base),
                (self.local, Side::Local),
                (self.incoming, Side::Incoming),
            ]
            .into_iter()
            .find_map(|(tree, side)| tree.get(parent).map(|n| (State::of(n), side)));
            match restored {
                Some(state) => {
                    tracing::trace!(node = parent.0, child = id.0, "restoring deleted parent");
                    self.chosen.insert(parent, state);
                    self.conflict(parent, ConflictKind::Orphan);
                    pending.push(parent);
                    any = true;
                }
                None => self.reattach_to_root(id),
            }
        }
        any
    }

    /// Finds one parent cycle and breaks it. Returns `true` if one was found.
    fn break_cycle(&mut self) -> bool {
        let root = self.base.root();
        let mut grounded: HashSet<NodeId> = HashSet::new();
        grounded.insert(root);
        for start in self.sorted_ids() {
            let mut path: Vec<NodeId> = Vec::new();
            let mut on_path: HashMap<NodeId, usize> = HashMap::new();
            let mut current = start;
            loop {
                if grounded.contains(&current) {
                    grounded.extend(path.iter().copied());
                    break;
                }
                if let Some(&at) = on_path.get(&current) {
                    let mut members = path.split_off(at);
                    members.sort_unstable();
                    self.revert_cycle(&members);
                    return true;
                }
                on_path.insert(current, path.len());
                path.push(current);
                match self.chosen.get(&current).and_then(|(s, _)| s.parent) {
                    Some(parent) if self.chosen.contains_key(&parent) => current = parent,
                    // Parentless non-root or missing parent: left for orphan repair.
                    _ => break,
                }
            }
        }
        false
    }

    fn revert_cycle(&mut self, members: &[NodeId]) {
        let mut any = false;
        for &id in members {
            if self.reverted.contains(&id) {
                continue;
            }
            let Some(base) = self.base.get(id) else {
                continue;
            };
            let Some((state, _)) = self.chosen.get_mut(&id) else {
                continue;
            };
            if state.placement() == (base.parent(), base.slot()) {
                continue;
            }
            state.parent = base.parent();
            state.slot = base.slot();
            self.reverted.insert(id);
            self.conflict(id, ConflictKind::Cycle);
            any = true;
        }
        if !any && let Some(&first) = members.first() {
            // Only new nodes (or already reverted ones) remain on the cycle.
            self.reattach_to_root(first);
            self.conflict(first, ConflictKind::Cycle);
        }
    }

    fn reattach_to_root(&mut self, id: NodeId) {
        let root = self.base.root();
        if let Some((state, _)) = self.chosen.get_mut(&id) {
            state.parent = Some(root);
            state.slot = None;
        }
    }

    /// Clears the slot of every sibling that lost a shared slot.
    fn free_slots(&mut self) {
        let mut taken: HashMap<(NodeId, Direction), Vec<NodeId>> = HashMap::new();
        for id in self.sorted_ids() {
            if let Some((state, _)) = self.chosen.get(&id)
                && let (Some(parent), Some(slot)) = state.placement()
            {
                taken.entry((parent, slot)).or_default().push(id);
            }
        }
        let mut groups: Vec<((NodeId, Direction), Vec<NodeId>)> =
            taken.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
        groups.sort_unstable_by_key(|(key, _)| *key);
        for ((parent, slot), mut ids) in groups {
            // The base occupant keeps the slot if there is one.
            ids.sort_by_key(|id| {
                let held = self
                    .base
                    .get(*id)
                    .is_some_and(|n| n.parent() == Some(parent) && n.slot() == Some(slot));
                (!held, *id)
            });
            for id in ids.into_iter().skip(1) {
                if let Some((state, _)) = self.chosen.get_mut(&id) {
                    state.slot = None;
                }
                self.conflict(id, ConflictKind::Structure);
            }
        }
    }

    fn records(&self) -> Vec<NodeRecord> {
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for (id, (state, _)) in &self.chosen {
            if let Some(parent) = state.parent {
                children.entry(parent).or_default().push(*id);
            }
        }
        self.sorted_ids()
            .into_iter()
            .filter_map(|id| {
                let (state, _) = self.chosen.get(&id)?;
                let members = children.remove(&id).unwrap_or_default();
                let mut record = NodeRecord::new(id, state.parent)
                    .with_children(self.order_children(id, members))
                    .with_label(state.label.clone())
                    .with_revision(state.revision);
                record.slot = state.slot;
                Some(record)
            })
            .collect()
    }

    /// Orders the merged children of `parent`.
    fn order_children(&self, parent: NodeId, mut members: Vec<NodeId>) -> Vec<NodeId> {
        let base = self.base.children(parent);
        let local = self.local.children(parent);
        let incoming = self.incoming.children(parent);
        let winner = match self.chosen.get(&parent).map(|(_, side)| *side) {
            Some(Side::Local) => local,
            Some(Side::Incoming) => incoming,
            _ if local != base => local,
            _ if incoming != base => incoming,
            _ => base,
        };
        members.sort_unstable();
        let mut ordered = Vec::with_capacity(members.len());
        let mut placed: HashSet<NodeId> = HashSet::with_capacity(members.len());
        for &child in winner.iter().chain(local).chain(incoming).chain(base) {
            if members.binary_search(&child).is_ok() && placed.insert(child) {
                ordered.push(child);
            }
        }
        ordered.extend(members.into_iter().filter(|c| !placed.contains(c)));
        ordered
    }

    fn conflict(&mut self, node: NodeId, kind: ConflictKind) {
        let revision = |tree: &Tree| tree.get(node).map(Node::revision);
        self.conflicts.push(ConflictRecord {
            node,
            base_revision: revision(self.base),
            local_revision: revision(self.local),
            incoming_revision: revision(self.incoming),
            kind,
        });
    }

    fn sorted_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.chosen.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
