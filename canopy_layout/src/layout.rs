// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::{FRAC_PI_8, TAU};
use core::fmt;
use std::collections::VecDeque;

use canopy_tree::{Direction, NodeId, Tree};
use hashbrown::HashMap;
use kurbo::{Point, Rect, Vec2};

use crate::config::{LayoutConfig, LayoutMode};

/// What a [`Layout`] was computed against.
///
/// Camera state is not part of the fingerprint: panning and zooming only
/// change the world-to-screen projection, never world positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutFingerprint {
    /// [`Tree::shape_id`] at computation time.
    pub shape_id: u64,
    /// [`Tree::topology_revision`] at computation time.
    pub topology_revision: u64,
    /// Node placed at the origin.
    pub focus: NodeId,
}

/// Placement of one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutEntry {
    /// Polar angle of the node around the focus, in radians. The focus itself
    /// reports [`LayoutConfig::start_angle`].
    pub angle: f64,
    /// Distance from the focus.
    pub radius: f64,
    /// World-space center.
    pub position: Point,
    /// Rings between this node and the focus.
    pub depth: u32,
    /// Start of the angular sector owned by this node's subtree.
    pub sector_start: f64,
    /// Width of that sector in radians.
    pub sector_width: f64,
    /// World-space footprint diameter.
    pub diameter: f64,
}

impl LayoutEntry {
    /// World-space bounding box of the node's circular footprint.
    #[must_use]
    pub fn footprint(&self) -> Rect {
        Rect::from_center_size(self.position, (self.diameter, self.diameter))
    }
}

/// Layout computation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutError {
    /// The focus node is not in the tree.
    UnknownFocus(NodeId),
    /// A parent has more children than compass slots.
    CompassOverflow {
        /// The crowded parent.
        parent: NodeId,
        /// How many children it has.
        children: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownFocus(id) => write!(f, "focus node {id} is not in the tree"),
            Self::CompassOverflow { parent, children } => write!(
                f,
                "node {parent} has {children} children but the compass has 8 slots"
            ),
        }
    }
}

impl core::error::Error for LayoutError {}

/// World-space placement of the focus subtree.
///
/// Only the focus and its descendants are laid out; ancestors and sibling
/// branches of the focus are absent.
#[derive(Clone, Debug)]
pub struct Layout {
    fingerprint: LayoutFingerprint,
    entries: HashMap<NodeId, LayoutEntry>,
    order: Vec<NodeId>,
    max_diameter: f64,
}

impl Layout {
    /// What this layout was computed against.
    #[must_use]
    pub fn fingerprint(&self) -> LayoutFingerprint {
        self.fingerprint
    }

    /// The node at the origin.
    #[must_use]
    pub fn focus(&self) -> NodeId {
        self.fingerprint.focus
    }

    /// Returns `true` while `tree` still has the shape this layout was built from.
    #[must_use]
    pub fn is_valid_for(&self, tree: &Tree, focus: NodeId) -> bool {
        self.fingerprint
            == LayoutFingerprint {
                shape_id: tree.shape_id(),
                topology_revision: tree.topology_revision(),
                focus,
            }
    }

    /// Placement of `id`, if it was laid out.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&LayoutEntry> {
        self.entries.get(&id)
    }

    /// Number of laid-out nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if nothing was laid out.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in breadth-first order from the focus.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &LayoutEntry)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id).map(|entry| (*id, entry)))
    }

    /// Largest footprint diameter.
    #[must_use]
    pub fn max_diameter(&self) -> f64 {
        self.max_diameter
    }

    /// Mean footprint diameter, `0` for an empty layout.
    #[must_use]
    pub fn average_diameter(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let total: f64 = self.entries.values().map(|e| e.diameter).sum();
        total / self.entries.len() as f64
    }

    /// World-space bounds of every footprint.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.iter()
            .map(|(_, entry)| entry.footprint())
            .reduce(|acc, r| acc.union(r))
            .unwrap_or(Rect::ZERO)
    }
}

/// Lays out the subtree of `focus` around the world origin.
///
/// The result is a pure function of the tree's shape, the focus and `config`:
/// labels and revisions never move anything.
pub fn compute_layout(
    tree: &Tree,
    focus: NodeId,
    config: &LayoutConfig,
) -> Result<Layout, LayoutError> {
    if !tree.contains(focus) {
        return Err(LayoutError::UnknownFocus(focus));
    }
    let mut layout = Layout {
        fingerprint: LayoutFingerprint {
            shape_id: tree.shape_id(),
            topology_revision: tree.topology_revision(),
            focus,
        },
        entries: HashMap::new(),
        order: Vec::new(),
        max_diameter: 0.0,
    };
    let focus_entry = LayoutEntry {
        angle: config.start_angle,
        radius: 0.0,
        position: Point::ORIGIN,
        depth: 0,
        sector_start: config.start_angle,
        sector_width: TAU,
        diameter: config.diameter_at(0),
    };
    match config.mode {
        LayoutMode::Continuous => continuous(tree, focus, focus_entry, config, &mut layout),
        LayoutMode::Compass => compass(tree, focus, focus_entry, config, &mut layout)?,
    }
    Ok(layout)
}

fn push(layout: &mut Layout, id: NodeId, entry: LayoutEntry) {
    layout.max_diameter = layout.max_diameter.max(entry.diameter);
    layout.entries.insert(id, entry);
    layout.order.push(id);
}

/// Leaf count of every node under `focus`, computed bottom-up.
fn leaf_counts(tree: &Tree, focus: NodeId) -> HashMap<NodeId, u32> {
    let order: Vec<NodeId> = tree.preorder(focus).map(|node| node.id()).collect();
    let mut counts = HashMap::with_capacity(order.len());
    for id in order.iter().rev() {
        let children = tree.children(*id);
        let count = if children.is_empty() {
            1
        } else {
            children
                .iter()
                .map(|child| counts.get(child).copied().unwrap_or(1))
                .fold(0_u32, u32::saturating_add)
        };
        counts.insert(*id, count);
    }
    counts
}

fn continuous(
    tree: &Tree,
    focus: NodeId,
    focus_entry: LayoutEntry,
    config: &LayoutConfig,
    layout: &mut Layout,
) {
    let leaves = leaf_counts(tree, focus);
    let mut queue = VecDeque::from([(focus, focus_entry)]);
    while let Some((id, entry)) = queue.pop_front() {
        push(layout, id, entry);
        let children = tree.children(id);
        if children.is_empty() {
            continue;
        }
        let total: f64 = children
            .iter()
            .map(|child| f64::from(leaves.get(child).copied().unwrap_or(1)))
            .sum();
        let depth = entry.depth + 1;
        let radius = config.ring_spacing.radius(depth, config.base_radius);
        let diameter = config.diameter_at(depth);
        let mut cursor = entry.sector_start;
        for child in children {
            let weight = f64::from(leaves.get(child).copied().unwrap_or(1));
            let width = entry.sector_width * weight / total;
            let angle = cursor + width / 2.0;
            queue.push_back((
                *child,
                LayoutEntry {
                    angle,
                    radius,
                    position: Point::ORIGIN + Vec2::from_angle(angle) * radius,
                    depth,
                    sector_start: cursor,
                    sector_width: width,
                    diameter,
                },
            ));
            cursor += width;
        }
    }
}

/// Pairs each child with a slot: explicit slots first, then free slots in
/// [`Direction::ALL`] order for the rest, in child order.
fn assign_slots(tree: &Tree, parent: NodeId) -> Result<Vec<(NodeId, Direction)>, LayoutError> {
    let children = tree.children(parent);
    if children.len() > Direction::ALL.len() {
        return Err(LayoutError::CompassOverflow {
            parent,
            children: children.len(),
        });
    }
    let mut free = tree.free_slots(parent);
    let mut assigned = Vec::with_capacity(children.len());
    for child in children {
        let slot = match tree.get(*child).and_then(|node| node.slot()) {
            Some(slot) => slot,
            None => free.next().ok_or(LayoutError::CompassOverflow {
                parent,
                children: children.len(),
            })?,
        };
        assigned.push((*child, slot));
    }
    Ok(assigned)
}

/// Slot subdivision: the focus's sector is centered on `start_angle`, and each
/// node splits its own sector into eight equal parts in compass order
/// starting from [`Direction::E`]. Children sit on their ring at the midpoint
/// of their slot's part, so no two nodes share a sector.
fn compass(
    tree: &Tree,
    focus: NodeId,
    focus_entry: LayoutEntry,
    config: &LayoutConfig,
    layout: &mut Layout,
) -> Result<(), LayoutError> {
    let focus_entry = LayoutEntry {
        sector_start: config.start_angle - FRAC_PI_8,
        ..focus_entry
    };
    let mut queue = VecDeque::from([(focus, focus_entry)]);
    while let Some((id, entry)) = queue.pop_front() {
        push(layout, id, entry);
        let depth = entry.depth + 1;
        let radius = config.ring_spacing.radius(depth, config.base_radius);
        let diameter = config.diameter_at(depth);
        let width = entry.sector_width / 8.0;
        for (child, slot) in assign_slots(tree, id)? {
            let sector_start = entry.sector_start + entry.sector_width * slot.angle() / TAU;
            let angle = sector_start + width / 2.0;
            queue.push_back((
                child,
                LayoutEntry {
                    angle,
                    radius,
                    position: Point::ORIGIN + Vec2::from_angle(angle) * radius,
                    depth,
                    sector_start,
                    sector_width: width,
                    diameter,
                },
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u64) -> NodeId {
        NodeId(id)
    }

    #[test]
    fn unknown_focus_is_an_error() {
        let tree = Tree::with_root(n(1), "root");
        let err = compute_layout(&tree, n(2), &LayoutConfig::default()).unwrap_err();
        assert_eq!(err, LayoutError::UnknownFocus(n(2)));
    }

    #[test]
    fn leaf_counts_sum_over_subtrees() {
        let mut tree = Tree::with_root(n(1), "root");
        tree.add_child(n(1), n(2), "a").unwrap();
        tree.add_child(n(1), n(3), "b").unwrap();
        tree.add_child(n(2), n(4), "a.1").unwrap();
        tree.add_child(n(2), n(5), "a.2").unwrap();
        let counts = leaf_counts(&tree, n(1));
        assert_eq!(counts[&n(1)], 3);
        assert_eq!(counts[&n(2)], 2);
        assert_eq!(counts[&n(3)], 1);
    }

    #[test]
    fn single_node_layout_sits_at_origin() {
        let tree = Tree::with_root(n(1), "root");
        let layout = compute_layout(&tree, n(1), &LayoutConfig::default()).unwrap();
        assert_eq!(layout.len(), 1);
        let entry = layout.get(n(1)).unwrap();
        assert_eq!(entry.position, Point::ORIGIN);
        assert_eq!(layout.bounds(), Rect::new(-24.0, -24.0, 24.0, 24.0));
    }
}
