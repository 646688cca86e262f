// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the tree store: node identifiers, compass slots and records.

use alloc::string::String;
use alloc::vec::Vec;
use core::f64::consts::FRAC_PI_4;
use core::fmt;

/// Identifier for a node in the tree.
///
/// Ids are chosen by the content layer and stay stable for the lifetime of a
/// node, across edits, reloads and reconciliation. The engine never invents
/// or recycles ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// One of the eight fixed 45° slots around a parent in the compass layout.
///
/// Angles are in screen space: `x` grows to the right and `y` grows downward,
/// so [`Direction::S`] points down the screen at `π/2`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Up.
    N,
    /// Up and right.
    NE,
    /// Right.
    E,
    /// Down and right.
    SE,
    /// Down.
    S,
    /// Down and left.
    SW,
    /// Left.
    W,
    /// Up and left.
    NW,
}

impl Direction {
    /// All slots, in the order free slots are handed out.
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::NE,
        Self::E,
        Self::SE,
        Self::S,
        Self::SW,
        Self::W,
        Self::NW,
    ];

    /// Position of this slot in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::N => 0,
            Self::NE => 1,
            Self::E => 2,
            Self::SE => 3,
            Self::S => 4,
            Self::SW => 5,
            Self::W => 6,
            Self::NW => 7,
        }
    }

    /// Screen-space angle of the slot center in radians, in `[0, 2π)`.
    #[must_use]
    pub fn angle(self) -> f64 {
        // E is 0 and angles grow clockwise on screen (towards +y).
        let steps: u8 = match self {
            Self::E => 0,
            Self::SE => 1,
            Self::S => 2,
            Self::SW => 3,
            Self::W => 4,
            Self::NW => 5,
            Self::N => 6,
            Self::NE => 7,
        };
        FRAC_PI_4 * f64::from(steps)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        };
        f.write_str(name)
    }
}

/// Flat description of one node, as supplied by (or exported to) the content layer.
///
/// This is the ingestion format for [`Tree::from_records`](crate::Tree::from_records):
/// the full tree is a list of records that must agree with each other
/// (parent pointers match children lists, levels match depth).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeRecord {
    /// Stable id.
    pub id: NodeId,
    /// Parent id, `None` only for the root.
    pub parent: Option<NodeId>,
    /// Ordered children.
    pub children: Vec<NodeId>,
    /// Depth from the root. `None` lets the store derive it.
    pub level: Option<u32>,
    /// Opaque display label; content is owned externally.
    pub label: String,
    /// Per-node revision used for conflict detection.
    pub revision: u64,
    /// Compass slot under the parent, if the node was placed in one.
    pub slot: Option<Direction>,
}

impl NodeRecord {
    /// Creates a record with no children, no label and revision `0`.
    #[must_use]
    pub fn new(id: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            level: None,
            label: String::new(),
            revision: 0,
            slot: None,
        }
    }

    /// Sets the ordered children.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = NodeId>) -> Self {
        self.children = children.into_iter().collect();
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the expected level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Sets the revision.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Sets the compass slot.
    #[must_use]
    pub fn with_slot(mut self, slot: Direction) -> Self {
        self.slot = Some(slot);
        self
    }
}

/// A node stored in a [`Tree`](crate::Tree).
///
/// Fields are read-only from outside the store; all mutation goes through the
/// tree so invariants are checked in one place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) level: u32,
    pub(crate) label: String,
    pub(crate) revision: u64,
    pub(crate) slot: Option<Direction>,
}

impl Node {
    /// Stable id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Depth from the root.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Per-node revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Compass slot under the parent.
    #[must_use]
    pub fn slot(&self) -> Option<Direction> {
        self.slot
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Converts the node back into its ingestion record.
    #[must_use]
    pub fn to_record(&self) -> NodeRecord {
        NodeRecord {
            id: self.id,
            parent: self.parent,
            children: self.children.clone(),
            level: Some(self.level),
            label: self.label.clone(),
            revision: self.revision,
            slot: self.slot,
        }
    }
}
