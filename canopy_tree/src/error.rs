// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised by tree ingestion and structural edits.

use core::fmt;

use crate::types::{Direction, NodeId};

/// The input (or a requested edit) would break the tree invariants.
///
/// Every operation that returns this error leaves the tree exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StructuralError {
    /// No records were supplied.
    Empty,
    /// Two records (or an insert) share an id.
    DuplicateId(NodeId),
    /// No record has a `None` parent.
    NoRoot,
    /// More than one record has a `None` parent.
    MultipleRoots {
        /// First root found, by id order.
        first: NodeId,
        /// Second root found, by id order.
        second: NodeId,
    },
    /// A record names a parent that does not exist.
    DanglingParent {
        /// The record with the bad parent pointer.
        node: NodeId,
        /// The missing parent.
        parent: NodeId,
    },
    /// A record lists a child that does not exist.
    DanglingChild {
        /// The record with the bad children list.
        parent: NodeId,
        /// The missing child.
        child: NodeId,
    },
    /// A parent pointer and a children list disagree, or a child is listed twice.
    ParentMismatch {
        /// The parent side of the disagreement.
        parent: NodeId,
        /// The child side of the disagreement.
        child: NodeId,
    },
    /// The node is not reachable from the root, so its parent chain loops.
    Cycle {
        /// Smallest id on the unreachable part.
        node: NodeId,
    },
    /// A supplied level does not match the node's depth.
    LevelMismatch {
        /// Offending node.
        node: NodeId,
        /// Depth computed from the root.
        expected: u32,
        /// Level supplied by the caller.
        found: u32,
    },
    /// Two siblings claim the same compass slot.
    DuplicateSlot {
        /// Parent of the siblings.
        parent: NodeId,
        /// The contested slot.
        slot: Direction,
    },
    /// The referenced node is not in the tree.
    UnknownNode(NodeId),
    /// The root cannot be removed or detached.
    RootRemoval,
    /// Moving `node` under `new_parent` would make it its own ancestor.
    WouldCreateCycle {
        /// Node being moved.
        node: NodeId,
        /// Requested new parent (the node itself or one of its descendants).
        new_parent: NodeId,
    },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("tree snapshot contains no nodes"),
            Self::DuplicateId(id) => write!(f, "node id {id} appears more than once"),
            Self::NoRoot => f.write_str("tree snapshot has no root node"),
            Self::MultipleRoots { first, second } => {
                write!(f, "tree snapshot has multiple roots ({first} and {second})")
            }
            Self::DanglingParent { node, parent } => {
                write!(f, "node {node} references missing parent {parent}")
            }
            Self::DanglingChild { parent, child } => {
                write!(f, "node {parent} lists missing child {child}")
            }
            Self::ParentMismatch { parent, child } => write!(
                f,
                "parent {parent} and child {child} disagree about their relationship"
            ),
            Self::Cycle { node } => {
                write!(f, "node {node} is not reachable from the root (cycle)")
            }
            Self::LevelMismatch {
                node,
                expected,
                found,
            } => write!(f, "node {node} has level {found}, expected {expected}"),
            Self::DuplicateSlot { parent, slot } => {
                write!(f, "two children of {parent} occupy slot {slot}")
            }
            Self::UnknownNode(id) => write!(f, "node {id} does not exist"),
            Self::RootRemoval => f.write_str("the root node cannot be removed or moved"),
            Self::WouldCreateCycle { node, new_parent } => write!(
                f,
                "moving {node} under {new_parent} would create a cycle"
            ),
        }
    }
}

impl core::error::Error for StructuralError {}

/// A compass slot under `parent` is already taken.
///
/// The caller should pick another slot; the tree is unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotConflictError {
    /// Parent whose slot was requested.
    pub parent: NodeId,
    /// The requested slot.
    pub slot: Direction,
    /// Child currently occupying the slot.
    pub occupant: NodeId,
}

impl fmt::Display for SlotConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "slot {} under {} is already occupied by {}",
            self.slot, self.parent, self.occupant
        )
    }
}

impl core::error::Error for SlotConflictError {}

/// Error returned by edits that may fail structurally or on a compass slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// See [`StructuralError`].
    Structural(StructuralError),
    /// See [`SlotConflictError`].
    SlotConflict(SlotConflictError),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structural(e) => fmt::Display::fmt(e, f),
            Self::SlotConflict(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl core::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Structural(e) => Some(e),
            Self::SlotConflict(e) => Some(e),
        }
    }
}

impl From<StructuralError> for TreeError {
    fn from(value: StructuralError) -> Self {
        Self::Structural(value)
    }
}

impl From<SlotConflictError> for TreeError {
    fn from(value: SlotConflictError) -> Self {
        Self::SlotConflict(value)
    }
}
