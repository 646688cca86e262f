// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Tree: the authoritative node store behind a radial map.
//!
//! A [`Tree`] is an arena of [`Node`]s keyed by stable [`NodeId`]s. Parents
//! and children refer to each other by id, never by pointer, so the whole
//! structure is cheap to clone and safe to snapshot across threads.
//!
//! - **Ingestion** ([`Tree::from_records`]): validate a flat list of
//!   [`NodeRecord`]s and build the tree, or reject it with a
//!   [`StructuralError`].
//! - **Edits** ([`Tree::add_child`], [`Tree::add_child_in_slot`],
//!   [`Tree::move_node`], [`Tree::remove_subtree`], [`Tree::set_label`]):
//!   every edit validates first and writes second. A rejected edit leaves the
//!   tree untouched.
//! - **Compass slots** ([`Direction`]): a child may claim one of the eight
//!   45° slots around its parent. Claiming an occupied slot fails with
//!   [`SlotConflictError`]; the occupant is never displaced.
//! - **Revisions**: [`Tree::revision`] counts every mutation and
//!   [`Tree::topology_revision`] counts only shape changes.
//!   [`Tree::shape_id`] names the current shape across every tree in the
//!   process, which is what layout caches key on.
//!
//! ## Example
//!
//! ```rust
//! use canopy_tree::{Direction, NodeId, Tree, TreeError};
//!
//! let root = NodeId(1);
//! let mut tree = Tree::with_root(root, "root");
//! tree.add_child_in_slot(root, NodeId(2), "north", Direction::N).unwrap();
//!
//! let err = tree
//!     .add_child_in_slot(root, NodeId(3), "also north", Direction::N)
//!     .unwrap_err();
//! assert!(matches!(err, TreeError::SlotConflict(c) if c.occupant == NodeId(2)));
//! assert_eq!(tree.len(), 2);
//! ```
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod error;
mod tree;
mod types;

pub use error::{SlotConflictError, StructuralError, TreeError};
pub use tree::{Preorder, Tree};
pub use types::{Direction, Node, NodeId, NodeRecord};
