// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Layout: deterministic radial placement of a tree.
//!
//! [`compute_layout`] places a focus node at the world origin and its
//! descendants on concentric rings, one ring per level. Two modes are
//! available through [`LayoutMode`]:
//!
//! - **Continuous** (default): siblings share their parent's angular sector
//!   in proportion to how many leaves each subtree holds, so dense branches
//!   get more room. Ties keep child order. A node sits at the midpoint of
//!   its sector.
//! - **Compass**: each child takes one of eight fixed slots
//!   ([`Direction`](canopy_tree::Direction)). Around the focus the slots are
//!   the 45° compass sectors; deeper down each node splits its own sector
//!   into eight parts in the same order, so branches never cross. Children
//!   without a slot take the free ones in order; more than eight children is
//!   a [`LayoutError::CompassOverflow`].
//!
//! Ring radii come from [`RingSpacing`] and footprints shrink by
//! [`LayoutConfig::depth_falloff`] per ring.
//!
//! A [`Layout`] remembers the [`LayoutFingerprint`] it was built from.
//! [`LayoutCache`] reuses a layout until the fingerprint (or config) changes.
//!
//! ## Example
//!
//! ```rust
//! use canopy_layout::{LayoutConfig, compute_layout};
//! use canopy_tree::{NodeId, Tree};
//!
//! let mut tree = Tree::with_root(NodeId(1), "root");
//! tree.add_child(NodeId(1), NodeId(2), "left").unwrap();
//! tree.add_child(NodeId(1), NodeId(3), "right").unwrap();
//!
//! let layout = compute_layout(&tree, NodeId(1), &LayoutConfig::default()).unwrap();
//! let a = layout.get(NodeId(2)).unwrap();
//! let b = layout.get(NodeId(3)).unwrap();
//! assert_eq!(a.radius, b.radius);
//! assert!((a.sector_width - core::f64::consts::PI).abs() < 1e-12);
//! ```

mod cache;
mod config;
mod layout;

pub use cache::LayoutCache;
pub use config::{LayoutConfig, LayoutMode, RingSpacing};
pub use layout::{Layout, LayoutEntry, LayoutError, LayoutFingerprint, compute_layout};
