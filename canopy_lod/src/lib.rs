// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy LOD: view virtualization for radial maps.
//!
//! [`select_visible`] decides, once per frame, which nodes are worth drawing
//! and how much detail each one gets:
//!
//! - The [`SpatialIndex`] is queried with the viewport grown by
//!   [`LodConfig::margin_px`] on every side, so nodes about to scroll in are
//!   already selected.
//! - Selected nodes whose on-screen diameter is below
//!   [`LodConfig::legibility_px`] are [`Detail::Simplified`]; the rest are
//!   [`Detail::Full`].
//! - At most [`LodConfig::max_full`] nodes stay full. The extra ones are
//!   demoted to simplified, keeping those closest to the viewport center
//!   (ties go to the smaller id) so the choice is stable while the camera is.
//! - Everything else is [`Detail::Hidden`]. Hidden nodes are not stored; ask
//!   the [`VisibleSet`] to enumerate them against the layout when needed.
//!
//! The cost of a selection is bounded by the number of nodes near the
//! viewport, not by the size of the tree.
//!
//! ## Example
//!
//! ```rust
//! use canopy_index::{IndexConfig, SpatialIndex};
//! use canopy_layout::{LayoutConfig, compute_layout};
//! use canopy_lod::{Detail, LodConfig, select_visible};
//! use canopy_tree::{NodeId, Tree};
//! use canopy_view2d::Camera;
//! use kurbo::{Point, Size};
//!
//! let mut tree = Tree::with_root(NodeId(1), "root");
//! tree.add_child(NodeId(1), NodeId(2), "child").unwrap();
//! let layout = compute_layout(&tree, NodeId(1), &LayoutConfig::default()).unwrap();
//! let index = SpatialIndex::build(&layout, &IndexConfig::default());
//!
//! let mut camera = Camera::new(Size::new(800.0, 600.0));
//! let visible = select_visible(&camera, &index, &layout, &LodConfig::default());
//! assert_eq!(visible.detail_of(NodeId(2)), Detail::Full);
//!
//! // Zoomed far out, nodes shrink below legibility.
//! camera.zoom(0.1, Point::new(400.0, 300.0));
//! let visible = select_visible(&camera, &index, &layout, &LodConfig::default());
//! assert_eq!(visible.detail_of(NodeId(2)), Detail::Simplified);
//! ```

mod select;

pub use select::{Detail, LodConfig, VisibleNode, VisibleSet, select_visible};

#[doc(no_inline)]
pub use canopy_index::SpatialIndex;
