// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Index: hit testing over a laid-out radial map.
//!
//! [`SpatialIndex`] is built from a [`Layout`](canopy_layout::Layout) and
//! answers two questions:
//!
//! - [`SpatialIndex::nearest`]: which node is under (or close to) this screen
//!   point? Used to resolve taps.
//! - [`SpatialIndex::query`]: which nodes overlap this screen rectangle?
//!   Used to find what is on screen.
//!
//! Screen-space queries convert through a [`Camera`](canopy_view2d::Camera)
//! and then run in world space, so panning and zooming never require a
//! rebuild. A new layout always gets a new index.
//!
//! ## Backends
//!
//! Storage is pluggable through [`Backend`]:
//!
//! - [`UniformGrid`](backends::grid::UniformGrid) (default): square cells of
//!   `cell_factor ×` the average node diameter. Each node sits in the one
//!   cell holding its center; nearest-neighbour queries scan the 3×3 block
//!   around the point, so cost depends on local density, not tree size.
//! - [`FlatVec`](backends::flatvec::FlatVec): linear scan. Fine for a
//!   handful of nodes and handy as a reference in tests.
//!
//! ## Example
//!
//! ```rust
//! use canopy_index::{IndexConfig, SpatialIndex};
//! use canopy_layout::{LayoutConfig, compute_layout};
//! use canopy_tree::{NodeId, Tree};
//! use canopy_view2d::Camera;
//! use kurbo::Size;
//!
//! let mut tree = Tree::with_root(NodeId(1), "root");
//! tree.add_child(NodeId(1), NodeId(2), "child").unwrap();
//! let layout = compute_layout(&tree, NodeId(1), &LayoutConfig::default()).unwrap();
//! let index = SpatialIndex::build(&layout, &IndexConfig::default());
//!
//! let camera = Camera::new(Size::new(800.0, 600.0));
//! let child = layout.get(NodeId(2)).unwrap().position;
//! let tap = camera.world_to_screen(child);
//! assert_eq!(index.nearest(&camera, tap, 8.0), Some(NodeId(2)));
//! ```

pub mod backend;
pub mod backends;
mod index;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::grid::{CellCoord, UniformGrid};
pub use index::{IndexConfig, IndexedNode, SpatialIndex};
