// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_layout::{Layout, LayoutFingerprint};
use canopy_tree::NodeId;
use canopy_view2d::Camera;
use kurbo::{Point, Rect};

use crate::backend::Backend;
use crate::backends::flatvec::FlatVec;
use crate::backends::grid::{CellCoord, UniformGrid};

/// Grid sizing for [`SpatialIndex::build`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IndexConfig {
    /// Cell side as a multiple of the average node diameter.
    pub cell_factor: f64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { cell_factor: 2.0 }
    }
}

impl IndexConfig {
    /// Cell size for `layout`: `cell_factor` times the average diameter, but
    /// never smaller than the largest diameter.
    #[must_use]
    pub fn cell_size_for(&self, layout: &Layout) -> f64 {
        let size = (self.cell_factor * layout.average_diameter()).max(layout.max_diameter());
        if size.is_finite() && size > 0.0 {
            size
        } else {
            1.0
        }
    }
}

/// One indexed node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedNode {
    /// The node.
    pub id: NodeId,
    /// World-space center.
    pub center: Point,
    /// World-space footprint radius.
    pub radius: f64,
}

/// Hit-testing index over one [`Layout`].
///
/// Built wholesale from a layout and never updated in place. Camera changes
/// do not affect it: screen-space queries convert through the camera first.
#[derive(Clone, Debug)]
pub struct SpatialIndex<B = UniformGrid> {
    fingerprint: LayoutFingerprint,
    // Sorted by id, so slot order is id order.
    nodes: Vec<IndexedNode>,
    max_radius: f64,
    backend: B,
}

impl SpatialIndex<UniformGrid> {
    /// Builds a grid index sized for `layout`.
    #[must_use]
    pub fn build(layout: &Layout, config: &IndexConfig) -> Self {
        Self::build_with(layout, UniformGrid::new(config.cell_size_for(layout)))
    }

    /// The grid cell holding `id`'s center.
    #[must_use]
    pub fn cell_of(&self, id: NodeId) -> Option<CellCoord> {
        self.node(id).map(|node| self.backend.cell_of(node.center))
    }
}

impl SpatialIndex<FlatVec> {
    /// Builds a linear-scan index.
    #[must_use]
    pub fn build_flat(layout: &Layout) -> Self {
        Self::build_with(layout, FlatVec::default())
    }
}

impl<B: Backend> SpatialIndex<B> {
    /// Builds an index over `layout` using `backend`, which is cleared first.
    #[must_use]
    pub fn build_with(layout: &Layout, mut backend: B) -> Self {
        let mut nodes: Vec<IndexedNode> = layout
            .iter()
            .map(|(id, entry)| IndexedNode {
                id,
                center: entry.position,
                radius: entry.diameter / 2.0,
            })
            .collect();
        nodes.sort_unstable_by_key(|node| node.id);
        backend.clear();
        let mut max_radius = 0.0_f64;
        for (slot, node) in nodes.iter().enumerate() {
            backend.insert(slot, node.center);
            max_radius = max_radius.max(node.radius);
        }
        Self {
            fingerprint: layout.fingerprint(),
            nodes,
            max_radius,
            backend,
        }
    }

    /// Fingerprint of the layout this index was built from.
    #[must_use]
    pub fn fingerprint(&self) -> LayoutFingerprint {
        self.fingerprint
    }

    /// Returns `true` if this index was built from `layout`'s fingerprint.
    #[must_use]
    pub fn is_valid_for(&self, layout: &Layout) -> bool {
        self.fingerprint == layout.fingerprint()
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The indexed record for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&IndexedNode> {
        self.nodes
            .binary_search_by_key(&id, |node| node.id)
            .ok()
            .map(|slot| &self.nodes[slot])
    }

    /// Largest footprint radius.
    #[must_use]
    pub fn max_radius(&self) -> f64 {
        self.max_radius
    }

    /// The backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Node whose center is closest to `pt`, among those whose footprint
    /// comes within `max_distance` of it. Ties go to the smaller id.
    #[must_use]
    pub fn nearest_world(&self, pt: Point, max_distance: f64) -> Option<NodeId> {
        let reach = max_distance.max(0.0) + self.max_radius;
        let mut best: Option<(f64, NodeId)> = None;
        self.backend.visit_near(pt, reach, |slot| {
            let Some(node) = self.nodes.get(slot) else {
                return;
            };
            let d = node.center.distance(pt);
            if d > node.radius + max_distance.max(0.0) {
                return;
            }
            let better = match best {
                None => true,
                Some((bd, bid)) => d < bd || (d == bd && node.id < bid),
            };
            if better {
                best = Some((d, node.id));
            }
        });
        best.map(|(_, id)| id)
    }

    /// Nodes whose circular footprint intersects `rect`, sorted by id.
    #[must_use]
    pub fn query_world(&self, rect: Rect) -> Vec<NodeId> {
        let rect = rect.abs();
        let mut out = Vec::new();
        self.backend
            .visit_rect(rect.inflate(self.max_radius, self.max_radius), |slot| {
                if let Some(node) = self.nodes.get(slot)
                    && circle_hits_rect(node.center, node.radius, rect)
                {
                    out.push(node.id);
                }
            });
        out.sort_unstable();
        out.dedup();
        out
    }

    /// [`SpatialIndex::nearest_world`] for a screen point, with `max_distance`
    /// in screen pixels.
    #[must_use]
    pub fn nearest(&self, camera: &Camera, screen_pt: Point, max_distance_px: f64) -> Option<NodeId> {
        self.nearest_world(
            camera.screen_to_world(screen_pt),
            camera.screen_to_world_len(max_distance_px),
        )
    }

    /// [`SpatialIndex::query_world`] for a screen rectangle.
    #[must_use]
    pub fn query(&self, camera: &Camera, screen_rect: Rect) -> Vec<NodeId> {
        self.query_world(camera.screen_to_world_rect(screen_rect))
    }
}

fn circle_hits_rect(center: Point, radius: f64, rect: Rect) -> bool {
    let closest = Point::new(
        center.x.clamp(rect.x0, rect.x1),
        center.y.clamp(rect.y0, rect.y1),
    );
    closest.distance(center) <= radius
}
