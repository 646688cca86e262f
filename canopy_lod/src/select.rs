// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use canopy_index::{Backend, SpatialIndex};
use canopy_layout::{Layout, LayoutFingerprint};
use canopy_tree::NodeId;
use canopy_view2d::Camera;
use kurbo::Point;

/// Selection thresholds for [`select_visible`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LodConfig {
    /// Screen pixels added on every side of the viewport before querying.
    pub margin_px: f64,
    /// On-screen diameter below which a node is drawn simplified.
    pub legibility_px: f64,
    /// Most nodes drawn at full detail in one frame.
    pub max_full: usize,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            margin_px: 48.0,
            legibility_px: 12.0,
            max_full: 200,
        }
    }
}

/// How much of a node to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Detail {
    /// Label, decoration, everything.
    Full,
    /// A dot or outline only.
    Simplified,
    /// Not drawn.
    Hidden,
}

/// A selected node with its screen-space geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibleNode {
    /// The node.
    pub id: NodeId,
    /// [`Detail::Full`] or [`Detail::Simplified`]; never hidden.
    pub detail: Detail,
    /// Center in screen pixels.
    pub screen_center: Point,
    /// Diameter in screen pixels.
    pub screen_diameter: f64,
}

/// The nodes selected for one frame, sorted by id.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleSet {
    fingerprint: LayoutFingerprint,
    nodes: Vec<VisibleNode>,
    full: usize,
    demoted: usize,
}

impl VisibleSet {
    /// Fingerprint of the layout this set was selected from.
    #[must_use]
    pub fn fingerprint(&self) -> LayoutFingerprint {
        self.fingerprint
    }

    /// Number of selected (full or simplified) nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Selected nodes in id order.
    pub fn iter(&self) -> impl Iterator<Item = &VisibleNode> + '_ {
        self.nodes.iter()
    }

    /// The selected record for `id`, if it was selected.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&VisibleNode> {
        self.nodes
            .binary_search_by_key(&id, |n| n.id)
            .ok()
            .map(|i| &self.nodes[i])
    }

    /// Detail level for `id`; anything not selected is [`Detail::Hidden`].
    #[must_use]
    pub fn detail_of(&self, id: NodeId) -> Detail {
        self.get(id).map_or(Detail::Hidden, |n| n.detail)
    }

    /// Ids drawn at full detail.
    pub fn full(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.with_detail(Detail::Full)
    }

    /// Ids drawn simplified.
    pub fn simplified(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.with_detail(Detail::Simplified)
    }

    /// Number of full nodes.
    #[must_use]
    pub fn full_count(&self) -> usize {
        self.full
    }

    /// Number of simplified nodes.
    #[must_use]
    pub fn simplified_count(&self) -> usize {
        self.nodes.len() - self.full
    }

    /// Number of legible nodes demoted to simplified by the full-detail cap.
    #[must_use]
    pub fn demoted(&self) -> usize {
        self.demoted
    }

    /// Laid-out nodes that were not selected, in layout order.
    ///
    /// Costs a pass over the layout; nothing is precomputed.
    pub fn hidden<'a>(&'a self, layout: &'a Layout) -> impl Iterator<Item = NodeId> + 'a {
        layout
            .iter()
            .map(|(id, _)| id)
            .filter(move |id| self.get(*id).is_none())
    }

    fn with_detail(&self, detail: Detail) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.detail == detail)
            .map(|n| n.id)
    }
}

/// Selects the nodes to draw this frame.
///
/// Ids returned by `index` that `layout` does not know are skipped, so an
/// index built from a different layout degrades to fewer nodes, not a panic.
#[must_use]
pub fn select_visible<B: Backend>(
    camera: &Camera,
    index: &SpatialIndex<B>,
    layout: &Layout,
    config: &LodConfig,
) -> VisibleSet {
    let margin = config.margin_px.max(0.0);
    let query = camera.viewport_rect().inflate(margin, margin);
    let center = camera.viewport_rect().center();

    let mut nodes: Vec<VisibleNode> = index
        .query(camera, query)
        .into_iter()
        .filter_map(|id| {
            let entry = layout.get(id)?;
            let screen_diameter = camera.world_to_screen_len(entry.diameter);
            let detail = if screen_diameter < config.legibility_px {
                Detail::Simplified
            } else {
                Detail::Full
            };
            Some(VisibleNode {
                id,
                detail,
                screen_center: camera.world_to_screen(entry.position),
                screen_diameter,
            })
        })
        .collect();

    let mut full: Vec<usize> = (0..nodes.len())
        .filter(|&i| nodes[i].detail == Detail::Full)
        .collect();
    let mut demoted = 0;
    if full.len() > config.max_full {
        full.sort_by(|&a, &b| {
            let da = nodes[a].screen_center.distance(center);
            let db = nodes[b].screen_center.distance(center);
            da.total_cmp(&db).then(nodes[a].id.cmp(&nodes[b].id))
        });
        for &i in &full[config.max_full..] {
            nodes[i].detail = Detail::Simplified;
        }
        demoted = full.len() - config.max_full;
    }

    VisibleSet {
        fingerprint: index.fingerprint(),
        full: full.len() - demoted,
        demoted,
        nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_index::IndexConfig;
    use canopy_layout::{LayoutConfig, compute_layout};
    use canopy_tree::Tree;
    use kurbo::{Size, Vec2};

    fn star(children: u64) -> Layout {
        let mut tree = Tree::with_root(NodeId(1), "root");
        for id in 2..children + 2 {
            tree.add_child(NodeId(1), NodeId(id), "leaf").unwrap();
        }
        compute_layout(&tree, NodeId(1), &LayoutConfig::default()).unwrap()
    }

    #[test]
    fn cap_keeps_nodes_closest_to_center() {
        let layout = star(8);
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        let camera = Camera::new(Size::new(800.0, 600.0));
        let cfg = LodConfig {
            max_full: 1,
            ..LodConfig::default()
        };
        let set = select_visible(&camera, &index, &layout, &cfg);
        assert_eq!(set.len(), 9);
        assert_eq!(set.full().collect::<Vec<_>>(), [NodeId(1)]);
        assert_eq!(set.demoted(), 8);
        assert_eq!(set.simplified_count(), 8);
    }

    #[test]
    fn cap_is_exact_and_root_stays_full() {
        let layout = star(8);
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        let camera = Camera::new(Size::new(800.0, 600.0));
        let cfg = LodConfig {
            max_full: 3,
            ..LodConfig::default()
        };
        let set = select_visible(&camera, &index, &layout, &cfg);
        let full: Vec<_> = set.full().collect();
        assert_eq!(full.len(), 3);
        assert_eq!(full[0], NodeId(1));
    }

    #[test]
    fn offscreen_nodes_are_hidden_and_enumerable() {
        let layout = star(4);
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        let mut camera = Camera::new(Size::new(800.0, 600.0));
        camera.pan(Vec2::new(5000.0, 0.0));
        let set = select_visible(&camera, &index, &layout, &LodConfig::default());
        assert!(set.is_empty());
        assert_eq!(set.detail_of(NodeId(1)), Detail::Hidden);
        assert_eq!(set.hidden(&layout).count(), layout.len());
    }
}
