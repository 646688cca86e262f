// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use arc_swap::ArcSwap;
use canopy_index::{IndexConfig, SpatialIndex};
use canopy_layout::{Layout, LayoutCache, LayoutError};
use canopy_tree::{NodeId, Tree};

/// Everything derived from one tree revision: its layout and hit-test index.
///
/// Scenes are immutable. A rebuild produces a whole new scene which replaces
/// the old one in a single swap, so readers never see a layout paired with
/// an index from another revision.
#[derive(Debug)]
pub struct Scene {
    generation: u64,
    tree_revision: u64,
    layout: Arc<Layout>,
    index: SpatialIndex,
}

impl Scene {
    /// Lays out `tree` around `focus` through `cache` and indexes the result.
    pub(crate) fn build(
        generation: u64,
        tree: &Tree,
        focus: NodeId,
        cache: &mut LayoutCache,
        index: &IndexConfig,
    ) -> Result<Self, LayoutError> {
        let layout = cache.get_or_compute(tree, focus)?;
        let index = SpatialIndex::build(&layout, index);
        Ok(Self {
            generation,
            tree_revision: tree.revision(),
            layout,
            index,
        })
    }

    /// Rebuild request this scene answers. Later requests have larger generations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tree revision the scene was built from.
    #[must_use]
    pub fn tree_revision(&self) -> u64 {
        self.tree_revision
    }

    /// The layout.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The hit-test index over [`Scene::layout`].
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Returns `true` if the scene matches `tree`'s shape laid out around `focus`.
    #[must_use]
    pub fn is_current_for(&self, tree: &Tree, focus: NodeId) -> bool {
        self.layout.is_valid_for(tree, focus)
    }
}

/// Lock-free handle to a session's current [`Scene`].
///
/// Clone it into a render thread: [`SceneReader::load`] never blocks and
/// always returns a complete scene.
#[derive(Clone, Debug)]
pub struct SceneReader {
    slot: Arc<ArcSwap<Scene>>,
}

impl SceneReader {
    pub(crate) fn new(scene: Scene) -> Self {
        Self {
            slot: Arc::new(ArcSwap::from_pointee(scene)),
        }
    }

    /// The current scene.
    #[must_use]
    pub fn load(&self) -> Arc<Scene> {
        self.slot.load_full()
    }

    /// Installs `scene` unless a scene from a later request is already in place.
    ///
    /// Returns `true` if `scene` was installed.
    pub(crate) fn install(&self, scene: Scene) -> bool {
        let fresh = Arc::new(scene);
        let previous = self.slot.rcu(|current| {
            if current.generation < fresh.generation {
                Arc::clone(&fresh)
            } else {
                Arc::clone(current)
            }
        });
        previous.generation < fresh.generation
    }
}
