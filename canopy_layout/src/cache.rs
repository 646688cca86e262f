// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::sync::Arc;

use canopy_tree::{NodeId, Tree};

use crate::config::LayoutConfig;
use crate::layout::{Layout, LayoutError, compute_layout};

/// Memoizes the last layout and recomputes only when it goes stale.
///
/// A cached layout is reused while the tree's topology revision, the focus
/// and the config all match. Label edits and camera moves never invalidate it.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
    config: LayoutConfig,
    layout: Option<Arc<Layout>>,
    computations: u64,
}

impl LayoutCache {
    /// Creates an empty cache using `config`.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            layout: None,
            computations: 0,
        }
    }

    /// Config used for new computations.
    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Replaces the config, dropping the cached layout if it differs.
    pub fn set_config(&mut self, config: LayoutConfig) {
        if self.config != config {
            self.config = config;
            self.layout = None;
        }
    }

    /// The cached layout, fresh or not.
    #[must_use]
    pub fn current(&self) -> Option<&Arc<Layout>> {
        self.layout.as_ref()
    }

    /// Returns the cached layout if still valid, computing a new one otherwise.
    ///
    /// On error the previous layout stays cached.
    pub fn get_or_compute(&mut self, tree: &Tree, focus: NodeId) -> Result<Arc<Layout>, LayoutError> {
        if let Some(layout) = &self.layout
            && layout.is_valid_for(tree, focus)
        {
            return Ok(Arc::clone(layout));
        }
        let layout = Arc::new(compute_layout(tree, focus, &self.config)?);
        self.computations += 1;
        self.layout = Some(Arc::clone(&layout));
        Ok(layout)
    }

    /// Drops the cached layout.
    pub fn invalidate(&mut self) {
        self.layout = None;
    }

    /// How many layouts this cache has computed.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
