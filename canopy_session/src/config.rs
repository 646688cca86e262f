// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration, loadable from TOML.
//!
//! ```toml
//! # canopy.toml
//! coalesce_window_ms = 32
//! tap_hit_radius_px = 10.0
//! background_threshold = 5000
//!
//! [layout]
//! mode = "Compass"
//! base_radius = 140.0
//!
//! [lod]
//! max_full = 300
//! ```
//!
//! Every field is optional; missing ones take their defaults.

use std::path::Path;

use canopy_gesture::GestureConfig;
use canopy_index::IndexConfig;
use canopy_layout::LayoutConfig;
use canopy_lod::LodConfig;
use canopy_view2d::CameraConfig;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Configuration shared by every session of an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Radial layout parameters.
    pub layout: LayoutConfig,
    /// Spatial index sizing.
    pub index: IndexConfig,
    /// Camera scale limits.
    pub camera: CameraConfig,
    /// Gesture thresholds.
    pub gesture: GestureConfig,
    /// Level-of-detail thresholds.
    pub lod: LodConfig,
    /// Minimum spacing between camera notifications.
    pub coalesce_window_ms: u64,
    /// How far outside a node's footprint a tap still selects it, in screen pixels.
    pub tap_hit_radius_px: f64,
    /// Trees with at least this many nodes rebuild on a background thread.
    pub background_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            index: IndexConfig::default(),
            camera: CameraConfig::default(),
            gesture: GestureConfig::default(),
            lod: LodConfig::default(),
            coalesce_window_ms: 32,
            tap_hit_radius_px: 8.0,
            background_threshold: 2000,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(s)?)
    }

    /// Renders this config as TOML.
    pub fn to_toml_string(&self) -> Result<String, EngineError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reads and parses a TOML file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Writes this config as TOML, replacing any existing file.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
