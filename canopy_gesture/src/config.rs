// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Thresholds for gesture recognition.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GestureConfig {
    /// Movement in screen pixels a press may make and still count as a tap.
    pub tap_slop_px: f64,
    /// Longest press, in milliseconds, that still counts as a tap.
    pub tap_timeout_ms: u64,
    /// Stationary press duration, in milliseconds, that fires a long press.
    pub long_press_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_slop_px: 8.0,
            tap_timeout_ms: 300,
            long_press_ms: 500,
        }
    }
}
