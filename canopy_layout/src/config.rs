// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// How children are arranged around their parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutMode {
    /// Leaf-weighted angular sectors subdividing the full circle.
    #[default]
    Continuous,
    /// Eight fixed 45° slots around each parent.
    Compass,
}

/// Distance of each ring from the focus.
///
/// All variants give radius `0` for depth `0`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RingSpacing {
    /// `base_radius * depth`.
    #[default]
    Linear,
    /// Each ring is `growth` times further from the previous one than the
    /// ring before it, so outer rings get more circumference to share.
    Geometric {
        /// Step multiplier between consecutive rings.
        growth: f64,
    },
    /// Caller-supplied radius for each depth. Not serializable.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(u32) -> f64),
}

impl PartialEq for RingSpacing {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Linear, Self::Linear) => true,
            (Self::Geometric { growth: a }, Self::Geometric { growth: b }) => a == b,
            (Self::Custom(a), Self::Custom(b)) => core::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl RingSpacing {
    /// Radius of the ring at `depth` relative to the focus.
    #[must_use]
    pub fn radius(&self, depth: u32, base_radius: f64) -> f64 {
        if depth == 0 {
            return 0.0;
        }
        match *self {
            Self::Linear => base_radius * f64::from(depth),
            Self::Geometric { growth } => {
                if (growth - 1.0).abs() < 1e-9 {
                    base_radius * f64::from(depth)
                } else {
                    base_radius * (growth.powi(exponent(depth)) - 1.0) / (growth - 1.0)
                }
            }
            Self::Custom(f) => f(depth),
        }
    }

    /// Distance between ring `depth - 1` and ring `depth`.
    #[must_use]
    pub fn step(&self, depth: u32, base_radius: f64) -> f64 {
        if depth == 0 {
            return 0.0;
        }
        self.radius(depth, base_radius) - self.radius(depth - 1, base_radius)
    }
}

/// Parameters for [`compute_layout`](crate::compute_layout).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Continuous sectors or compass slots.
    pub mode: LayoutMode,
    /// Ring radius as a function of depth.
    pub ring_spacing: RingSpacing,
    /// World-space distance of the first ring.
    pub base_radius: f64,
    /// World-space diameter of the focus node.
    pub node_diameter: f64,
    /// Diameter multiplier applied once per ring.
    pub depth_falloff: f64,
    /// Angle (radians, screen space) where the focus sector starts.
    pub start_angle: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Continuous,
            ring_spacing: RingSpacing::Linear,
            base_radius: 120.0,
            node_diameter: 48.0,
            depth_falloff: 0.85,
            start_angle: 0.0,
        }
    }
}

impl LayoutConfig {
    /// World-space diameter of a node `depth` rings out from the focus.
    #[must_use]
    pub fn diameter_at(&self, depth: u32) -> f64 {
        self.node_diameter * self.depth_falloff.powi(exponent(depth))
    }
}

fn exponent(depth: u32) -> i32 {
    i32::try_from(depth).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_and_geometric_agree_at_first_ring() {
        let geometric = RingSpacing::Geometric { growth: 1.5 };
        assert_eq!(RingSpacing::Linear.radius(1, 100.0), 100.0);
        assert!((geometric.radius(1, 100.0) - 100.0).abs() < 1e-9);
        assert!((geometric.radius(2, 100.0) - 250.0).abs() < 1e-9);
        assert!((geometric.step(3, 100.0) - 225.0).abs() < 1e-9);
    }

    #[test]
    fn custom_spacing_is_called_per_depth() {
        fn squares(depth: u32) -> f64 {
            f64::from(depth * depth)
        }
        let spacing = RingSpacing::Custom(squares);
        assert_eq!(spacing.radius(0, 1.0), 0.0);
        assert_eq!(spacing.radius(3, 1.0), 9.0);
        assert_eq!(spacing, RingSpacing::Custom(squares));
    }

    #[test]
    fn diameter_falls_off_with_depth() {
        let cfg = LayoutConfig::default();
        assert_eq!(cfg.diameter_at(0), 48.0);
        assert!(cfg.diameter_at(2) < cfg.diameter_at(1));
    }
}
