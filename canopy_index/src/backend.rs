// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend trait for spatial indexing implementations.

use core::fmt::Debug;

use kurbo::{Point, Rect};

/// Spatial backend abstraction used by [`SpatialIndex`](crate::SpatialIndex).
///
/// Backends store slot numbers at world-space points (node centers). Visits
/// may over-report: the index runs an exact test on every visited slot, so a
/// backend only has to guarantee it never misses a slot that qualifies.
pub trait Backend: Debug {
    /// Insert a slot whose center is `center`.
    fn insert(&mut self, slot: usize, center: Point);

    /// Clear all spatial structures.
    fn clear(&mut self);

    /// Visit slots whose center may lie within `radius` of `pt`.
    fn visit_near<F: FnMut(usize)>(&self, pt: Point, radius: f64, f: F);

    /// Visit slots whose center may lie inside `rect`.
    fn visit_rect<F: FnMut(usize)>(&self, rect: Rect, f: F);

    /// Query slots near a point. Default: collects [`Backend::visit_near`].
    fn query_near(&self, pt: Point, radius: f64) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_near(pt, radius, |i| out.push(i));
        out
    }

    /// Query slots inside a rectangle. Default: collects [`Backend::visit_rect`].
    fn query_rect(&self, rect: Rect) -> Vec<usize> {
        let mut out = Vec::new();
        self.visit_rect(rect, |i| out.push(i));
        out
    }
}
