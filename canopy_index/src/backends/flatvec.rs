// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat vector backend with linear scans. Small and simple; good for tiny sets
//! and as a reference when checking other backends.

use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::backend::Backend;

/// Flat vector backend with linear scans.
#[derive(Default)]
pub struct FlatVec {
    centers: Vec<Option<Point>>,
}

impl Debug for FlatVec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.centers.len();
        let alive = self.centers.iter().filter(|e| e.is_some()).count();
        f.debug_struct("FlatVec")
            .field("total_slots", &total)
            .field("alive", &alive)
            .finish_non_exhaustive()
    }
}

impl Backend for FlatVec {
    fn insert(&mut self, slot: usize, center: Point) {
        if self.centers.len() <= slot {
            self.centers.resize_with(slot + 1, || None);
        }
        self.centers[slot] = Some(center);
    }

    fn clear(&mut self) {
        self.centers.clear();
    }

    fn visit_near<F: FnMut(usize)>(&self, pt: Point, radius: f64, mut f: F) {
        for (i, slot) in self.centers.iter().enumerate() {
            if let Some(c) = slot
                && c.distance(pt) <= radius
            {
                f(i);
            }
        }
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Rect, mut f: F) {
        for (i, slot) in self.centers.iter().enumerate() {
            if let Some(c) = slot
                && (rect.x0..=rect.x1).contains(&c.x)
                && (rect.y0..=rect.y1).contains(&c.y)
            {
                f(i);
            }
        }
    }
}
