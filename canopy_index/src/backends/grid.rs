// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform grid backend: each slot lives in the single cell containing its center.

use core::fmt::Debug;

use hashbrown::HashMap;
use kurbo::{Point, Rect};
use smallvec::SmallVec;

use crate::backend::Backend;

/// Integer coordinates of a grid cell.
pub type CellCoord = (i32, i32);

/// Uniform grid over world space.
///
/// Cells are square with side [`UniformGrid::cell_size`]; only occupied cells
/// are stored. Cell lookups are O(1), so a query costs time proportional to
/// the number of cells it touches and the slots inside them.
#[derive(Clone)]
pub struct UniformGrid {
    cell_size: f64,
    cells: HashMap<CellCoord, SmallVec<[usize; 4]>>,
    min_cell: CellCoord,
    max_cell: CellCoord,
}

impl UniformGrid {
    /// Creates an empty grid. Non-positive or non-finite sizes fall back to `1.0`.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            min_cell: (i32::MAX, i32::MAX),
            max_cell: (i32::MIN, i32::MIN),
        }
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// The cell containing `pt`.
    #[must_use]
    pub fn cell_of(&self, pt: Point) -> CellCoord {
        (coord(pt.x, self.cell_size), coord(pt.y, self.cell_size))
    }

    /// Slots stored in `cell`.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> &[usize] {
        self.cells.get(&cell).map_or(&[], |slots| slots.as_slice())
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Visits every slot in cells `lo..=hi` (inclusive on both axes).
    ///
    /// The box is first clipped to the occupied extent. If it still spans more
    /// cells than are occupied, the occupied cells are scanned instead.
    fn visit_cells<F: FnMut(usize)>(&self, lo: CellCoord, hi: CellCoord, mut f: F) {
        if self.cells.is_empty() {
            return;
        }
        let lo = (lo.0.max(self.min_cell.0), lo.1.max(self.min_cell.1));
        let hi = (hi.0.min(self.max_cell.0), hi.1.min(self.max_cell.1));
        if lo.0 > hi.0 || lo.1 > hi.1 {
            return;
        }
        let span = (i64::from(hi.0) - i64::from(lo.0) + 1) * (i64::from(hi.1) - i64::from(lo.1) + 1);
        if span > i64::try_from(self.cells.len()).unwrap_or(i64::MAX) {
            for (cell, slots) in &self.cells {
                if (lo.0..=hi.0).contains(&cell.0) && (lo.1..=hi.1).contains(&cell.1) {
                    slots.iter().copied().for_each(&mut f);
                }
            }
            return;
        }
        for x in lo.0..=hi.0 {
            for y in lo.1..=hi.1 {
                if let Some(slots) = self.cells.get(&(x, y)) {
                    slots.iter().copied().for_each(&mut f);
                }
            }
        }
    }
}

impl Debug for UniformGrid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let slots: usize = self.cells.values().map(SmallVec::len).sum();
        f.debug_struct("UniformGrid")
            .field("cell_size", &self.cell_size)
            .field("occupied_cells", &self.cells.len())
            .field("slots", &slots)
            .finish_non_exhaustive()
    }
}

impl Backend for UniformGrid {
    fn insert(&mut self, slot: usize, center: Point) {
        let cell = self.cell_of(center);
        self.min_cell = (self.min_cell.0.min(cell.0), self.min_cell.1.min(cell.1));
        self.max_cell = (self.max_cell.0.max(cell.0), self.max_cell.1.max(cell.1));
        self.cells.entry(cell).or_default().push(slot);
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.min_cell = (i32::MAX, i32::MAX);
        self.max_cell = (i32::MIN, i32::MIN);
    }

    /// Scans the point's cell and its 8 neighbours, plus further rings only
    /// when `radius` exceeds one cell.
    fn visit_near<F: FnMut(usize)>(&self, pt: Point, radius: f64, f: F) {
        let (cx, cy) = self.cell_of(pt);
        let rings = rings_for(radius, self.cell_size);
        self.visit_cells(
            (cx.saturating_sub(rings), cy.saturating_sub(rings)),
            (cx.saturating_add(rings), cy.saturating_add(rings)),
            f,
        );
    }

    fn visit_rect<F: FnMut(usize)>(&self, rect: Rect, f: F) {
        let rect = rect.abs();
        let lo = self.cell_of(Point::new(rect.x0, rect.y0));
        let hi = self.cell_of(Point::new(rect.x1, rect.y1));
        self.visit_cells(lo, hi, f);
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "value is clamped to the i32 range before casting"
)]
fn coord(v: f64, cell_size: f64) -> i32 {
    (v / cell_size)
        .floor()
        .clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "ring count is clamped to the i32 range before casting"
)]
fn rings_for(radius: f64, cell_size: f64) -> i32 {
    if radius.is_nan() || radius <= cell_size {
        return 1;
    }
    (radius / cell_size).ceil().min(f64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_floors_negative_coordinates() {
        let grid = UniformGrid::new(10.0);
        assert_eq!(grid.cell_of(Point::new(0.0, 0.0)), (0, 0));
        assert_eq!(grid.cell_of(Point::new(9.99, 10.0)), (0, 1));
        assert_eq!(grid.cell_of(Point::new(-0.1, -10.0)), (-1, -1));
    }

    #[test]
    fn each_slot_lives_in_exactly_one_cell() {
        let mut grid = UniformGrid::new(10.0);
        grid.insert(0, Point::new(5.0, 5.0));
        grid.insert(1, Point::new(15.0, 5.0));
        grid.insert(2, Point::new(6.0, 4.0));
        assert_eq!(grid.cell((0, 0)), &[0, 2]);
        assert_eq!(grid.cell((1, 0)), &[1]);
        assert_eq!(grid.occupied_cells(), 2);
    }

    #[test]
    fn near_scans_neighbours_only_for_small_radius() {
        let mut grid = UniformGrid::new(10.0);
        grid.insert(0, Point::new(5.0, 5.0));
        grid.insert(1, Point::new(15.0, 15.0));
        grid.insert(2, Point::new(45.0, 5.0));

        let mut hits = grid.query_near(Point::new(5.0, 5.0), 3.0);
        hits.sort_unstable();
        assert_eq!(hits, [0, 1]);

        let mut hits = grid.query_near(Point::new(5.0, 5.0), 40.0);
        hits.sort_unstable();
        assert_eq!(hits, [0, 1, 2]);
    }

    #[test]
    fn huge_radius_falls_back_to_occupied_cells() {
        let mut grid = UniformGrid::new(1.0);
        grid.insert(0, Point::new(-1e6, 0.0));
        grid.insert(1, Point::new(1e6, 0.0));
        let mut hits = grid.query_near(Point::ORIGIN, 1e9);
        hits.sort_unstable();
        assert_eq!(hits, [0, 1]);
    }

    #[test]
    fn rect_visits_covered_cells() {
        let mut grid = UniformGrid::new(10.0);
        grid.insert(0, Point::new(5.0, 5.0));
        grid.insert(1, Point::new(25.0, 25.0));
        grid.insert(2, Point::new(-15.0, 5.0));
        let mut hits = grid.query_rect(Rect::new(0.0, 0.0, 20.0, 20.0));
        hits.sort_unstable();
        assert_eq!(hits, [0, 1]);
    }
}
