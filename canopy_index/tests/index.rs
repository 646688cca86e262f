// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `canopy_index` crate.
//!
//! The grid backend is checked against the linear-scan backend on random
//! layouts, and every laid-out node must be found again by tapping its
//! projected center under an arbitrary camera.

use canopy_index::{IndexConfig, SpatialIndex};
use canopy_layout::{Layout, LayoutConfig, LayoutMode, RingSpacing, compute_layout};
use canopy_tree::{NodeId, Tree};
use canopy_view2d::Camera;
use kurbo::{Point, Rect, Size, Vec2};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn tree_from_parents(parents: &[u32]) -> Tree {
    let mut tree = Tree::with_root(NodeId(1), "root");
    for (i, p) in parents.iter().enumerate() {
        let id = i as u64 + 2;
        let parent = u64::from(*p) % (i as u64 + 1) + 1;
        tree.add_child(NodeId(parent), NodeId(id), "n").unwrap();
    }
    tree
}

fn layout_of(parents: &[u32]) -> Layout {
    let tree = tree_from_parents(parents);
    compute_layout(&tree, tree.root(), &LayoutConfig::default()).unwrap()
}

/// Like [`tree_from_parents`], but a node whose chosen parent already has
/// eight children goes under the previous node instead, so compass mode fits.
fn compass_tree_from_parents(parents: &[u32]) -> Tree {
    let mut tree = Tree::with_root(NodeId(1), "root");
    for (i, p) in parents.iter().enumerate() {
        let id = i as u64 + 2;
        let mut parent = u64::from(*p) % (i as u64 + 1) + 1;
        if tree.children(NodeId(parent)).len() >= 8 {
            parent = id - 1;
        }
        tree.add_child(NodeId(parent), NodeId(id), "n").unwrap();
    }
    tree
}

fn parents(max_len: usize) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(any::<u32>(), 0..=max_len)
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn tapping_a_node_center_finds_that_node(
        parents in parents(120),
        zoom in 0.1..4.0_f64,
        pan in (-400.0..400.0_f64, -400.0..400.0_f64),
    ) {
        let layout = layout_of(&parents);
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        let mut camera = Camera::new(Size::new(800.0, 600.0));
        camera.zoom(zoom, Point::new(400.0, 300.0));
        camera.pan(Vec2::new(pan.0, pan.1));

        for (id, entry) in layout.iter() {
            let tap = camera.world_to_screen(entry.position);
            prop_assert_eq!(index.nearest(&camera, tap, 8.0), Some(id));
        }
    }
}

proptest! {
    #[test]
    fn tapping_a_compass_node_center_finds_that_node(
        parents in parents(60),
        zoom in 0.1..4.0_f64,
    ) {
        let tree = compass_tree_from_parents(&parents);
        let cfg = LayoutConfig { mode: LayoutMode::Compass, ..LayoutConfig::default() };
        let layout = compute_layout(&tree, tree.root(), &cfg).unwrap();
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        let mut camera = Camera::new(Size::new(800.0, 600.0));
        camera.zoom(zoom, Point::new(400.0, 300.0));

        for (id, entry) in layout.iter() {
            let tap = camera.world_to_screen(entry.position);
            prop_assert_eq!(index.nearest(&camera, tap, 8.0), Some(id));
        }
    }
}

proptest! {
    #[test]
    fn grid_agrees_with_linear_scan(
        parents in parents(150),
        x in -800.0..800.0_f64,
        y in -800.0..800.0_f64,
        reach in 0.0..300.0_f64,
        w in 0.0..500.0_f64,
        h in 0.0..500.0_f64,
    ) {
        let layout = layout_of(&parents);
        let grid = SpatialIndex::build(&layout, &IndexConfig::default());
        let flat = SpatialIndex::build_flat(&layout);

        let pt = Point::new(x, y);
        prop_assert_eq!(grid.nearest_world(pt, reach), flat.nearest_world(pt, reach));

        let rect = Rect::new(x, y, x + w, y + h);
        prop_assert_eq!(grid.query_world(rect), flat.query_world(rect));
    }
}

// ── Examples ────────────────────────────────────────────────────────────

#[test]
fn every_node_sits_in_the_cell_of_its_center() {
    let layout = layout_of(&[0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    let index = SpatialIndex::build(&layout, &IndexConfig::default());
    let cell = index.backend().cell_size();

    let mut cells = Vec::new();
    for (id, entry) in layout.iter() {
        let (cx, cy) = index.cell_of(id).unwrap();
        let x0 = f64::from(cx) * cell;
        let y0 = f64::from(cy) * cell;
        assert!((x0..x0 + cell).contains(&entry.position.x));
        assert!((y0..y0 + cell).contains(&entry.position.y));
        cells.push((cx, cy));
    }
    cells.sort_unstable();
    cells.dedup();
    let stored: usize = cells.iter().map(|c| index.backend().cell(*c).len()).sum();
    assert_eq!(stored, index.len(), "no node is stored twice");
}

#[test]
fn miss_beyond_max_distance() {
    let layout = layout_of(&[]);
    let index = SpatialIndex::build(&layout, &IndexConfig::default());
    // The root has radius 24 at the origin.
    assert_eq!(index.nearest_world(Point::new(30.0, 0.0), 5.0), None);
    assert_eq!(index.nearest_world(Point::new(30.0, 0.0), 6.0), Some(NodeId(1)));
}

#[test]
fn max_distance_is_in_screen_pixels() {
    let layout = layout_of(&[]);
    let index = SpatialIndex::build(&layout, &IndexConfig::default());
    let mut camera = Camera::new(Size::new(800.0, 600.0));
    camera.zoom(2.0, Point::new(400.0, 300.0));
    // Footprint edge is 48px from the center on screen; 10px beyond it is a miss with 8px slop.
    let tap = Point::new(400.0 + 58.0, 300.0);
    assert_eq!(index.nearest(&camera, tap, 8.0), None);
    assert_eq!(index.nearest(&camera, tap, 12.0), Some(NodeId(1)));
}

#[test]
fn query_is_sorted_and_finds_overlapping_footprints() {
    let layout = layout_of(&[0, 0, 0, 0]);
    let index = SpatialIndex::build(&layout, &IndexConfig::default());
    let all = index.query_world(layout.bounds());
    assert_eq!(all, (1..=5).map(NodeId).collect::<Vec<_>>());

    // A tiny rect just touching the root's footprint edge still finds it.
    let edge = index.query_world(Rect::new(23.9, -0.1, 24.0, 0.1));
    assert_eq!(edge, [NodeId(1)]);
}

#[test]
fn ties_break_on_smaller_id() {
    // Flat ring spacing puts every node on the origin.
    let mut tree = Tree::with_root(NodeId(5), "root");
    tree.add_child(NodeId(5), NodeId(9), "a").unwrap();
    tree.add_child(NodeId(5), NodeId(3), "b").unwrap();
    let cfg = LayoutConfig {
        ring_spacing: RingSpacing::Custom(|_| 0.0),
        ..LayoutConfig::default()
    };
    let layout = compute_layout(&tree, NodeId(5), &cfg).unwrap();
    assert_eq!(layout.get(NodeId(3)).unwrap().position, Point::ORIGIN);
    assert_eq!(layout.get(NodeId(9)).unwrap().position, Point::ORIGIN);

    let index = SpatialIndex::build(&layout, &IndexConfig::default());
    assert_eq!(index.nearest_world(Point::ORIGIN, 0.0), Some(NodeId(3)));
    let flat = SpatialIndex::build_flat(&layout);
    assert_eq!(flat.nearest_world(Point::ORIGIN, 0.0), Some(NodeId(3)));
}
