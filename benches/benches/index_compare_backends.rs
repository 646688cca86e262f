// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use canopy_index::{Backend, IndexConfig, SpatialIndex};
use canopy_layout::{Layout, LayoutConfig, compute_layout};
use canopy_lod::{LodConfig, select_visible};
use canopy_tree::{NodeId, Tree};
use canopy_view2d::Camera;
use kurbo::{Point, Rect, Size};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_layout(count: u64) -> Layout {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut tree = Tree::with_root(NodeId(1), "root");
    for id in 2..=count {
        let parent = rng.next_u64() % (id - 1) + 1;
        tree.add_child(NodeId(parent), NodeId(id), "n").unwrap();
    }
    compute_layout(&tree, NodeId(1), &LayoutConfig::default()).unwrap()
}

/// Generates `count` random points inside the layout's bounds.
fn gen_points_in(layout: &Layout, count: usize) -> Vec<Point> {
    let bounds = layout.bounds();
    let mut rng = Rng::new(0x81FD_BEE7_94F0_AF1A);
    (0..count)
        .map(|_| {
            Point::new(
                bounds.x0 + rng.next_f64() * bounds.width(),
                bounds.y0 + rng.next_f64() * bounds.height(),
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for &n in &[1_000_u64, 10_000, 50_000] {
        let layout = gen_layout(n);
        group.throughput(Throughput::Elements(n));
        group.bench_function(BenchmarkId::new("FlatVec", n), |b| {
            b.iter(|| SpatialIndex::build_flat(black_box(&layout)));
        });
        group.bench_function(BenchmarkId::new("Grid", n), |b| {
            b.iter(|| SpatialIndex::build(black_box(&layout), &IndexConfig::default()));
        });
    }
    group.finish();
}

fn bench_nearest(c: &mut Criterion) {
    fn bench<B: Backend>(b: &mut criterion::Bencher<'_>, index: &SpatialIndex<B>, points: &[Point]) {
        b.iter(|| {
            let mut hits = 0_usize;
            for pt in points {
                if index.nearest_world(*pt, 8.0).is_some() {
                    hits += 1;
                }
            }
            black_box(hits)
        });
    }

    let mut group = c.benchmark_group("index_nearest");
    for &n in &[1_000_u64, 10_000] {
        let layout = gen_layout(n);
        let points = gen_points_in(&layout, 1_000);
        let flat = SpatialIndex::build_flat(&layout);
        let grid = SpatialIndex::build(&layout, &IndexConfig::default());
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_function(BenchmarkId::new("FlatVec", n), |b| bench(b, &flat, &points));
        group.bench_function(BenchmarkId::new("Grid", n), |b| bench(b, &grid, &points));
    }
    group.finish();
}

fn bench_query_rect(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_query_rect");
    for &n in &[1_000_u64, 10_000] {
        let layout = gen_layout(n);
        let center = layout.bounds().center();
        let viewport = Rect::from_center_size(center, (800.0, 600.0));
        let flat = SpatialIndex::build_flat(&layout);
        let grid = SpatialIndex::build(&layout, &IndexConfig::default());
        group.bench_function(BenchmarkId::new("FlatVec", n), |b| {
            b.iter(|| flat.query_world(black_box(viewport)));
        });
        group.bench_function(BenchmarkId::new("Grid", n), |b| {
            b.iter(|| grid.query_world(black_box(viewport)));
        });
    }
    group.finish();
}

fn bench_visible_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("lod_select_visible");
    for &zoom in &[0.05_f64, 0.5, 2.0] {
        let layout = gen_layout(20_000);
        let index = SpatialIndex::build(&layout, &IndexConfig::default());
        group.bench_function(BenchmarkId::new("zoom", zoom), |b| {
            b.iter_batched(
                || {
                    let mut camera = Camera::new(Size::new(1280.0, 800.0));
                    camera.zoom(zoom, Point::new(640.0, 400.0));
                    camera
                },
                |camera| select_visible(&camera, &index, &layout, &LodConfig::default()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_nearest,
    bench_query_rect,
    bench_visible_set,
);
criterion_main!(benches);
