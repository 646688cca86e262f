// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use canopy_layout::{LayoutCache, LayoutConfig, LayoutMode, compute_layout};
use canopy_tree::{NodeId, Tree};

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
}

/// Random tree: each new node hangs off a uniformly chosen earlier node.
fn gen_random_tree(count: u64) -> Tree {
    let mut rng = Rng::new(0x7EE5_0FCA_0BB1_D00D);
    let mut tree = Tree::with_root(NodeId(1), "root");
    for id in 2..=count {
        let parent = rng.next_u64() % (id - 1) + 1;
        tree.add_child(NodeId(parent), NodeId(id), "n").unwrap();
    }
    tree
}

/// Every node up to `depth` has exactly `fanout` children, so compass mode fits.
fn gen_balanced_tree(fanout: u64, depth: u32) -> Tree {
    let mut tree = Tree::with_root(NodeId(1), "root");
    let mut frontier = vec![NodeId(1)];
    let mut next = 2;
    for _ in 0..depth {
        let mut deeper = Vec::new();
        for parent in frontier {
            for _ in 0..fanout {
                tree.add_child(parent, NodeId(next), "n").unwrap();
                deeper.push(NodeId(next));
                next += 1;
            }
        }
        frontier = deeper;
    }
    tree
}

fn bench_continuous(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_continuous");
    let config = LayoutConfig::default();
    for &n in &[100_u64, 1_000, 10_000] {
        let tree = gen_random_tree(n);
        group.throughput(Throughput::Elements(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &tree, |b, tree| {
            b.iter(|| compute_layout(black_box(tree), NodeId(1), &config).unwrap());
        });
    }
    group.finish();
}

fn bench_compass(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_compass");
    let config = LayoutConfig {
        mode: LayoutMode::Compass,
        ..LayoutConfig::default()
    };
    for &depth in &[2_u32, 3, 4] {
        let tree = gen_balanced_tree(8, depth);
        group.throughput(Throughput::Elements(tree.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tree.len()), &tree, |b, tree| {
            b.iter(|| compute_layout(black_box(tree), NodeId(1), &config).unwrap());
        });
    }
    group.finish();
}

fn bench_refocus(c: &mut Criterion) {
    let tree = gen_random_tree(5_000);
    let config = LayoutConfig::default();
    let mut group = c.benchmark_group("layout_refocus");
    group.bench_function("deep_focus", |b| {
        b.iter(|| compute_layout(&tree, black_box(NodeId(4_999)), &config).unwrap());
    });
    group.bench_function("cache_hit", |b| {
        let mut cache = LayoutCache::new(config);
        cache.get_or_compute(&tree, NodeId(1)).unwrap();
        b.iter(|| cache.get_or_compute(black_box(&tree), NodeId(1)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_continuous, bench_compass, bench_refocus);
criterion_main!(benches);
