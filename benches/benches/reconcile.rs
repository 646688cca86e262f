// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use canopy_reconcile::reconcile;
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

fn gen_tree(count: u64) -> Tree {
    let mut rng = Rng::new(0x3C6E_F35F_4750_2932);
    let mut tree = Tree::with_root(NodeId(1), "root");
    for id in 2..=count {
        let parent = rng.next_u64() % (id - 1) + 1;
        tree.add_child(NodeId(parent), NodeId(id), "n").unwrap();
    }
    tree
}

/// Relabels every `stride`-th node starting at `offset`, plus a few additions.
fn diverge(base: &Tree, stride: u64, offset: u64, fresh: u64) -> Tree {
    let mut tree = base.clone();
    let count = base.len() as u64;
    let mut id = 2 + offset;
    while id <= count {
        tree.set_label(NodeId(id), "edited").unwrap();
        id += stride;
    }
    for i in 0..fresh {
        tree.add_child(NodeId(1 + i % count), NodeId(fresh_base(offset) + i), "new")
            .unwrap();
    }
    tree
}

fn fresh_base(offset: u64) -> u64 {
    1_000_000 * (offset + 1)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    for &n in &[1_000_u64, 10_000] {
        let base = gen_tree(n);
        let local = diverge(&base, 7, 0, 20);
        let incoming = diverge(&base, 11, 3, 20);
        group.throughput(Throughput::Elements(n));
        group.bench_function(BenchmarkId::new("disjoint_edits", n), |b| {
            b.iter(|| reconcile(black_box(&base), &local, &incoming).unwrap());
        });
        group.bench_function(BenchmarkId::new("identical", n), |b| {
            b.iter(|| reconcile(black_box(&base), &base, &base).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
