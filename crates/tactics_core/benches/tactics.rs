//! Tactical core benchmarks.
//!
//! Run with: `cargo bench -p tactics_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tactics_core::clustering::cluster_world;
use tactics_core::config::ClusteringConfig;
use tactics_core::prelude::*;
use tactics_test_utils::danger::StubDanger;
use tactics_test_utils::fake_world::FakeWorld;

/// Several squads spread over the map plus an opposing force near each.
fn battlefield(squads: i32) -> SnapshotWorld {
    (0..squads)
        .fold(FakeWorld::new(), |world, i| {
            let x = i * 40;
            world
                .squad(UnitType::Marine, 12, (x, 0))
                .squad(UnitType::Marauder, 4, (x, 2))
                .own(UnitType::Medivac, (x, 4))
                .enemy_squad(UnitType::Zergling, 10, (x + 8, 0))
                .enemy_squad(UnitType::Roach, 4, (x + 10, 3))
        })
        .base(1000, (-20, 0), (-25, 0))
        .researched(Upgrade::Stimpack)
        .enemy_start(400, 400)
        .build()
}

pub fn clustering_benchmark(c: &mut Criterion) {
    let config = ClusteringConfig::default();
    let mut group = c.benchmark_group("cluster_world");
    for squads in [1, 4, 16] {
        let world = battlefield(squads);
        group.bench_with_input(BenchmarkId::from_parameter(squads), &world, |b, world| {
            b.iter(|| black_box(cluster_world(world, &config)));
        });
    }
    group.finish();
}

pub fn tick_benchmark(c: &mut Criterion) {
    let world = battlefield(8);
    let danger = StubDanger::new();
    let quotas = CompositionQuotas::new();
    c.bench_function("commander_tick", |b| {
        b.iter(|| {
            // a fresh commander forces the recompute path every iteration
            let mut commander = TacticalCommander::default();
            black_box(commander.tick(&world, &danger, Situation::Stable, &quotas))
        });
    });
}

criterion_group!(benches, clustering_benchmark, tick_benchmark);
criterion_main!(benches);
