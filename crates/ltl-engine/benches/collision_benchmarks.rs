//! Collision and tick throughput.
//!
//! The resolver scans every collider per sweep step, so cost grows with the
//! number of colliders times the distance moved. These benchmarks track that
//! growth for a crowd of walkers on a floor and for the stock stage.
//!
//! Run with: `cargo bench --bench collision_benchmarks`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ltl_ecs::prelude::*;
use ltl_engine::collision::collision_update;
use ltl_engine::entities::block::block_builder;
use ltl_engine::entities::walker::walker_builder;
use ltl_engine::input::{Binding, NullInput, StreamInput};
use ltl_engine::stage::SegmentStage;
use ltl_engine::systems::{kinetic_update, smooth_update};
use ltl_engine::tick::{TickConfig, TickLoop};

const DT: f32 = 1.0 / 60.0;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A floor with `count` walkers spread along it.
fn walker_scene(count: usize) -> Scene {
    let mut scene = Scene::default();
    scene
        .add_entity(&block_builder(
            Aabb::new(0.0, 160.0, 40.0 * count as f32, 32.0),
            RESOLVE_ALL,
            LAYER_TERRAIN,
        ))
        .unwrap();
    for index in 0..count {
        scene
            .add_entity(&walker_builder(index as f32 * 40.0, 144.0))
            .unwrap();
    }
    scene
}

fn step_all(scene: &mut Scene) {
    for index in 0..scene.entity_count() {
        let entity = Entity::new(index as u32);
        smooth_update(scene, entity);
        kinetic_update(scene, entity, DT);
        collision_update(scene, entity);
    }
}

// ---------------------------------------------------------------------------
// Benchmark 1: resolver against a crowd
// ---------------------------------------------------------------------------

fn bench_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver_walkers");
    for count in [16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut scene = walker_scene(count);
            b.iter(|| {
                step_all(&mut scene);
                black_box(scene.components.positions[Entity::new(1)].value)
            });
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: full tick on the stock stage
// ---------------------------------------------------------------------------

fn bench_stage_tick(c: &mut Criterion) {
    c.bench_function("stage_tick_idle", |b| {
        let scene = Scene::new(SceneConfig {
            seed: 7,
            ..SceneConfig::default()
        });
        let mut tick_loop = TickLoop::new(scene, TickConfig::default())
            .with_stage(Box::new(SegmentStage::new()))
            .unwrap();
        b.iter(|| {
            tick_loop.tick(&mut NullInput);
            black_box(tick_loop.tick_count())
        });
    });

    c.bench_function("stage_tick_running", |b| {
        let scene = Scene::new(SceneConfig {
            seed: 7,
            ..SceneConfig::default()
        });
        let mut tick_loop = TickLoop::new(scene, TickConfig::default())
            .with_stage(Box::new(SegmentStage::new()))
            .unwrap();
        let mut input = StreamInput::default();
        b.iter(|| {
            if input.stream().len() + 1 >= input.stream().capacity() {
                input = StreamInput::default();
            }
            input.record(&[Binding::Right]);
            tick_loop.tick(&mut input);
            black_box(tick_loop.tick_count())
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 3: state hash
// ---------------------------------------------------------------------------

fn bench_state_hash(c: &mut Criterion) {
    let scene = Scene::new(SceneConfig {
        seed: 7,
        ..SceneConfig::default()
    });
    let tick_loop = TickLoop::new(scene, TickConfig::default())
        .with_stage(Box::new(SegmentStage::new()))
        .unwrap();
    c.bench_function("state_hash_stage", |b| {
        b.iter(|| black_box(tick_loop.state_hash()));
    });
}

criterion_group!(benches, bench_resolver, bench_stage_tick, bench_state_hash);
criterion_main!(benches);
