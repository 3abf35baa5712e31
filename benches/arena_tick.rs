//! Arena tick benchmarks
//!
//! Measures the contact sweep, UFO steering and a full tick at growing
//! asteroid counts.
//!
//! Run with: cargo bench --bench arena_tick

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rock_rats_arena::config::GameConfig;
use rock_rats_arena::game::constants::physics::DT;
use rock_rats_arena::game::game_loop::GameLoop;
use rock_rats_arena::game::state::SizeTier;
use rock_rats_arena::game::systems::ufo::{self, FlightContext};
use rock_rats_arena::game::systems::{asteroids, collision};
use rock_rats_arena::util::geometry::ArenaBounds;
use rock_rats_arena::util::vec2::Vec2;

/// A loop with `count` on-screen asteroids scattered over the arena, a ship
/// and a few UFOs already flying
fn create_loop_with_asteroids(count: usize) -> GameLoop {
    let bounds = ArenaBounds::new(1920.0, 1080.0);
    let mut game = GameLoop::new(Arc::new(GameConfig::default()), bounds, 7);
    let config = GameConfig::default();
    let mut rng = StdRng::seed_from_u64(count as u64);

    for _ in 0..count {
        let position = Vec2::new(
            rng.gen_range(bounds.min_x()..bounds.max_x()),
            rng.gen_range(bounds.min_y()..bounds.max_y()),
        );
        let tier = SizeTier::ALL[rng.gen_range(0..SizeTier::ALL.len())];
        asteroids::place(game.state_mut(), &config, &mut rng, position, tier, Vec2::ZERO, true);
    }

    game.spawn_player(Vec2::ZERO);
    for _ in 0..4 {
        let id = game.spawn_ufo();
        if let Some(u) = game.state_mut().ufo_mut(id) {
            u.position = Vec2::new(rng.gen_range(-800.0..800.0), rng.gen_range(-400.0..400.0));
            u.dynamic = true;
            u.on_screen = true;
        }
    }
    game
}

fn bench_contacts(c: &mut Criterion) {
    let mut group = c.benchmark_group("contacts");
    group.sample_size(50);

    for count in [10, 50, 100, 250] {
        let game = create_loop_with_asteroids(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("detect", count), &count, |b, _| {
            b.iter(|| black_box(collision::detect_contacts(game.state())))
        });
    }
    group.finish();
}

fn bench_ufo_flight(c: &mut Criterion) {
    let mut group = c.benchmark_group("ufo_flight");
    group.sample_size(50);

    for count in [10, 50, 100, 250] {
        let game = create_loop_with_asteroids(count);
        let config = GameConfig::default();
        let hazards = ufo::hazards(game.state(), &config);
        let bounds = game.state().bounds;
        let template = game.state().ufos[0].clone();
        let mut rng = StdRng::seed_from_u64(1);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("fly", count), &count, |b, _| {
            b.iter(|| {
                let mut u = template.clone();
                let ctx = FlightContext {
                    bounds,
                    hazards: &hazards,
                };
                black_box(ufo::fly(&mut u, &ctx, &config, &mut rng))
            })
        });
    }
    group.finish();
}

fn bench_full_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_tick");
    group.sample_size(30);

    for count in [10, 50, 100, 250] {
        let mut game = create_loop_with_asteroids(count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("complete", count), &count, |b, _| {
            b.iter(|| black_box(game.tick(DT)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_contacts, bench_ufo_flight, bench_full_tick);

criterion_main!(benches);
