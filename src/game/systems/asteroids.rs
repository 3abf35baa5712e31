//! Asteroid population: spawning, placement, splitting and removal
//!
//! The arena's asteroid list is only mutated through these functions so the
//! wave-cleared notification fires exactly when the last one goes away.

use std::f32::consts::PI;

use rand::Rng;
use smallvec::SmallVec;

use crate::config::GameConfig;
use crate::game::constants::asteroid::*;
use crate::game::events::GameEvent;
use crate::game::state::{ArenaState, Asteroid, EntityId, SizeTier};
use crate::util::vec2::Vec2;

/// Result of splitting one asteroid
#[derive(Debug, Clone)]
pub struct SplitOutcome {
    pub tier: SizeTier,
    pub position: Vec2,
    /// Empty for tiers that do not split
    pub children: SmallVec<[EntityId; 2]>,
}

/// Spawn an asteroid outside the visible arena, heading inward
pub fn spawn(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    tier: SizeTier,
) -> EntityId {
    let bounds = state.bounds;
    let min_speed = config.asteroid_min_speed;
    let max_speed = config.asteroid_max_speed;

    let direction = Vec2::from_angle(rng.gen_range(-PI..=PI));
    let speed_cap = (4.0 * min_speed).min(0.33 * max_speed).max(0.25 * max_speed);
    let speed = rng.gen_range(min_speed..=speed_cap.max(min_speed));
    let velocity = direction * -speed;

    let offset = Vec2::new(
        rng.gen_range(-0.5..=0.5) * SPAWN_OFFSET_FRACTION * bounds.width,
        rng.gen_range(-0.5..=0.5) * SPAWN_OFFSET_FRACTION * bounds.height,
    );
    let mut distance = rng.gen_range(SPAWN_DISTANCE_MIN..=SPAWN_DISTANCE_MAX) * bounds.height;
    let exclusion = -rng.gen_range(
        (EXCLUSION_LO_SCALE * speed).max(EXCLUSION_LO_FLOOR)
            ..=(EXCLUSION_HI_SCALE * speed).max(EXCLUSION_HI_FLOOR),
    );

    let mut extensions = 0;
    while bounds.contains_inset(offset + direction * distance, exclusion, exclusion) {
        if extensions == MAX_SPAWN_EXTENSIONS {
            tracing::warn!(
                "Asteroid spawn point still inside exclusion after {} extensions",
                MAX_SPAWN_EXTENSIONS
            );
            break;
        }
        distance *= SPAWN_DISTANCE_GROWTH;
        extensions += 1;
    }

    place(state, config, rng, offset + direction * distance, tier, velocity, false)
}

/// Add an asteroid with its speed clamped into the configured band
pub fn place(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    position: Vec2,
    tier: SizeTier,
    velocity: Vec2,
    on_screen: bool,
) -> EntityId {
    let min_speed = config.asteroid_min_speed;
    let max_speed = config.asteroid_max_speed;

    let velocity = if velocity.length_sq() == 0.0 {
        Vec2::from_angle(rng.gen_range(0.0..=2.0 * PI)) * rng.gen_range(min_speed..=max_speed)
    } else {
        velocity.clamp_length_min_max(min_speed, max_speed)
    };

    let id = state.next_entity_id();
    state.asteroids.push(Asteroid {
        id,
        tier,
        position,
        velocity,
        rotation: 0.0,
        angular_velocity: rng.gen_range(-MAX_SPIN..=MAX_SPIN),
        on_screen,
    });
    id
}

/// Child velocities for a split. They always sum to `2·v`; the speed boost is
/// applied by the caller.
pub fn split_velocities(v: Vec2, rng: &mut impl Rng) -> (Vec2, Vec2) {
    let heading = v.angle() + rng.gen_range(-SPLIT_ANGLE_SPREAD..=SPLIT_ANGLE_SPREAD);
    let v1 = v.project_onto(Vec2::from_angle(heading))
        * rng.gen_range(SPLIT_SCALE_MIN..=SPLIT_SCALE_MAX);
    let v2 = v * 2.0 - v1;
    (v1, v2)
}

/// Break an asteroid. Big and huge ones leave two children one tier smaller;
/// the parent is always removed. `None` if `id` is no longer live.
pub fn split(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    id: EntityId,
) -> Option<SplitOutcome> {
    let (tier, position, velocity) = {
        let a = state.asteroid(id)?;
        (a.tier, a.position, a.velocity)
    };

    state.push_event(GameEvent::AsteroidSplit {
        position,
        velocity,
        tier,
    });

    let mut children = SmallVec::new();
    if let Some(child_tier) = tier.smaller().filter(|_| tier.splits()) {
        let (v1, v2) = split_velocities(velocity, rng);
        let boost = config.asteroid_speed_boost;
        children.push(place(state, config, rng, position, child_tier, v1 * boost, true));
        children.push(place(state, config, rng, position, child_tier, v2 * boost, true));
    }

    tracing::debug!(
        "Asteroid {} ({}) split into {} children",
        id,
        tier,
        children.len()
    );
    remove(state, id);

    Some(SplitOutcome {
        tier,
        position,
        children,
    })
}

/// Remove one asteroid. Removing the last one announces the wave clear.
pub fn remove(state: &mut ArenaState, id: EntityId) -> Option<Asteroid> {
    let removed = state.take_asteroid(id)?;
    if state.asteroids.is_empty() {
        tracing::info!("Wave cleared at tick {}", state.tick);
        state.push_event(GameEvent::WaveCleared);
    }
    Some(removed)
}

/// Drop every asteroid without announcing a wave clear (new game)
pub fn clear_all(state: &mut ArenaState) {
    let ids: Vec<EntityId> = state.asteroids.iter().map(|a| a.id).collect();
    for id in ids {
        state.take_asteroid(id);
    }
}

/// Spawn `count` asteroids of one tier
pub fn spawn_wave(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    count: usize,
    tier: SizeTier,
) -> Vec<EntityId> {
    let ids: Vec<EntityId> = (0..count)
        .map(|_| spawn(state, config, rng, tier))
        .collect();
    tracing::info!("Spawned wave of {} {} asteroids", count, tier);
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::geometry::ArenaBounds;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_test_state() -> (ArenaState, GameConfig, StdRng) {
        (
            ArenaState::new(ArenaBounds::new(1024.0, 768.0)),
            GameConfig::default(),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_split_conserves_momentum_before_boost() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..200 {
            let v = Vec2::from_angle(i as f32 * 0.37) * (20.0 + i as f32);
            let (v1, v2) = split_velocities(v, &mut rng);
            let sum = v1 + v2;
            assert!(sum.approx_eq(v * 2.0, 1e-3), "{:?} + {:?} != 2 * {:?}", v1, v2, v);
        }
    }

    #[test]
    fn test_split_child_counts_per_tier() {
        for tier in SizeTier::ALL {
            let (mut state, config, mut rng) = create_test_state();
            let id = place(
                &mut state,
                &config,
                &mut rng,
                Vec2::ZERO,
                tier,
                Vec2::new(100.0, 0.0),
                true,
            );
            let outcome = split(&mut state, &config, &mut rng, id).unwrap();
            assert!(state.asteroid(id).is_none(), "parent must be removed");
            if tier.splits() {
                assert_eq!(outcome.children.len(), 2);
                for child in &outcome.children {
                    let a = state.asteroid(*child).unwrap();
                    assert_eq!(Some(a.tier), tier.smaller());
                    assert!(a.on_screen);
                }
            } else {
                assert!(outcome.children.is_empty());
                assert!(state.asteroids.is_empty());
            }
        }
    }

    #[test]
    fn test_huge_to_big_to_medium_lineage() {
        let (mut state, config, mut rng) = create_test_state();
        let root = spawn(&mut state, &config, &mut rng, SizeTier::Huge);

        let bigs = split(&mut state, &config, &mut rng, root).unwrap().children;
        assert_eq!(bigs.len(), 2);
        for big in bigs {
            split(&mut state, &config, &mut rng, big).unwrap();
        }

        assert_eq!(state.asteroids.len(), 4);
        assert_eq!(state.asteroid_count(SizeTier::Medium), 4);
        assert_eq!(state.asteroid_count(SizeTier::Big), 0);
        assert_eq!(state.asteroid_count(SizeTier::Huge), 0);
    }

    #[test]
    fn test_split_emits_effect_and_children_respect_speed_band() {
        let (mut state, config, mut rng) = create_test_state();
        let id = place(
            &mut state,
            &config,
            &mut rng,
            Vec2::new(10.0, 20.0),
            SizeTier::Big,
            Vec2::new(0.0, 250.0),
            true,
        );
        split(&mut state, &config, &mut rng, id).unwrap();

        let events = state.drain_events();
        assert!(matches!(
            events[0],
            GameEvent::AsteroidSplit {
                tier: SizeTier::Big,
                ..
            }
        ));
        for a in &state.asteroids {
            let speed = a.velocity.length();
            assert!(speed >= config.asteroid_min_speed - 1e-3);
            assert!(speed <= config.asteroid_max_speed + 1e-3);
            assert_eq!(a.position, Vec2::new(10.0, 20.0));
        }
    }

    #[test]
    fn test_split_unknown_id() {
        let (mut state, config, mut rng) = create_test_state();
        assert!(split(&mut state, &config, &mut rng, 999).is_none());
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_place_clamps_and_randomizes_speed() {
        let (mut state, config, mut rng) = create_test_state();
        let slow = place(&mut state, &config, &mut rng, Vec2::ZERO, SizeTier::Small, Vec2::new(1.0, 0.0), true);
        let fast = place(&mut state, &config, &mut rng, Vec2::ZERO, SizeTier::Small, Vec2::new(0.0, -9000.0), true);
        let still = place(&mut state, &config, &mut rng, Vec2::ZERO, SizeTier::Small, Vec2::ZERO, true);

        let slow = state.asteroid(slow).unwrap();
        assert!((slow.velocity.length() - config.asteroid_min_speed).abs() < 1e-3);
        assert!(slow.velocity.y.abs() < 1e-6);

        let fast = state.asteroid(fast).unwrap();
        assert!((fast.velocity.length() - config.asteroid_max_speed).abs() < 1e-2);

        let still = state.asteroid(still).unwrap();
        let speed = still.velocity.length();
        assert!(speed >= config.asteroid_min_speed - 1e-3 && speed <= config.asteroid_max_speed + 1e-3);
        assert!(still.angular_velocity.abs() <= PI);
    }

    #[test]
    fn test_spawn_starts_off_screen_and_outside() {
        let (mut state, config, mut rng) = create_test_state();
        for _ in 0..50 {
            let id = spawn(&mut state, &config, &mut rng, SizeTier::Huge);
            let a = state.asteroid(id).unwrap();
            assert!(!a.on_screen);
            assert!(!state.bounds.contains(a.position));
            let speed = a.velocity.length();
            assert!(speed >= config.asteroid_min_speed - 1e-3);
        }
    }

    #[test]
    fn test_wave_cleared_only_on_last_removal() {
        let (mut state, config, mut rng) = create_test_state();
        let ids = spawn_wave(&mut state, &config, &mut rng, 2, SizeTier::Small);

        remove(&mut state, ids[0]);
        assert!(state.drain_events().is_empty());
        remove(&mut state, ids[1]);
        assert_eq!(state.drain_events(), vec![GameEvent::WaveCleared]);
        assert!(remove(&mut state, ids[1]).is_none());
    }

    #[test]
    fn test_splitting_last_small_asteroid_clears_wave() {
        let (mut state, config, mut rng) = create_test_state();
        let id = place(&mut state, &config, &mut rng, Vec2::ZERO, SizeTier::Medium, Vec2::new(60.0, 0.0), true);
        split(&mut state, &config, &mut rng, id);
        let events = state.drain_events();
        assert_eq!(events.last(), Some(&GameEvent::WaveCleared));
    }

    #[test]
    fn test_clear_all_is_silent() {
        let (mut state, config, mut rng) = create_test_state();
        spawn_wave(&mut state, &config, &mut rng, 3, SizeTier::Big);
        clear_all(&mut state);
        assert!(state.asteroids.is_empty());
        assert!(state.drain_events().is_empty());
    }
}
