//! UFO spawn, launch, warp-out and destruction
//!
//! A new UFO is parked far below the arena just past the left or right edge so
//! its engine sound hints at where it will appear. After `LAUNCH_DELAY` it is
//! moved to the height with the most clearance from asteroids and starts
//! flying across.

use rand::Rng;

use crate::config::GameConfig;
use crate::game::constants::ufo::*;
use crate::game::events::{GameEvent, Side, UfoDestroyCause};
use crate::game::schedule::TimerKey;
use crate::game::state::{ArenaState, EntityId, Ufo};
use crate::game::systems::ufo::choose_variant;
use crate::util::vec2::Vec2;

/// Create a parked UFO and schedule its launch
pub fn spawn_ufo(state: &mut ArenaState, config: &GameConfig, rng: &mut impl Rng) -> EntityId {
    let id = state.next_entity_id();
    let variant = choose_variant(config, rng);
    let mut ufo = Ufo::new(id, variant, state.ufos_killed_by_player, config, rng);

    let offset = PARK_OFFSET_DIAGONALS * variant.diameter() * std::f32::consts::SQRT_2;
    let side = if rng.gen::<bool>() { Side::Right } else { Side::Left };
    let x = match side {
        Side::Right => state.bounds.max_x() + offset,
        Side::Left => state.bounds.min_x() - offset,
    };
    ufo.position = Vec2::new(x, PARK_Y);

    tracing::debug!(
        "Spawned {:?} UFO {} on the {:?} (brothers killed {})",
        variant,
        id,
        side,
        ufo.brothers_killed
    );
    state.ufos.push(ufo);
    state.scheduler.schedule(id, TimerKey::Launch, LAUNCH_DELAY);
    state.push_event(GameEvent::UfoSpawned { id, variant, side });
    id
}

/// Smallest clearance from `position` (and its x-mirror) to any asteroid
fn clearance_at(state: &ArenaState, position: Vec2, radius: f32) -> f32 {
    let mirrored = Vec2::new(-position.x, position.y);
    state
        .asteroids
        .iter()
        .map(|a| {
            let both = radius + a.tier.clearance_radius();
            let direct = a.position.distance_to(position) - both;
            let wrapped = a.position.distance_to(mirrored) - both;
            direct.min(wrapped)
        })
        .fold(f32::INFINITY, f32::min)
}

/// Move a parked UFO to its entry height and start it moving inward.
/// Returns false if the UFO is gone.
pub fn launch_ufo(state: &mut ArenaState, rng: &mut impl Rng, id: EntityId) -> bool {
    let Some((x, radius)) = state.ufo(id).map(|u| (u.position.x, u.clearance_radius())) else {
        return false;
    };

    let span = LAUNCH_HEIGHT_FRACTION * state.bounds.max_y();
    let mut best: Option<(Vec2, f32)> = None;
    for _ in 0..LAUNCH_ATTEMPTS {
        let candidate = Vec2::new(x, rng.gen_range(-span..=span));
        let clearance = clearance_at(state, candidate, radius);
        if best.map_or(true, |(_, c)| clearance > c) {
            best = Some((candidate, clearance));
        }
        if best.is_some_and(|(_, c)| c > LAUNCH_CLEARANCE_RADII * radius) {
            break;
        }
    }
    let Some((position, clearance)) = best else {
        return false;
    };

    let Some(ufo) = state.ufo_mut(id) else {
        return false;
    };
    ufo.position = position;
    ufo.dynamic = true;
    ufo.velocity = Vec2::new(ufo.current_speed.copysign(-position.x), 0.0);
    tracing::debug!("Launched UFO {} at {:?} (clearance {:.1})", id, position, clearance);
    state.push_event(GameEvent::UfoLaunched { id, position });
    true
}

/// Arm a UFO's gun
pub fn enable_attack(state: &mut ArenaState, id: EntityId) {
    if let Some(ufo) = state.ufo_mut(id) {
        ufo.attack_enabled = true;
    }
}

/// The player died: on-screen UFOs leave after a random delay, anything not yet
/// on screen is dropped now. Returns the longest delay.
pub fn warp_out_ufos(state: &mut ArenaState, rng: &mut impl Rng) -> f32 {
    let mut max_delay = 0.0_f32;
    let mut unlaunched = Vec::new();
    let ids: Vec<(EntityId, bool)> = state.ufos.iter().map(|u| (u.id, u.on_screen)).collect();

    for (id, on_screen) in ids {
        if on_screen {
            let delay = rng.gen_range(WARP_DELAY_MIN..=WARP_DELAY_MAX);
            max_delay = max_delay.max(delay);
            state.scheduler.schedule(id, TimerKey::WarpOut, delay);
        } else {
            unlaunched.push(id);
        }
    }

    for id in unlaunched {
        tracing::debug!("Cleanup on unlaunched UFO {}", id);
        state.take_ufo(id);
    }
    max_delay
}

/// Remove a UFO with the warp-out effect
pub fn warp_out(state: &mut ArenaState, id: EntityId) -> bool {
    let Some(ufo) = state.take_ufo(id) else {
        return false;
    };
    state.push_event(GameEvent::UfoWarpedOut {
        id,
        position: ufo.position,
        rotation: ufo.rotation,
        duration: WARP_TIME,
    });
    true
}

/// Blow up a UFO. Any pending warp-out is cancelled along with its other timers.
pub fn destroy_ufo(state: &mut ArenaState, id: EntityId, cause: UfoDestroyCause) -> bool {
    state.scheduler.cancel(id, TimerKey::WarpOut);
    let Some(ufo) = state.take_ufo(id) else {
        return false;
    };
    if cause.credited_to_player() {
        state.ufos_killed_by_player += 1;
    }
    tracing::debug!("UFO {} destroyed by {:?}", id, cause);
    state.push_event(GameEvent::UfoExploded {
        id,
        position: ufo.position,
        velocity: ufo.velocity,
        rotation: ufo.rotation,
        variant: ufo.variant,
        cause,
    });
    true
}
