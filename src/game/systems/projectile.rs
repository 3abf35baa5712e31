//! Lasers fired by UFOs and the player
//!
//! Every laser gets an `Expire` timer sized so it crosses most of the arena
//! height before disappearing.

use crate::game::constants::laser::{LIFETIME_HEIGHT_FRACTION, PLAYER_SHOT_SPEED};
use crate::game::events::GameEvent;
use crate::game::schedule::TimerKey;
use crate::game::state::{ArenaState, EntityId, Laser, ShotOwner};
use crate::game::systems::ufo::LaserRequest;
use crate::util::vec2::Vec2;

/// Seconds a laser at `speed` lives in an arena `height` tall
pub fn lifetime(height: f32, speed: f32) -> f32 {
    if speed > 0.0 {
        LIFETIME_HEIGHT_FRACTION * height / speed
    } else {
        0.0
    }
}

fn add_laser(
    state: &mut ArenaState,
    owner: ShotOwner,
    angle: f32,
    position: Vec2,
    speed: f32,
) -> EntityId {
    let id = state.next_entity_id();
    state.lasers.push(Laser {
        id,
        owner,
        position,
        velocity: Vec2::from_angle(angle) * speed,
        rotation: angle,
    });
    let ttl = lifetime(state.bounds.height, speed);
    state.scheduler.schedule(id, TimerKey::Expire, ttl);
    id
}

/// Spawn the shot a UFO asked for
pub fn fire_ufo_laser(state: &mut ArenaState, ufo: EntityId, request: &LaserRequest) -> EntityId {
    let id = add_laser(
        state,
        ShotOwner::Ufo(ufo),
        request.angle,
        request.position,
        request.speed,
    );
    state.push_event(GameEvent::UfoShotFired {
        ufo,
        laser: id,
        position: request.position,
        angle: request.angle,
        speed: request.speed,
    });
    id
}

/// Fire from the ship's nose along its heading. `None` without a ship.
pub fn fire_player_laser(state: &mut ArenaState) -> Option<EntityId> {
    let (angle, position) = {
        let player = state.player.as_ref()?;
        let angle = player.rotation;
        (angle, player.position + Vec2::from_angle(angle) * player.radius())
    };
    Some(add_laser(
        state,
        ShotOwner::Player,
        angle,
        position,
        PLAYER_SHOT_SPEED,
    ))
}

/// Remove a laser whose lifetime ran out
pub fn expire(state: &mut ArenaState, id: EntityId) -> bool {
    if state.take_laser(id).is_some() {
        state.push_event(GameEvent::LaserExpired { id });
        true
    } else {
        false
    }
}

/// Remove a laser that hit something
pub fn remove(state: &mut ArenaState, id: EntityId) -> Option<Laser> {
    state.take_laser(id)
}
