use crate::game::constants::physics::POINTS_PER_METER;
use crate::game::state::ArenaState;
use crate::util::vec2::Vec2;

/// Integrate every body by `dt`. No drag; bodies coast.
/// UFO forces accumulated during the previous tick are applied first and then
/// cleared. Parked (non-dynamic) UFOs do not move.
pub fn update(state: &mut ArenaState, dt: f32) {
    for ufo in &mut state.ufos {
        if !ufo.dynamic {
            ufo.force = Vec2::ZERO;
            continue;
        }
        ufo.velocity += acceleration(ufo.force, ufo.mass()) * dt;
        ufo.force = Vec2::ZERO;
        ufo.position += ufo.velocity * dt;
        ufo.rotation += ufo.angular_velocity * dt;
    }

    for asteroid in &mut state.asteroids {
        asteroid.position += asteroid.velocity * dt;
        asteroid.rotation += asteroid.angular_velocity * dt;
    }

    for laser in &mut state.lasers {
        laser.position += laser.velocity * dt;
    }

    if let Some(player) = &mut state.player {
        player.position += player.velocity * dt;
    }
}

/// Acceleration in arena units/s² from a force in newtons on a body of `mass` kg
#[inline]
pub fn acceleration(force: Vec2, mass: f32) -> Vec2 {
    if mass > 0.0 {
        force * (POINTS_PER_METER / mass)
    } else {
        Vec2::ZERO
    }
}
