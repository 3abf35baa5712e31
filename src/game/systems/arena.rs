//! Arena bookkeeping after each physics step
//!
//! On-screen bodies wrap at the edges. Off-screen bodies (freshly spawned
//! asteroids, launching UFOs) fly in freely and become on-screen once their
//! collision circle is fully inside the visible rect.

use crate::game::state::ArenaState;

/// Bodies that changed visibility this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaUpdate {
    pub entered: usize,
    pub wrapped: usize,
}

/// Wrap on-screen coordinates and flip on-screen flags on containment
pub fn update(state: &mut ArenaState) -> ArenaUpdate {
    let bounds = state.bounds;
    let mut result = ArenaUpdate::default();

    for asteroid in &mut state.asteroids {
        if asteroid.on_screen {
            if bounds.wrap_point(&mut asteroid.position) {
                result.wrapped += 1;
            }
        } else if bounds.contains_circle(asteroid.position, asteroid.tier.radius()) {
            asteroid.on_screen = true;
            result.entered += 1;
        }
    }

    for ufo in &mut state.ufos {
        if ufo.on_screen {
            if bounds.wrap_point(&mut ufo.position) {
                result.wrapped += 1;
            }
        } else if ufo.dynamic && bounds.contains_circle(ufo.position, ufo.radius()) {
            ufo.on_screen = true;
            result.entered += 1;
            tracing::debug!("UFO {} entered the arena", ufo.id);
        }
    }

    for laser in &mut state.lasers {
        if bounds.wrap_point(&mut laser.position) {
            result.wrapped += 1;
        }
    }

    if let Some(player) = &mut state.player {
        if bounds.wrap_point(&mut player.position) {
            result.wrapped += 1;
        }
    }

    result
}
