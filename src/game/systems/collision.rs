//! Contact detection and dispatch
//!
//! Detection is a circle narrow phase over on-screen bodies using wrapped
//! displacement. Dispatch classifies each contact by category bitmask and runs
//! the matching handler only if both bodies are still attached, so a body
//! removed by an earlier contact in the same step is never processed twice.

use rand::Rng;

use crate::config::GameConfig;
use crate::game::constants::category;
use crate::game::events::{GameEvent, PlayerDeathCause, UfoDestroyCause};
use crate::game::state::{ArenaState, Body, EntityId};
use crate::game::systems::{asteroids, projectile, ufo_lifecycle};
use crate::util::geometry::wrapped_delta;

/// An unordered pair of touching bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: EntityId,
    pub a_category: u32,
    pub b: EntityId,
    pub b_category: u32,
}

/// Recognized contact kinds, each with its bodies in the order named
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPair {
    UfoShotAsteroid { shot: EntityId, asteroid: EntityId },
    UfoAsteroid { ufo: EntityId, asteroid: EntityId },
    PlayerShotAsteroid { shot: EntityId, asteroid: EntityId },
    PlayerAsteroid { asteroid: EntityId },
    PlayerUfo { ufo: EntityId },
    UfoShotPlayer { shot: EntityId },
    PlayerShotUfo { shot: EntityId, ufo: EntityId },
}

fn wants_contact(a: &Body, b: &Body) -> bool {
    category::contact_test(a.kind()) & b.kind() != 0
        || category::contact_test(b.kind()) & a.kind() != 0
}

/// Every overlapping pair of on-screen bodies whose categories test for contact
pub fn detect_contacts(state: &ArenaState) -> Vec<Contact> {
    let bodies: Vec<Body> = state
        .bodies()
        .into_iter()
        .filter(|b| b.on_screen())
        .collect();

    let mut contacts = Vec::new();
    for (i, a) in bodies.iter().enumerate() {
        for b in &bodies[i + 1..] {
            if !wants_contact(a, b) {
                continue;
            }
            let reach = a.radius + b.radius;
            if wrapped_delta(a.position, b.position, &state.bounds).length_sq() < reach * reach {
                contacts.push(Contact {
                    a: a.id,
                    a_category: a.category,
                    b: b.id,
                    b_category: b.category,
                });
            }
        }
    }
    contacts
}

/// Work out which handler a contact belongs to, in either body order
pub fn classify(contact: &Contact) -> Option<ContactPair> {
    use category::{ASTEROID, PLAYER, PLAYER_SHOT, UFO, UFO_SHOT};

    let ka = category::kind(contact.a_category);
    let kb = category::kind(contact.b_category);
    let (first, second) = (contact.a, contact.b);

    let ordered = |k1: u32, k2: u32| -> Option<(EntityId, EntityId)> {
        if ka == k1 && kb == k2 {
            Some((first, second))
        } else if kb == k1 && ka == k2 {
            Some((second, first))
        } else {
            None
        }
    };

    if let Some((shot, asteroid)) = ordered(UFO_SHOT, ASTEROID) {
        return Some(ContactPair::UfoShotAsteroid { shot, asteroid });
    }
    if let Some((ufo, asteroid)) = ordered(UFO, ASTEROID) {
        return Some(ContactPair::UfoAsteroid { ufo, asteroid });
    }
    if let Some((shot, asteroid)) = ordered(PLAYER_SHOT, ASTEROID) {
        return Some(ContactPair::PlayerShotAsteroid { shot, asteroid });
    }
    if let Some((_, asteroid)) = ordered(PLAYER, ASTEROID) {
        return Some(ContactPair::PlayerAsteroid { asteroid });
    }
    if let Some((_, ufo)) = ordered(PLAYER, UFO) {
        return Some(ContactPair::PlayerUfo { ufo });
    }
    if let Some((shot, _)) = ordered(UFO_SHOT, PLAYER) {
        return Some(ContactPair::UfoShotPlayer { shot });
    }
    if let Some((shot, ufo)) = ordered(PLAYER_SHOT, UFO) {
        return Some(ContactPair::PlayerShotUfo { shot, ufo });
    }
    None
}

/// Remove the ship and announce it. The caller decides on respawn or warp-out.
pub fn destroy_player(state: &mut ArenaState, cause: PlayerDeathCause) -> bool {
    let Some(player) = state.take_player() else {
        return false;
    };
    tracing::debug!("Player destroyed by {:?}", cause);
    state.push_event(GameEvent::PlayerDestroyed {
        position: player.position,
        cause,
    });
    true
}

fn split_asteroid(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    asteroid: EntityId,
) {
    asteroids::split(state, config, rng, asteroid);
}

/// Resolve one contact. Returns the handled pair, or `None` when the contact is
/// unrecognized or one of its bodies was already removed.
pub fn dispatch(
    state: &mut ArenaState,
    config: &GameConfig,
    rng: &mut impl Rng,
    contact: &Contact,
) -> Option<ContactPair> {
    if !state.is_attached(contact.a) || !state.is_attached(contact.b) {
        return None;
    }
    let pair = classify(contact)?;

    match pair {
        ContactPair::UfoShotAsteroid { shot, asteroid } => {
            projectile::remove(state, shot);
            split_asteroid(state, config, rng, asteroid);
        }
        ContactPair::UfoAsteroid { ufo, asteroid } => {
            split_asteroid(state, config, rng, asteroid);
            ufo_lifecycle::destroy_ufo(state, ufo, UfoDestroyCause::Asteroid);
        }
        ContactPair::PlayerShotAsteroid { shot, asteroid } => {
            projectile::remove(state, shot);
            if let Some(tier) = state.asteroid(asteroid).map(|a| a.tier) {
                state.push_event(GameEvent::AsteroidShot { tier });
            }
            split_asteroid(state, config, rng, asteroid);
        }
        ContactPair::PlayerAsteroid { asteroid } => {
            split_asteroid(state, config, rng, asteroid);
            destroy_player(state, PlayerDeathCause::Asteroid);
        }
        ContactPair::PlayerUfo { ufo } => {
            ufo_lifecycle::destroy_ufo(state, ufo, UfoDestroyCause::Player);
            destroy_player(state, PlayerDeathCause::Ufo);
        }
        ContactPair::UfoShotPlayer { shot } => {
            projectile::remove(state, shot);
            destroy_player(state, PlayerDeathCause::UfoShot);
        }
        ContactPair::PlayerShotUfo { shot, ufo } => {
            projectile::remove(state, shot);
            ufo_lifecycle::destroy_ufo(state, ufo, UfoDestroyCause::PlayerShot);
        }
    }
    Some(pair)
}
