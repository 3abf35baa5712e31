//! Side effects emitted by the simulation
//!
//! The core never plays sounds or spawns particles itself. It records what
//! happened and the host drains the list once per tick for whatever
//! presentation layer is attached.

use serde::Serialize;

use crate::game::state::{EntityId, SizeTier, UfoVariant};
use crate::util::vec2::Vec2;

/// Edge a UFO enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

/// What destroyed a UFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UfoDestroyCause {
    Asteroid,
    Player,
    PlayerShot,
}

impl UfoDestroyCause {
    /// Kills that feed the revenge factor
    pub fn credited_to_player(&self) -> bool {
        matches!(self, UfoDestroyCause::PlayerShot)
    }
}

/// What destroyed the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlayerDeathCause {
    Asteroid,
    Ufo,
    UfoShot,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// An asteroid was hit; hook for the split effect and hit sound
    AsteroidSplit {
        position: Vec2,
        velocity: Vec2,
        tier: SizeTier,
    },
    /// A player shot destroyed an asteroid (scoring hook)
    AsteroidShot { tier: SizeTier },
    /// The last live asteroid was removed
    WaveCleared,
    /// A UFO was parked off-screen; hook for the engine sound on `side`
    UfoSpawned {
        id: EntityId,
        variant: UfoVariant,
        side: Side,
    },
    UfoLaunched { id: EntityId, position: Vec2 },
    UfoShotFired {
        ufo: EntityId,
        laser: EntityId,
        position: Vec2,
        angle: f32,
        speed: f32,
    },
    UfoExploded {
        id: EntityId,
        position: Vec2,
        velocity: Vec2,
        rotation: f32,
        variant: UfoVariant,
        cause: UfoDestroyCause,
    },
    UfoWarpedOut {
        id: EntityId,
        position: Vec2,
        rotation: f32,
        duration: f32,
    },
    LaserExpired { id: EntityId },
    PlayerDestroyed {
        position: Vec2,
        cause: PlayerDeathCause,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_player_shots_feed_revenge() {
        assert!(UfoDestroyCause::PlayerShot.credited_to_player());
        assert!(!UfoDestroyCause::Player.credited_to_player());
        assert!(!UfoDestroyCause::Asteroid.credited_to_player());
    }

    #[test]
    fn test_events_serialize() {
        let event = GameEvent::AsteroidShot {
            tier: SizeTier::Big,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("AsteroidShot"));
        assert!(json.contains("Big"));
    }
}
