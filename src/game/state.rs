//! Arena state definitions
//!
//! Contains every live body (asteroids, UFOs, lasers, the player ship), the
//! arena bounds, the timer list and the pending side-effect events.

use std::f32::consts::SQRT_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::{asteroid, category, laser, player, ufo};
use crate::game::events::GameEvent;
use crate::game::schedule::Scheduler;
use crate::util::geometry::ArenaBounds;
use crate::util::vec2::Vec2;

/// Entity identifier, unique across every kind of body
pub type EntityId = u64;

/// Reserved id of the player ship
pub const PLAYER_ID: EntityId = 0;

// ============================================================================
// Asteroids
// ============================================================================

/// Asteroid size classes, ordered smallest to largest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeTier {
    Small,
    Medium,
    Big,
    Huge,
}

impl SizeTier {
    pub const ALL: [SizeTier; 4] = [
        SizeTier::Small,
        SizeTier::Medium,
        SizeTier::Big,
        SizeTier::Huge,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn diameter(self) -> f32 {
        asteroid::DIAMETERS[self.index()]
    }

    /// Collision radius
    pub fn radius(self) -> f32 {
        0.5 * self.diameter()
    }

    /// Half the sprite diagonal, used for clearance checks
    pub fn clearance_radius(self) -> f32 {
        0.5 * self.diameter() * SQRT_2
    }

    pub fn name(self) -> &'static str {
        match self {
            SizeTier::Small => "small",
            SizeTier::Medium => "med",
            SizeTier::Big => "big",
            SizeTier::Huge => "huge",
        }
    }

    /// Only the two largest tiers break into children
    pub fn splits(self) -> bool {
        self >= SizeTier::Big
    }

    pub fn smaller(self) -> Option<SizeTier> {
        match self {
            SizeTier::Small => None,
            SizeTier::Medium => Some(SizeTier::Small),
            SizeTier::Big => Some(SizeTier::Medium),
            SizeTier::Huge => Some(SizeTier::Big),
        }
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asteroid size tier '{0}'")]
pub struct UnknownSizeTier(pub String);

impl FromStr for SizeTier {
    type Err = UnknownSizeTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(SizeTier::Small),
            "med" | "medium" => Ok(SizeTier::Medium),
            "big" => Ok(SizeTier::Big),
            "huge" => Ok(SizeTier::Huge),
            _ => Err(UnknownSizeTier(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: EntityId,
    pub tier: SizeTier,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    /// False until the whole body has entered the visible arena
    pub on_screen: bool,
}

impl Asteroid {
    pub fn radius(&self) -> f32 {
        self.tier.radius()
    }

    pub fn category(&self) -> u32 {
        category::with_visibility(category::ASTEROID, self.on_screen)
    }
}

// ============================================================================
// UFOs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UfoVariant {
    Small,
    BigPatrol,
    BigKamikaze,
}

impl UfoVariant {
    pub fn is_big(self) -> bool {
        !matches!(self, UfoVariant::Small)
    }

    pub fn is_kamikaze(self) -> bool {
        matches!(self, UfoVariant::BigKamikaze)
    }

    /// Index into the `[big, small]` pairs of `GameConfig`
    pub fn config_index(self) -> usize {
        if self.is_big() {
            0
        } else {
            1
        }
    }

    pub fn diameter(self) -> f32 {
        if self.is_big() {
            ufo::BIG_DIAMETER
        } else {
            ufo::SMALL_DIAMETER
        }
    }

    pub fn radius(self) -> f32 {
        0.5 * self.diameter()
    }

    /// Half the sprite diagonal
    pub fn clearance_radius(self) -> f32 {
        0.5 * self.diameter() * SQRT_2
    }

    pub fn mass(self) -> f32 {
        if self.is_big() {
            ufo::BIG_MASS
        } else {
            ufo::SMALL_MASS
        }
    }
}

/// Shooting parameters of small and patrol UFOs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gunnery {
    pub shot_speed: f32,
    pub mean_shot_time: f32,
    /// Aim jitter scale; shrinks by `ACCURACY_TRAINING` after every shot
    pub accuracy: f32,
    pub shots_fired: u32,
}

/// Homing parameters of kamikaze UFOs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Homing {
    pub acceleration: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UfoBehavior {
    Gunner(Gunnery),
    Kamikaze(Homing),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ufo {
    pub id: EntityId,
    pub variant: UfoVariant,
    pub behavior: UfoBehavior,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
    /// Force accumulated this tick, consumed by the next physics step
    pub force: Vec2,
    pub on_screen: bool,
    /// False while parked waiting for launch
    pub dynamic: bool,
    pub current_speed: f32,
    pub max_speed: f32,
    /// Pending until the UFO first appears on screen
    pub first_shot_delay: Option<f32>,
    pub attack_enabled: bool,
    pub brothers_killed: u32,
}

impl Ufo {
    pub fn radius(&self) -> f32 {
        self.variant.radius()
    }

    pub fn clearance_radius(&self) -> f32 {
        self.variant.clearance_radius()
    }

    pub fn mass(&self) -> f32 {
        self.variant.mass()
    }

    pub fn category(&self) -> u32 {
        category::with_visibility(category::UFO, self.on_screen)
    }

    pub fn is_kamikaze(&self) -> bool {
        matches!(self.behavior, UfoBehavior::Kamikaze(_))
    }

    pub fn gunnery(&self) -> Option<&Gunnery> {
        match &self.behavior {
            UfoBehavior::Gunner(g) => Some(g),
            UfoBehavior::Kamikaze(_) => None,
        }
    }
}

// ============================================================================
// Lasers and the player
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOwner {
    Player,
    Ufo(EntityId),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Laser {
    pub id: EntityId,
    pub owner: ShotOwner,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
}

impl Laser {
    pub fn radius(&self) -> f32 {
        laser::RADIUS
    }

    pub fn category(&self) -> u32 {
        match self.owner {
            ShotOwner::Player => category::PLAYER_SHOT,
            ShotOwner::Ufo(_) => category::UFO_SHOT,
        }
    }
}

/// Player ship body. Steering is external; the arena only integrates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            rotation: 0.5 * std::f32::consts::PI,
        }
    }

    pub fn radius(&self) -> f32 {
        player::RADIUS
    }
}

/// Uniform view of any live body for contact and hazard queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub id: EntityId,
    pub category: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub clearance_radius: f32,
}

impl Body {
    pub fn kind(&self) -> u32 {
        category::kind(self.category)
    }

    pub fn on_screen(&self) -> bool {
        self.category & category::OFF_SCREEN == 0
    }
}

// ============================================================================
// Arena state
// ============================================================================

#[derive(Debug)]
pub struct ArenaState {
    pub bounds: ArenaBounds,
    pub tick: u64,
    /// Kept in insertion order so seeded runs iterate identically
    pub asteroids: Vec<Asteroid>,
    pub ufos: Vec<Ufo>,
    pub lasers: Vec<Laser>,
    pub player: Option<Player>,
    pub scheduler: Scheduler,
    /// UFOs destroyed by player shots this game; drives revenge scaling
    pub ufos_killed_by_player: u32,
    events: Vec<GameEvent>,
    next_entity_id: EntityId,
}

impl ArenaState {
    pub fn new(bounds: ArenaBounds) -> Self {
        Self {
            bounds,
            tick: 0,
            asteroids: Vec::new(),
            ufos: Vec::new(),
            lasers: Vec::new(),
            player: None,
            scheduler: Scheduler::new(),
            ufos_killed_by_player: 0,
            events: Vec::new(),
            next_entity_id: PLAYER_ID + 1,
        }
    }

    /// Generate a new unique entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        id
    }

    /// Seconds of simulated time
    pub fn elapsed(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn asteroid(&self, id: EntityId) -> Option<&Asteroid> {
        self.asteroids.iter().find(|a| a.id == id)
    }

    pub fn asteroid_mut(&mut self, id: EntityId) -> Option<&mut Asteroid> {
        self.asteroids.iter_mut().find(|a| a.id == id)
    }

    pub fn ufo(&self, id: EntityId) -> Option<&Ufo> {
        self.ufos.iter().find(|u| u.id == id)
    }

    pub fn ufo_mut(&mut self, id: EntityId) -> Option<&mut Ufo> {
        self.ufos.iter_mut().find(|u| u.id == id)
    }

    pub fn laser(&self, id: EntityId) -> Option<&Laser> {
        self.lasers.iter().find(|l| l.id == id)
    }

    /// Whether `id` still refers to a live body
    pub fn is_attached(&self, id: EntityId) -> bool {
        if id == PLAYER_ID {
            return self.player.is_some();
        }
        self.asteroid(id).is_some() || self.ufo(id).is_some() || self.laser(id).is_some()
    }

    /// Detach an asteroid and drop its timers
    pub fn take_asteroid(&mut self, id: EntityId) -> Option<Asteroid> {
        let index = self.asteroids.iter().position(|a| a.id == id)?;
        self.scheduler.cancel_owner(id);
        Some(self.asteroids.remove(index))
    }

    /// Detach a UFO and drop its timers
    pub fn take_ufo(&mut self, id: EntityId) -> Option<Ufo> {
        let index = self.ufos.iter().position(|u| u.id == id)?;
        self.scheduler.cancel_owner(id);
        Some(self.ufos.remove(index))
    }

    /// Detach a laser and drop its expiry timer
    pub fn take_laser(&mut self, id: EntityId) -> Option<Laser> {
        let index = self.lasers.iter().position(|l| l.id == id)?;
        self.scheduler.cancel_owner(id);
        Some(self.lasers.remove(index))
    }

    pub fn take_player(&mut self) -> Option<Player> {
        self.scheduler.cancel_owner(PLAYER_ID);
        self.player.take()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Snapshot of every live body, including off-screen ones
    pub fn bodies(&self) -> Vec<Body> {
        let mut bodies =
            Vec::with_capacity(self.asteroids.len() + self.ufos.len() + self.lasers.len() + 1);
        if let Some(p) = &self.player {
            bodies.push(Body {
                id: PLAYER_ID,
                category: category::PLAYER,
                position: p.position,
                velocity: p.velocity,
                radius: p.radius(),
                clearance_radius: player::CLEARANCE_RADIUS,
            });
        }
        bodies.extend(self.asteroids.iter().map(|a| Body {
            id: a.id,
            category: a.category(),
            position: a.position,
            velocity: a.velocity,
            radius: a.radius(),
            clearance_radius: a.tier.clearance_radius(),
        }));
        bodies.extend(self.ufos.iter().map(|u| Body {
            id: u.id,
            category: u.category(),
            position: u.position,
            velocity: u.velocity,
            radius: u.radius(),
            clearance_radius: u.clearance_radius(),
        }));
        bodies.extend(self.lasers.iter().map(|l| Body {
            id: l.id,
            category: l.category(),
            position: l.position,
            velocity: l.velocity,
            radius: l.radius(),
            clearance_radius: l.radius(),
        }));
        bodies
    }

    pub fn asteroid_count(&self, tier: SizeTier) -> usize {
        self.asteroids.iter().filter(|a| a.tier == tier).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::schedule::TimerKey;

    fn create_test_state() -> ArenaState {
        ArenaState::new(ArenaBounds::new(1024.0, 768.0))
    }

    fn test_asteroid(id: EntityId, tier: SizeTier) -> Asteroid {
        Asteroid {
            id,
            tier,
            position: Vec2::ZERO,
            velocity: Vec2::new(10.0, 0.0),
            rotation: 0.0,
            angular_velocity: 0.0,
            on_screen: true,
        }
    }

    #[test]
    fn test_size_tier_order_and_split() {
        assert!(SizeTier::Small < SizeTier::Medium);
        assert!(SizeTier::Big < SizeTier::Huge);
        assert!(!SizeTier::Small.splits());
        assert!(!SizeTier::Medium.splits());
        assert!(SizeTier::Big.splits());
        assert!(SizeTier::Huge.splits());
        assert_eq!(SizeTier::Huge.smaller(), Some(SizeTier::Big));
        assert_eq!(SizeTier::Small.smaller(), None);
    }

    #[test]
    fn test_size_tier_parse() {
        assert_eq!("huge".parse::<SizeTier>(), Ok(SizeTier::Huge));
        assert_eq!("med".parse::<SizeTier>(), Ok(SizeTier::Medium));
        assert_eq!(" Medium ".parse::<SizeTier>(), Ok(SizeTier::Medium));
        assert_eq!(
            "gigantic".parse::<SizeTier>(),
            Err(UnknownSizeTier("gigantic".to_string()))
        );
        for tier in SizeTier::ALL {
            assert_eq!(tier.to_string().parse::<SizeTier>(), Ok(tier));
        }
    }

    #[test]
    fn test_radii() {
        assert!((SizeTier::Huge.radius() - 60.0).abs() < 1e-5);
        assert!(SizeTier::Big.clearance_radius() > SizeTier::Big.radius());
        assert!(UfoVariant::BigPatrol.radius() > UfoVariant::Small.radius());
        assert_eq!(UfoVariant::Small.config_index(), 1);
        assert_eq!(UfoVariant::BigKamikaze.config_index(), 0);
    }

    #[test]
    fn test_entity_ids_skip_player() {
        let mut state = create_test_state();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, PLAYER_ID);
        assert_eq!(b, a + 1);
    }

    #[test]
    fn test_take_asteroid_cancels_timers() {
        let mut state = create_test_state();
        let id = state.next_entity_id();
        state.asteroids.push(test_asteroid(id, SizeTier::Big));
        state.scheduler.schedule(id, TimerKey::Expire, 1.0);

        assert!(state.is_attached(id));
        assert!(state.take_asteroid(id).is_some());
        assert!(!state.is_attached(id));
        assert!(state.scheduler.is_empty());
        assert!(state.take_asteroid(id).is_none());
    }

    #[test]
    fn test_bodies_mark_off_screen() {
        let mut state = create_test_state();
        let mut hidden = test_asteroid(state.next_entity_id(), SizeTier::Small);
        hidden.on_screen = false;
        state.asteroids.push(hidden);
        state.player = Some(Player::new(Vec2::ZERO));

        let bodies = state.bodies();
        assert_eq!(bodies.len(), 2);
        assert!(bodies.iter().any(|b| b.id == PLAYER_ID && b.on_screen()));
        assert!(bodies
            .iter()
            .any(|b| b.kind() == category::ASTEROID && !b.on_screen()));
    }

    #[test]
    fn test_drain_events() {
        let mut state = create_test_state();
        state.push_event(GameEvent::WaveCleared);
        assert_eq!(state.pending_events().len(), 1);
        assert_eq!(state.drain_events(), vec![GameEvent::WaveCleared]);
        assert!(state.drain_events().is_empty());
    }
}
