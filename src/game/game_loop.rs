//! Fixed-step simulation driver
//!
//! Each tick runs in a fixed order:
//! 1. due timers (attack arming, launches, warp-outs, laser expiry)
//! 2. integration
//! 3. wrapping and on-screen transitions
//! 4. contact detection
//! 5. UFO steering and firing
//! 6. contact handling
//!
//! Events produced along the way are returned from [`GameLoop::tick`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::game::events::GameEvent;
use crate::game::schedule::{Due, TimerKey};
use crate::game::state::{ArenaState, EntityId, Player, SizeTier};
use crate::game::systems::collision::{self, Contact};
use crate::game::systems::ufo::{self, FlightContext};
use crate::game::systems::{arena, asteroids, physics, projectile, ufo_lifecycle};
use crate::util::geometry::ArenaBounds;
use crate::util::vec2::Vec2;

/// Owns the arena, the tuning and the random source for one session
pub struct GameLoop {
    state: ArenaState,
    config: Arc<GameConfig>,
    rng: StdRng,
    last_contacts: usize,
}

impl GameLoop {
    pub fn new(config: Arc<GameConfig>, bounds: ArenaBounds, seed: u64) -> Self {
        Self {
            state: ArenaState::new(bounds),
            config,
            rng: StdRng::seed_from_u64(seed),
            last_contacts: 0,
        }
    }

    pub fn state(&self) -> &ArenaState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ArenaState {
        &mut self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Contacts found during the last tick, before dispatch
    pub fn last_contacts(&self) -> usize {
        self.last_contacts
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        for due in self.state.scheduler.advance(dt) {
            self.fire_timer(due);
        }

        physics::update(&mut self.state, dt);
        arena::update(&mut self.state);

        let contacts = collision::detect_contacts(&self.state);
        self.last_contacts = contacts.len();

        self.fly_ufos();
        self.handle_contacts(&contacts);

        self.state.tick += 1;
        self.state.drain_events()
    }

    fn fire_timer(&mut self, due: Due) {
        match due.key {
            TimerKey::EnableAttack => ufo_lifecycle::enable_attack(&mut self.state, due.owner),
            TimerKey::Launch => {
                ufo_lifecycle::launch_ufo(&mut self.state, &mut self.rng, due.owner);
            }
            TimerKey::WarpOut => {
                ufo_lifecycle::warp_out(&mut self.state, due.owner);
            }
            TimerKey::Expire => {
                projectile::expire(&mut self.state, due.owner);
            }
        }
    }

    fn fly_ufos(&mut self) {
        let hazards = ufo::hazards(&self.state, &self.config);
        let ctx = FlightContext {
            bounds: self.state.bounds,
            hazards: &hazards,
        };

        let mut requests = Vec::new();
        for u in &mut self.state.ufos {
            let outcome = ufo::fly(u, &ctx, &self.config, &mut self.rng);
            if outcome.enable_attack_after.is_some() || outcome.laser.is_some() {
                requests.push((u.id, outcome));
            }
        }

        for (id, outcome) in requests {
            if let Some(delay) = outcome.enable_attack_after {
                self.state.scheduler.schedule(id, TimerKey::EnableAttack, delay);
            }
            if let Some(laser) = outcome.laser {
                projectile::fire_ufo_laser(&mut self.state, id, &laser);
            }
        }
    }

    fn handle_contacts(&mut self, contacts: &[Contact]) {
        for contact in contacts {
            collision::dispatch(&mut self.state, &self.config, &mut self.rng, contact);
        }
    }

    pub fn spawn_asteroid(&mut self, tier: SizeTier) -> EntityId {
        asteroids::spawn(&mut self.state, &self.config, &mut self.rng, tier)
    }

    pub fn spawn_wave(&mut self, count: usize, tier: SizeTier) -> Vec<EntityId> {
        asteroids::spawn_wave(&mut self.state, &self.config, &mut self.rng, count, tier)
    }

    pub fn spawn_ufo(&mut self) -> EntityId {
        ufo_lifecycle::spawn_ufo(&mut self.state, &self.config, &mut self.rng)
    }

    /// Send every UFO away, e.g. after the player died. Returns the longest delay.
    pub fn warp_out_ufos(&mut self) -> f32 {
        ufo_lifecycle::warp_out_ufos(&mut self.state, &mut self.rng)
    }

    /// Place the ship, replacing any existing one
    pub fn spawn_player(&mut self, position: Vec2) {
        self.state.player = Some(Player::new(position));
    }

    /// Externally driven ship motion. Ignored without a ship.
    pub fn set_player_motion(&mut self, velocity: Vec2, rotation: f32) {
        if let Some(player) = &mut self.state.player {
            player.velocity = velocity;
            player.rotation = rotation;
        }
    }

    pub fn fire_player_laser(&mut self) -> Option<EntityId> {
        projectile::fire_player_laser(&mut self.state)
    }

    /// Drop every asteroid without announcing a wave clear
    pub fn remove_all_asteroids(&mut self) {
        asteroids::clear_all(&mut self.state);
    }

    /// Start over: every body and timer goes, the revenge count resets
    pub fn new_game(&mut self) {
        self.remove_all_asteroids();
        self.state.ufos.clear();
        self.state.lasers.clear();
        self.state.player = None;
        self.state.scheduler.clear();
        self.state.ufos_killed_by_player = 0;
        self.state.drain_events();
        tracing::info!("New game");
    }
}
