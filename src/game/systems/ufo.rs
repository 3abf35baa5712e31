//! UFO agent behavior
//!
//! Each tick a flying UFO:
//! 1. arms its first-shot timer the first time it is seen on screen
//! 2. occasionally re-rolls its cruise speed and reverses its spin
//! 3. sums a potential field over nearby hazards (repulsion from everything,
//!    attraction to the player for kamikazes) into `force`
//! 4. nudges its speed toward the cruise speed and clamps to the variant max
//! 5. picks a target, biased toward the player
//! 6. fires along a lead-predicted, jittered angle when its gun is armed
//!
//! `fly` never touches the arena directly. Timers and shots come back in a
//! `FlightOutcome` for the host to apply.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::config::GameConfig;
use crate::game::constants::{category, ufo::*};
use crate::game::state::{ArenaState, EntityId, Gunnery, Homing, Ufo, UfoBehavior, UfoVariant};
use crate::game::systems::targeting;
use crate::util::geometry::{wrapped_delta, ArenaBounds, WRAP_HYSTERESIS};
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HazardKind {
    Asteroid,
    Ufo,
    Player,
    PlayerShot,
}

/// Read-only view of something a UFO reacts to
#[derive(Debug, Clone, Copy)]
pub struct Hazard {
    pub id: EntityId,
    pub kind: HazardKind,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Clearance radius (half the sprite diagonal)
    pub radius: f32,
}

/// What the UFOs can see this tick
#[derive(Debug, Clone, Copy)]
pub struct FlightContext<'a> {
    pub bounds: ArenaBounds,
    pub hazards: &'a [Hazard],
}

impl FlightContext<'_> {
    fn player(&self) -> Option<&Hazard> {
        self.hazards.iter().find(|h| h.kind == HazardKind::Player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaserRequest {
    pub angle: f32,
    pub position: Vec2,
    pub speed: f32,
}

/// Deferred effects of one `fly` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightOutcome {
    /// Arm the gun (or homing) after this many seconds
    pub enable_attack_after: Option<f32>,
    pub laser: Option<LaserRequest>,
}

/// Difficulty escalation once the player has killed more than a few UFOs
pub fn revenge_factor(brothers_killed: u32) -> u32 {
    brothers_killed.saturating_sub(REVENGE_THRESHOLD)
}

/// Pick a variant from `ufo_chances`, falling back to `small_ufo_chance`
pub fn choose_variant(config: &GameConfig, rng: &mut impl Rng) -> UfoVariant {
    match WeightedIndex::new(config.ufo_chances) {
        Ok(weights) => match weights.sample(rng) {
            0 => UfoVariant::Small,
            1 => UfoVariant::BigPatrol,
            _ => UfoVariant::BigKamikaze,
        },
        Err(_) => {
            if rng.gen::<f32>() >= config.small_ufo_chance {
                UfoVariant::BigPatrol
            } else {
                UfoVariant::Small
            }
        }
    }
}

impl Ufo {
    /// A parked, inactive UFO with revenge scaling applied
    pub fn new(
        id: EntityId,
        variant: UfoVariant,
        brothers_killed: u32,
        config: &GameConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let index = variant.config_index();
        let max_speed = config.ufo_max_speed[index];
        let current_speed = rng.gen_range(CRUISE_SPEED_MIN_FRACTION * max_speed..=max_speed);

        let revenge = revenge_factor(brothers_killed) as i32;
        let shot_scale = REVENGE_SHOT_BASE.powi(revenge);
        let mean_shot_time = config.ufo_mean_shot_time[index] * shot_scale;
        let first_shot_delay = rng.gen_range(0.0..=mean_shot_time * shot_scale);

        let behavior = if variant.is_kamikaze() {
            UfoBehavior::Kamikaze(Homing {
                acceleration: config.kamikaze_acceleration * REVENGE_HOMING_BASE.powi(revenge),
            })
        } else {
            UfoBehavior::Gunner(Gunnery {
                shot_speed: config.ufo_shot_speed[index],
                mean_shot_time,
                accuracy: config.ufo_accuracy[index] * shot_scale,
                shots_fired: 0,
            })
        };

        Self {
            id,
            variant,
            behavior,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            angular_velocity: SPIN,
            force: Vec2::ZERO,
            on_screen: false,
            dynamic: false,
            current_speed,
            max_speed,
            first_shot_delay: Some(first_shot_delay),
            attack_enabled: false,
            brothers_killed,
        }
    }
}

/// Snapshot of the on-screen bodies UFOs react to. Player shots are only
/// included when shot anticipation is on.
pub fn hazards(state: &ArenaState, config: &GameConfig) -> Vec<Hazard> {
    let include_shots = config.ufo_shot_anticipation > 0.0;
    state
        .bodies()
        .into_iter()
        .filter(|b| b.on_screen())
        .filter_map(|b| {
            let kind = match b.kind() {
                category::ASTEROID => HazardKind::Asteroid,
                category::UFO => HazardKind::Ufo,
                category::PLAYER => HazardKind::Player,
                category::PLAYER_SHOT if include_shots => HazardKind::PlayerShot,
                _ => return None,
            };
            Some(Hazard {
                id: b.id,
                kind,
                position: b.position,
                velocity: b.velocity,
                radius: b.clearance_radius,
            })
        })
        .collect()
}

/// Repulsion falloff distance. Stays above `CLEARANCE_FLOOR / 2` however much
/// the bodies overlap.
#[inline]
fn limited_clearance(clearance: f32) -> f32 {
    let d = clearance - CLEARANCE_FLOOR;
    0.5 * ((d * d + CLEARANCE_FLOOR).sqrt() + clearance)
}

/// Run one tick of UFO behavior
pub fn fly(
    ufo: &mut Ufo,
    ctx: &FlightContext<'_>,
    config: &GameConfig,
    rng: &mut impl Rng,
) -> FlightOutcome {
    let mut outcome = FlightOutcome::default();
    if !ufo.dynamic || !ufo.on_screen {
        return outcome;
    }

    if let Some(delay) = ufo.first_shot_delay.take() {
        outcome.enable_attack_after = Some(delay);
    }

    if rng.gen_range(0..=JITTER_ROLL_MAX) == 0 {
        if !ufo.is_kamikaze() {
            ufo.current_speed =
                rng.gen_range(JITTER_SPEED_MIN_FRACTION * ufo.max_speed..=ufo.max_speed);
        }
        ufo.angular_velocity = SPIN.copysign(-ufo.angular_velocity);
    }

    let bounds = ctx.bounds;
    let our_radius = ufo.clearance_radius();
    let force_scale = config.ufo_dodging * FORCE_SCALE;
    let anticipation = config.ufo_shot_anticipation;
    let interesting_distance = INTERESTING_DISTANCE_FRACTION * bounds.min_dimension();
    let homing = match &ufo.behavior {
        UfoBehavior::Kamikaze(h) if ufo.attack_enabled => Some(h.acceleration * FORCE_SCALE),
        _ => None,
    };

    let player = ctx.player();
    let mut target = player;
    let mut target_distance = f32::INFINITY;
    let mut player_distance = f32::INFINITY;
    let mut total_force = Vec2::ZERO;

    for hazard in ctx.hazards {
        if hazard.id == ufo.id {
            continue;
        }
        if hazard.kind == HazardKind::PlayerShot && anticipation <= 0.0 {
            continue;
        }

        let mut r = wrapped_delta(ufo.position, hazard.position, &bounds);
        debug_assert!(
            r.x.abs() <= 0.5 * bounds.width + WRAP_HYSTERESIS
                && r.y.abs() <= 0.5 * bounds.height + WRAP_HYSTERESIS,
            "wrapped displacement {:?} out of range",
            r
        );

        if hazard.kind == HazardKind::PlayerShot {
            let along = hazard.velocity.normalize();
            r -= r.project_onto(along) * anticipation;
        }
        let d = r.length();

        if ufo.is_kamikaze() && hazard.kind == HazardKind::Player {
            if let Some(strength) = homing {
                if d > 0.0 {
                    total_force += r * (strength / d);
                }
            }
            continue;
        }

        if d > interesting_distance {
            continue;
        }
        if hazard.kind == HazardKind::Player {
            player_distance = d;
        }
        if hazard.kind != HazardKind::Ufo && d < target_distance {
            target = Some(hazard);
            target_distance = d;
        }

        let dlim = limited_clearance(d - (our_radius + hazard.radius));
        total_force += r * (-force_scale / (dlim * dlim));
    }
    ufo.force += total_force;

    if !ufo.is_kamikaze() {
        let speed = ufo.velocity.length();
        if speed > ufo.current_speed {
            ufo.velocity *= SPEED_NUDGE_DOWN;
        } else if speed < ufo.current_speed {
            ufo.velocity *= SPEED_NUDGE_UP;
        }
    }
    ufo.velocity = ufo.velocity.clamp_length(ufo.max_speed);

    let UfoBehavior::Gunner(gunnery) = &mut ufo.behavior else {
        return outcome;
    };

    if player_distance < PLAYER_PREFERENCE_RATIO * target_distance
        || (player.is_some() && rng.gen_range(0..100) >= PLAYER_BIAS_ROLL)
    {
        target = player;
    }

    let Some(target) = target else {
        return outcome;
    };
    if !ufo.attack_enabled {
        return outcome;
    }

    let p = if config.ufo_shot_wrapping {
        wrapped_delta(ufo.position, target.position, &bounds)
    } else {
        target.position - ufo.position
    };
    let Some(mut angle) = targeting::firing_angle(p, target.velocity, gunnery.shot_speed) else {
        return outcome;
    };

    let spread = if target.kind == HazardKind::Player {
        gunnery.accuracy * std::f32::consts::PI
    } else {
        NON_PLAYER_JITTER * gunnery.accuracy * std::f32::consts::PI
    };
    angle += rng.gen_range(-spread..=spread);

    gunnery.accuracy *= ACCURACY_TRAINING;
    gunnery.shots_fired += 1;
    ufo.attack_enabled = false;

    outcome.laser = Some(LaserRequest {
        angle,
        position: ufo.position + Vec2::from_angle(angle) * (0.5 * ufo.variant.diameter()),
        speed: gunnery.shot_speed,
    });
    outcome.enable_attack_after =
        Some(rng.gen_range(REARM_MIN..=REARM_MAX) * gunnery.mean_shot_time);
    outcome
}
