/// Physics constants
pub mod physics {
    /// Simulation tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Delta time per tick in seconds
    pub const DT: f32 = 1.0 / 60.0;
    /// Tick duration in milliseconds
    pub const TICK_DURATION_MS: u64 = 1000 / TICK_RATE as u64;
    /// Arena units per physics meter. Forces are expressed in newtons on bodies
    /// measured in meters, while positions and velocities are in arena units.
    pub const POINTS_PER_METER: f32 = 150.0;
}

/// Category bitmasks used to classify bodies for contact dispatch
pub mod category {
    pub const PLAYER: u32 = 1;
    pub const PLAYER_SHOT: u32 = 1 << 1;
    pub const ASTEROID: u32 = 1 << 2;
    pub const UFO: u32 = 1 << 3;
    pub const UFO_SHOT: u32 = 1 << 4;
    /// Set while a body has not yet entered the visible arena
    pub const OFF_SCREEN: u32 = 1 << 15;

    /// Strip the off-screen marker, leaving only the object kind
    #[inline]
    pub const fn kind(mask: u32) -> u32 {
        mask & !OFF_SCREEN
    }

    #[inline]
    pub const fn with_visibility(kind: u32, on_screen: bool) -> u32 {
        if on_screen {
            kind
        } else {
            kind | OFF_SCREEN
        }
    }

    /// Which kinds each kind wants contact reports for
    pub const fn contact_test(kind: u32) -> u32 {
        match kind {
            PLAYER => ASTEROID | UFO | UFO_SHOT,
            PLAYER_SHOT => ASTEROID | UFO,
            ASTEROID => PLAYER | PLAYER_SHOT | UFO | UFO_SHOT,
            UFO => ASTEROID | PLAYER | PLAYER_SHOT,
            UFO_SHOT => ASTEROID | PLAYER,
            _ => 0,
        }
    }
}

/// Asteroid spawning and splitting
pub mod asteroid {
    use std::f32::consts::PI;

    /// Sprite diameters per size tier, smallest first
    pub const DIAMETERS: [f32; 4] = [28.0, 43.0, 96.0, 120.0];
    /// Spawn offset is drawn within this fraction of the arena
    pub const SPAWN_OFFSET_FRACTION: f32 = 0.75;
    /// Initial spawn distance range as a fraction of arena height
    pub const SPAWN_DISTANCE_MIN: f32 = 0.25;
    pub const SPAWN_DISTANCE_MAX: f32 = 0.5;
    /// Growth factor applied while the spawn point is still too close
    pub const SPAWN_DISTANCE_GROWTH: f32 = 1.5;
    /// Upper bound on distance extensions before taking the last candidate
    pub const MAX_SPAWN_EXTENSIONS: u32 = 32;
    /// Exclusion margin bounds: `[max(lo_scale·speed, lo_floor), max(hi_scale·speed, hi_floor)]`
    pub const EXCLUSION_LO_SCALE: f32 = 1.25;
    pub const EXCLUSION_LO_FLOOR: f32 = 50.0;
    pub const EXCLUSION_HI_SCALE: f32 = 5.0;
    pub const EXCLUSION_HI_FLOOR: f32 = 200.0;
    /// Angular spread of the first child's heading around the parent's
    pub const SPLIT_ANGLE_SPREAD: f32 = 0.4 * PI;
    /// Range of the random scale on the first child's projected velocity
    pub const SPLIT_SCALE_MIN: f32 = 0.75;
    pub const SPLIT_SCALE_MAX: f32 = 1.25;
    /// Asteroid spin range is `[-MAX_SPIN, MAX_SPIN]`
    pub const MAX_SPIN: f32 = PI;
}

/// UFO agent tuning that is not exposed through `GameConfig`
pub mod ufo {
    use std::f32::consts::PI;

    /// Sprite diameters
    pub const BIG_DIAMETER: f32 = 60.0;
    pub const SMALL_DIAMETER: f32 = 45.0;
    /// Physics body masses
    pub const BIG_MASS: f32 = 1.0;
    pub const SMALL_MASS: f32 = 0.75;
    /// Spin magnitude (radians/s)
    pub const SPIN: f32 = 2.0 * PI;

    /// Heading jitter fires when a roll in `0..=JITTER_ROLL_MAX` is zero
    pub const JITTER_ROLL_MAX: u32 = 100;
    /// Re-rolled cruise speed lower bound as a fraction of max speed
    pub const JITTER_SPEED_MIN_FRACTION: f32 = 0.3;
    /// Initial cruise speed lower bound as a fraction of max speed
    pub const CRUISE_SPEED_MIN_FRACTION: f32 = 0.5;

    /// Hazards farther than this fraction of the smaller arena dimension are ignored
    pub const INTERESTING_DISTANCE_FRACTION: f32 = 0.33;
    /// `ufo_dodging` and `kamikaze_acceleration` are scaled by this into newtons
    pub const FORCE_SCALE: f32 = 1000.0;
    /// Clearance floor for the repulsion falloff
    pub const CLEARANCE_FLOOR: f32 = 20.0;

    pub const SPEED_NUDGE_DOWN: f32 = 0.95;
    pub const SPEED_NUDGE_UP: f32 = 1.05;

    /// The player wins target selection when within this multiple of the nearest hazard
    pub const PLAYER_PREFERENCE_RATIO: f32 = 1.5;
    /// Rolls in `0..100` at or above this pick the player regardless of distance
    pub const PLAYER_BIAS_ROLL: u32 = 25;
    /// Aim jitter scale when shooting at something other than the player
    pub const NON_PLAYER_JITTER: f32 = 0.1;
    /// Accuracy multiplier applied after every shot
    pub const ACCURACY_TRAINING: f32 = 0.97;
    /// Re-arm delay range as a multiple of the mean shot time
    pub const REARM_MIN: f32 = 0.5;
    pub const REARM_MAX: f32 = 1.5;

    /// Kills tolerated before revenge scaling starts
    pub const REVENGE_THRESHOLD: u32 = 3;
    /// Base for shot interval, first-shot delay and accuracy scaling
    pub const REVENGE_SHOT_BASE: f32 = 0.75;
    /// Base for kamikaze homing acceleration scaling
    pub const REVENGE_HOMING_BASE: f32 = 1.25;

    /// Parked x offset beyond the arena edge, in sprite diagonals
    pub const PARK_OFFSET_DIAGONALS: f32 = 0.6;
    /// Parked y, far away from anything that could collide before launch
    pub const PARK_Y: f32 = -1.0e9;
    /// Seconds between spawn and launch
    pub const LAUNCH_DELAY: f32 = 1.0;
    /// Candidate launch heights tried
    pub const LAUNCH_ATTEMPTS: u32 = 10;
    /// Launch heights are drawn within this fraction of the arena height
    pub const LAUNCH_HEIGHT_FRACTION: f32 = 0.9;
    /// Launch search stops once clearance exceeds this many UFO radii
    pub const LAUNCH_CLEARANCE_RADII: f32 = 5.0;

    /// Warp-out delay range after the player dies
    pub const WARP_DELAY_MIN: f32 = 0.5;
    pub const WARP_DELAY_MAX: f32 = 1.5;
    /// Duration of the warp-out effect
    pub const WARP_TIME: f32 = 0.5;
}

/// Lasers fired by the player and UFOs
pub mod laser {
    /// Collision radius
    pub const RADIUS: f32 = 3.0;
    /// Lifetime covers this fraction of an arena-height traversal
    pub const LIFETIME_HEIGHT_FRACTION: f32 = 0.9;
    /// Player shot speed
    pub const PLAYER_SHOT_SPEED: f32 = 750.0;
}

/// Player ship body
pub mod player {
    pub const DIAMETER: f32 = 36.0;
    pub const RADIUS: f32 = DIAMETER / 2.0;
    /// Radius used when UFOs measure clearance to the ship (half the sprite diagonal)
    pub const CLEARANCE_RADIUS: f32 = DIAMETER * std::f32::consts::FRAC_1_SQRT_2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_distinct_bits() {
        let all = [
            category::PLAYER,
            category::PLAYER_SHOT,
            category::ASTEROID,
            category::UFO,
            category::UFO_SHOT,
            category::OFF_SCREEN,
        ];
        for (i, a) in all.iter().enumerate() {
            assert_eq!(a.count_ones(), 1);
            for b in &all[i + 1..] {
                assert_eq!(a & b, 0);
            }
        }
        assert_eq!(category::OFF_SCREEN, 32768);
    }

    #[test]
    fn test_visibility_round_trip() {
        let hidden = category::with_visibility(category::UFO, false);
        assert_ne!(hidden & category::OFF_SCREEN, 0);
        assert_eq!(category::kind(hidden), category::UFO);
        assert_eq!(category::with_visibility(category::UFO, true), category::UFO);
    }

    #[test]
    fn test_contact_tests_are_symmetric() {
        let kinds = [
            category::PLAYER,
            category::PLAYER_SHOT,
            category::ASTEROID,
            category::UFO,
            category::UFO_SHOT,
        ];
        for &a in &kinds {
            for &b in &kinds {
                let ab = category::contact_test(a) & b != 0;
                let ba = category::contact_test(b) & a != 0;
                assert_eq!(ab, ba, "asymmetric contact test for {a} / {b}");
            }
        }
    }

    #[test]
    fn test_tick_duration() {
        assert_eq!(physics::TICK_DURATION_MS, 16);
        assert!((physics::DT * physics::TICK_RATE as f32 - 1.0).abs() < 1e-6);
    }
}
