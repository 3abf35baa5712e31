use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::state::SizeTier;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Gameplay tunables. One immutable snapshot is shared by a whole session.
///
/// Pairs are indexed `[big, small]`; `ufo_chances` is
/// `[small, big_patrol, big_kamikaze]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub asteroid_min_speed: f32,
    pub asteroid_max_speed: f32,
    /// Multiplier applied to both children of a split
    pub asteroid_speed_boost: f32,
    pub ufo_max_speed: [f32; 2],
    pub ufo_mean_shot_time: [f32; 2],
    pub ufo_accuracy: [f32; 2],
    pub ufo_chances: [f32; 3],
    /// Repulsion strength of the dodging field
    pub ufo_dodging: f32,
    /// How much of a player shot's line is projected out when dodging (0 disables)
    pub ufo_shot_anticipation: f32,
    pub ufo_shot_speed: [f32; 2],
    /// Aim along the wrapped displacement instead of the direct one
    pub ufo_shot_wrapping: bool,
    pub kamikaze_acceleration: f32,
    /// Used for variant selection when every `ufo_chances` weight is zero
    pub small_ufo_chance: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            asteroid_min_speed: 50.0,
            asteroid_max_speed: 300.0,
            asteroid_speed_boost: 1.1,
            ufo_max_speed: [250.0, 350.0],
            ufo_mean_shot_time: [1.0, 0.75],
            ufo_accuracy: [0.1, 0.05],
            ufo_chances: [0.3, 0.5, 0.2],
            ufo_dodging: 0.75,
            ufo_shot_anticipation: 0.5,
            ufo_shot_speed: [450.0, 600.0],
            ufo_shot_wrapping: true,
            kamikaze_acceleration: 0.005,
            small_ufo_chance: 0.3,
        }
    }
}

impl GameConfig {
    /// Read a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `GAME_CONFIG_PATH` if set, otherwise use defaults
    pub fn load_or_default() -> Self {
        let Ok(path) = std::env::var("GAME_CONFIG_PATH") else {
            return Self::default();
        };
        match Self::from_json_file(&path) {
            Ok(config) => {
                tracing::info!("Loaded game config from {}", path);
                config
            }
            Err(e) => {
                tracing::warn!("{}, using default game config", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if !(self.asteroid_min_speed > 0.0) {
            return invalid("asteroid_min_speed must be > 0");
        }
        if self.asteroid_max_speed < self.asteroid_min_speed {
            return invalid("asteroid_max_speed cannot be below asteroid_min_speed");
        }
        if !(self.asteroid_speed_boost > 0.0) {
            return invalid("asteroid_speed_boost must be > 0");
        }
        if self.ufo_max_speed.iter().any(|&s| !(s > 0.0)) {
            return invalid("ufo_max_speed entries must be > 0");
        }
        if self.ufo_mean_shot_time.iter().any(|&t| !(t > 0.0)) {
            return invalid("ufo_mean_shot_time entries must be > 0");
        }
        if self.ufo_accuracy.iter().any(|&a| !(a >= 0.0)) {
            return invalid("ufo_accuracy entries cannot be negative");
        }
        if self.ufo_chances.iter().any(|&c| !(c >= 0.0)) {
            return invalid("ufo_chances entries cannot be negative");
        }
        if self.ufo_shot_speed.iter().any(|&s| !(s > 0.0)) {
            return invalid("ufo_shot_speed entries must be > 0");
        }
        if !(self.ufo_dodging >= 0.0) {
            return invalid("ufo_dodging cannot be negative");
        }
        if !(0.0..=1.0).contains(&self.ufo_shot_anticipation) {
            return invalid("ufo_shot_anticipation must be within 0-1");
        }
        if !(self.kamikaze_acceleration >= 0.0) {
            return invalid("kamikaze_acceleration cannot be negative");
        }
        if !(0.0..=1.0).contains(&self.small_ufo_chance) {
            return invalid("small_ufo_chance must be within 0-1");
        }
        Ok(())
    }
}

/// Headless runner configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Ticks per second
    pub tick_rate: u32,
    /// RNG seed; random when unset
    pub seed: Option<u64>,
    /// Asteroids per wave
    pub wave_size: usize,
    pub wave_tier: SizeTier,
    /// Mean seconds between UFO spawns
    pub ufo_spawn_interval: f32,
    /// Port for the Prometheus endpoint
    pub metrics_port: u16,
    /// Stop after this many ticks
    pub max_ticks: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            arena_width: 1024.0,
            arena_height: 768.0,
            tick_rate: crate::game::constants::physics::TICK_RATE,
            seed: None,
            wave_size: 4,
            wave_tier: SizeTier::Huge,
            ufo_spawn_interval: 12.0,
            metrics_port: 9090,
            max_ticks: None,
        }
    }
}

/// Smallest arena side. A huge asteroid must fit fully inside with room to
/// spare, otherwise it never counts as on-screen and never wraps.
pub fn min_arena_dimension() -> f32 {
    2.0 * SizeTier::Huge.diameter()
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Invalid {} '{}', using default", key, raw);
            None
        }
    }
}

impl SessionConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        let min_side = min_arena_dimension();
        if let Some(w) = env_parse::<f32>("ARENA_WIDTH") {
            if w >= min_side {
                config.arena_width = w;
            } else {
                tracing::warn!("ARENA_WIDTH must be >= {}, using default", min_side);
            }
        }

        if let Some(h) = env_parse::<f32>("ARENA_HEIGHT") {
            if h >= min_side {
                config.arena_height = h;
            } else {
                tracing::warn!("ARENA_HEIGHT must be >= {}, using default", min_side);
            }
        }

        if let Some(rate) = env_parse::<u32>("TICK_RATE") {
            if (1..=240).contains(&rate) {
                config.tick_rate = rate;
            } else {
                tracing::warn!("TICK_RATE must be 1-240, using default");
            }
        }

        if let Some(seed) = env_parse::<u64>("SEED") {
            config.seed = Some(seed);
        }

        if let Some(size) = env_parse::<usize>("WAVE_SIZE") {
            if (1..=64).contains(&size) {
                config.wave_size = size;
            } else {
                tracing::warn!("WAVE_SIZE must be 1-64, using default");
            }
        }

        if let Ok(tier) = std::env::var("WAVE_TIER") {
            match tier.parse::<SizeTier>() {
                Ok(parsed) => config.wave_tier = parsed,
                Err(e) => tracing::warn!("{}, using default", e),
            }
        }

        if let Some(interval) = env_parse::<f32>("UFO_SPAWN_INTERVAL") {
            if interval > 0.0 {
                config.ufo_spawn_interval = interval;
            } else {
                tracing::warn!("UFO_SPAWN_INTERVAL must be > 0, using default");
            }
        }

        if let Some(port) = env_parse::<u16>("METRICS_PORT") {
            if port > 0 {
                config.metrics_port = port;
            } else {
                tracing::warn!("METRICS_PORT must be > 0, using default");
            }
        }

        if let Some(max) = env_parse::<u64>("MAX_TICKS") {
            config.max_ticks = Some(max);
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min_side = min_arena_dimension();
        if !(self.arena_width >= min_side && self.arena_height >= min_side) {
            return Err(ConfigError::Invalid(format!(
                "arena dimensions must be at least {}x{}",
                min_side, min_side
            )));
        }
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be at least 1".into()));
        }
        if self.wave_size == 0 {
            return Err(ConfigError::Invalid("wave_size must be at least 1".into()));
        }
        if self.metrics_port == 0 {
            return Err(ConfigError::Invalid("metrics_port cannot be 0".into()));
        }
        Ok(())
    }

    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}
