//! Prometheus-compatible metrics endpoint
//!
//! Exposes simulation counters in Prometheus text format and as JSON.
//! Default endpoint: http://localhost:9090/metrics

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::game::events::{GameEvent, UfoDestroyCause};
use crate::game::state::ArenaState;

const TICK_HISTORY_LEN: usize = 1000;

/// Metrics registry for one arena session
#[derive(Debug)]
pub struct Metrics {
    // Live bodies
    pub asteroid_count: AtomicU64,
    pub ufo_count: AtomicU64,
    pub laser_count: AtomicU64,
    pub player_alive: AtomicU64,

    // Event counters
    pub asteroid_splits: AtomicU64,
    pub asteroids_shot: AtomicU64,
    pub waves_cleared: AtomicU64,
    pub ufos_spawned: AtomicU64,
    pub ufos_destroyed: AtomicU64,
    pub ufos_killed_by_player: AtomicU64,
    pub ufos_warped_out: AtomicU64,
    pub ufo_shots_fired: AtomicU64,
    pub player_deaths: AtomicU64,

    // Tick timing (microseconds)
    pub tick_time_us: AtomicU64,
    pub tick_time_p95_us: AtomicU64,
    pub tick_time_p99_us: AtomicU64,
    pub tick_time_max_us: AtomicU64,
    pub tick_count: AtomicU64,

    start_time: Instant,

    tick_history: RwLock<VecDeque<u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            asteroid_count: AtomicU64::new(0),
            ufo_count: AtomicU64::new(0),
            laser_count: AtomicU64::new(0),
            player_alive: AtomicU64::new(0),
            asteroid_splits: AtomicU64::new(0),
            asteroids_shot: AtomicU64::new(0),
            waves_cleared: AtomicU64::new(0),
            ufos_spawned: AtomicU64::new(0),
            ufos_destroyed: AtomicU64::new(0),
            ufos_killed_by_player: AtomicU64::new(0),
            ufos_warped_out: AtomicU64::new(0),
            ufo_shots_fired: AtomicU64::new(0),
            player_deaths: AtomicU64::new(0),
            tick_time_us: AtomicU64::new(0),
            tick_time_p95_us: AtomicU64::new(0),
            tick_time_p99_us: AtomicU64::new(0),
            tick_time_max_us: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
            start_time: Instant::now(),
            tick_history: RwLock::new(VecDeque::with_capacity(TICK_HISTORY_LEN)),
        }
    }

    /// Record a tick time and update percentiles
    pub fn record_tick_time(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.tick_time_us.store(us, Ordering::Relaxed);
        self.tick_count.fetch_add(1, Ordering::Relaxed);

        let mut history = self.tick_history.write();
        history.push_back(us);
        while history.len() > TICK_HISTORY_LEN {
            history.pop_front();
        }

        if history.len() >= 10 {
            let mut sorted: Vec<u64> = history.iter().copied().collect();
            sorted.sort_unstable();

            let p95_idx = (sorted.len() as f32 * 0.95) as usize;
            let p99_idx = (sorted.len() as f32 * 0.99) as usize;

            self.tick_time_p95_us.store(sorted[p95_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_p99_us.store(sorted[p99_idx.min(sorted.len() - 1)], Ordering::Relaxed);
            self.tick_time_max_us.store(sorted.last().copied().unwrap_or(0), Ordering::Relaxed);
        }
    }

    /// Bump event counters for one tick's output
    pub fn record_events(&self, events: &[GameEvent]) {
        for event in events {
            let counter = match event {
                GameEvent::AsteroidSplit { .. } => &self.asteroid_splits,
                GameEvent::AsteroidShot { .. } => &self.asteroids_shot,
                GameEvent::WaveCleared => &self.waves_cleared,
                GameEvent::UfoSpawned { .. } => &self.ufos_spawned,
                GameEvent::UfoShotFired { .. } => &self.ufo_shots_fired,
                GameEvent::UfoWarpedOut { .. } => &self.ufos_warped_out,
                GameEvent::PlayerDestroyed { .. } => &self.player_deaths,
                GameEvent::UfoExploded { cause, .. } => {
                    if *cause == UfoDestroyCause::PlayerShot {
                        self.ufos_killed_by_player.fetch_add(1, Ordering::Relaxed);
                    }
                    &self.ufos_destroyed
                }
                GameEvent::UfoLaunched { .. } | GameEvent::LaserExpired { .. } => continue,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Refresh the live-body gauges
    pub fn record_state(&self, state: &ArenaState) {
        self.asteroid_count.store(state.asteroids.len() as u64, Ordering::Relaxed);
        self.ufo_count.store(state.ufos.len() as u64, Ordering::Relaxed);
        self.laser_count.store(state.lasers.len() as u64, Ordering::Relaxed);
        self.player_alive.store(state.player.is_some() as u64, Ordering::Relaxed);
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Generate Prometheus-format metrics output
    pub fn to_prometheus(&self) -> String {
        let mut output = String::with_capacity(4096);

        macro_rules! metric {
            ($name:expr, $help:expr, $type:expr, $value:expr) => {
                output.push_str(&format!(
                    "# HELP {} {}\n# TYPE {} {}\n{} {}\n",
                    $name, $help, $name, $type, $name, $value
                ));
            };
        }

        metric!("rock_rats_asteroids", "Number of live asteroids", "gauge",
            self.asteroid_count.load(Ordering::Relaxed));
        metric!("rock_rats_ufos", "Number of live UFOs", "gauge",
            self.ufo_count.load(Ordering::Relaxed));
        metric!("rock_rats_lasers", "Number of live lasers", "gauge",
            self.laser_count.load(Ordering::Relaxed));
        metric!("rock_rats_player_alive", "Whether the ship is in play (0/1)", "gauge",
            self.player_alive.load(Ordering::Relaxed));

        metric!("rock_rats_asteroid_splits_total", "Asteroids split or destroyed", "counter",
            self.asteroid_splits.load(Ordering::Relaxed));
        metric!("rock_rats_asteroids_shot_total", "Asteroids hit by the player", "counter",
            self.asteroids_shot.load(Ordering::Relaxed));
        metric!("rock_rats_waves_cleared_total", "Asteroid waves cleared", "counter",
            self.waves_cleared.load(Ordering::Relaxed));
        metric!("rock_rats_ufos_spawned_total", "UFOs spawned", "counter",
            self.ufos_spawned.load(Ordering::Relaxed));
        metric!("rock_rats_ufos_destroyed_total", "UFOs destroyed", "counter",
            self.ufos_destroyed.load(Ordering::Relaxed));
        metric!("rock_rats_ufos_killed_by_player_total", "UFOs shot down by the player", "counter",
            self.ufos_killed_by_player.load(Ordering::Relaxed));
        metric!("rock_rats_ufos_warped_out_total", "UFOs that warped out", "counter",
            self.ufos_warped_out.load(Ordering::Relaxed));
        metric!("rock_rats_ufo_shots_total", "Lasers fired by UFOs", "counter",
            self.ufo_shots_fired.load(Ordering::Relaxed));
        metric!("rock_rats_player_deaths_total", "Ships destroyed", "counter",
            self.player_deaths.load(Ordering::Relaxed));

        metric!("rock_rats_tick_time_microseconds", "Current tick time in microseconds", "gauge",
            self.tick_time_us.load(Ordering::Relaxed));
        metric!("rock_rats_tick_time_p95_microseconds", "95th percentile tick time", "gauge",
            self.tick_time_p95_us.load(Ordering::Relaxed));
        metric!("rock_rats_tick_time_p99_microseconds", "99th percentile tick time", "gauge",
            self.tick_time_p99_us.load(Ordering::Relaxed));
        metric!("rock_rats_tick_time_max_microseconds", "Maximum tick time", "gauge",
            self.tick_time_max_us.load(Ordering::Relaxed));
        metric!("rock_rats_tick_count", "Total ticks processed", "counter",
            self.tick_count.load(Ordering::Relaxed));
        metric!("rock_rats_uptime_seconds", "Process uptime in seconds", "counter",
            self.uptime_seconds());

        output
    }

    /// JSON view of the same counters
    pub fn to_json(&self) -> String {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        serde_json::json!({
            "bodies": {
                "asteroids": load(&self.asteroid_count),
                "ufos": load(&self.ufo_count),
                "lasers": load(&self.laser_count),
                "player_alive": load(&self.player_alive) == 1,
            },
            "events": {
                "asteroid_splits": load(&self.asteroid_splits),
                "asteroids_shot": load(&self.asteroids_shot),
                "waves_cleared": load(&self.waves_cleared),
                "ufos_spawned": load(&self.ufos_spawned),
                "ufos_destroyed": load(&self.ufos_destroyed),
                "ufos_killed_by_player": load(&self.ufos_killed_by_player),
                "ufos_warped_out": load(&self.ufos_warped_out),
                "ufo_shots": load(&self.ufo_shots_fired),
                "player_deaths": load(&self.player_deaths),
            },
            "performance": {
                "tick_time_us": load(&self.tick_time_us),
                "tick_time_p95_us": load(&self.tick_time_p95_us),
                "tick_time_p99_us": load(&self.tick_time_p99_us),
                "tick_time_max_us": load(&self.tick_time_max_us),
                "tick_count": load(&self.tick_count),
            },
            "uptime_seconds": self.uptime_seconds(),
        })
        .to_string()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn http_response(content_type: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        content_type,
        body.len(),
        body
    )
}

/// Pick the response for a raw request. More specific paths are matched first.
fn route(metrics: &Metrics, request: &str) -> String {
    if request.starts_with("GET /metrics/json") || request.starts_with("GET /json") {
        http_response("application/json", &metrics.to_json())
    } else if request.starts_with("GET /metrics") {
        http_response("text/plain; version=0.0.4", &metrics.to_prometheus())
    } else if request.starts_with("GET /health") || request.starts_with("GET / ") {
        http_response("text/plain", "OK")
    } else {
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_string()
    }
}

/// Start the metrics HTTP server
pub async fn start_metrics_server(metrics: Arc<Metrics>, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!("Metrics server listening on http://{}/metrics", addr);

    loop {
        let (mut socket, peer) = listener.accept().await?;
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 1024];

            match socket.read(&mut buffer).await {
                Ok(n) if n > 0 => {
                    let request = String::from_utf8_lossy(&buffer[..n]);
                    let response = route(&metrics, &request);
                    if let Err(e) = socket.write_all(response.as_bytes()).await {
                        debug!("Failed to write metrics response to {}: {}", peer, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Failed to read from metrics socket {}: {}", peer, e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::PlayerDeathCause;
    use crate::game::state::{Player, SizeTier, UfoVariant};
    use crate::util::geometry::ArenaBounds;
    use crate::util::vec2::Vec2;

    fn exploded(cause: UfoDestroyCause) -> GameEvent {
        GameEvent::UfoExploded {
            id: 1,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            variant: UfoVariant::Small,
            cause,
        }
    }

    #[test]
    fn test_record_tick_time() {
        let metrics = Metrics::new();
        for i in 0..100 {
            metrics.record_tick_time(Duration::from_micros(100 + i * 10));
        }

        assert_eq!(metrics.tick_count.load(Ordering::Relaxed), 100);
        assert_eq!(metrics.tick_time_max_us.load(Ordering::Relaxed), 1090);
        assert!(metrics.tick_time_p95_us.load(Ordering::Relaxed) >= 1040);
    }

    #[test]
    fn test_record_events() {
        let metrics = Metrics::new();
        metrics.record_events(&[
            GameEvent::WaveCleared,
            GameEvent::AsteroidShot { tier: SizeTier::Big },
            exploded(UfoDestroyCause::PlayerShot),
            exploded(UfoDestroyCause::Asteroid),
            GameEvent::PlayerDestroyed {
                position: Vec2::ZERO,
                cause: PlayerDeathCause::UfoShot,
            },
            GameEvent::LaserExpired { id: 3 },
        ]);

        assert_eq!(metrics.waves_cleared.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.asteroids_shot.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.ufos_destroyed.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.ufos_killed_by_player.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.player_deaths.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_state() {
        let metrics = Metrics::new();
        let mut state = ArenaState::new(ArenaBounds::new(800.0, 600.0));
        state.player = Some(Player::new(Vec2::ZERO));
        metrics.record_state(&state);
        assert_eq!(metrics.player_alive.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.asteroid_count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.asteroid_count.store(12, Ordering::Relaxed);
        metrics.waves_cleared.store(3, Ordering::Relaxed);

        let output = metrics.to_prometheus();
        assert!(output.contains("rock_rats_asteroids 12"));
        assert!(output.contains("rock_rats_waves_cleared_total 3"));
        assert!(output.contains("# TYPE rock_rats_tick_count counter"));
    }

    #[test]
    fn test_json_format() {
        let metrics = Metrics::new();
        metrics.ufo_count.store(2, Ordering::Relaxed);

        let parsed: serde_json::Value = serde_json::from_str(&metrics.to_json()).unwrap();
        assert_eq!(parsed["bodies"]["ufos"], 2);
        assert_eq!(parsed["bodies"]["player_alive"], false);
    }

    #[test]
    fn test_routes() {
        let metrics = Metrics::new();
        assert!(route(&metrics, "GET /metrics/json HTTP/1.1").contains("application/json"));
        assert!(route(&metrics, "GET /metrics HTTP/1.1").contains("version=0.0.4"));
        assert!(route(&metrics, "GET /health HTTP/1.1").ends_with("OK"));
        assert!(route(&metrics, "GET /nope HTTP/1.1").starts_with("HTTP/1.1 404"));
    }
}
