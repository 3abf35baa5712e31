use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rock_rats_arena::config::{GameConfig, SessionConfig};
use rock_rats_arena::game::events::GameEvent;
use rock_rats_arena::game::game_loop::GameLoop;
use rock_rats_arena::metrics::Metrics;
use rock_rats_arena::util::geometry::ArenaBounds;

/// Seconds until the next UFO, jittered around the configured mean
fn next_ufo_delay(session: &SessionConfig, rng: &mut impl Rng) -> f32 {
    session.ufo_spawn_interval * rng.gen_range(0.5..=1.5)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    info!("Rock Rats Arena v{}", env!("CARGO_PKG_VERSION"));

    let session = SessionConfig::load_or_default();
    session.validate()?;
    let game_config = GameConfig::load_or_default();
    game_config.validate()?;

    let seed = session.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        "Arena {}x{} at {} Hz, seed {}",
        session.arena_width, session.arena_height, session.tick_rate, seed
    );

    let metrics = Arc::new(Metrics::new());

    #[cfg(feature = "metrics_endpoint")]
    {
        let metrics = metrics.clone();
        let port = session.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = rock_rats_arena::metrics::start_metrics_server(metrics, port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    let mut game = GameLoop::new(
        Arc::new(game_config),
        ArenaBounds::new(session.arena_width, session.arena_height),
        seed,
    );
    // Spawn timing for the runner itself, kept apart from the simulation's stream
    let mut runner_rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    game.spawn_wave(session.wave_size, session.wave_tier);
    let mut ufo_countdown = next_ufo_delay(&session, &mut runner_rng);

    let dt = session.tick_dt();
    let mut ticker = tokio::time::interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let report_every = session.tick_rate as u64 * 30;

    let run = async {
        loop {
            ticker.tick().await;

            let started = Instant::now();
            let events = game.tick(dt);
            metrics.record_tick_time(started.elapsed());
            metrics.record_events(&events);

            if events.iter().any(|e| matches!(e, GameEvent::WaveCleared)) {
                info!("Wave cleared, spawning the next one");
                game.spawn_wave(session.wave_size, session.wave_tier);
            }

            ufo_countdown -= dt;
            if ufo_countdown <= 0.0 {
                game.spawn_ufo();
                ufo_countdown = next_ufo_delay(&session, &mut runner_rng);
            }

            let state = game.state();
            metrics.record_state(state);

            if state.tick % report_every == 0 {
                info!(
                    "Tick {}: {} asteroids, {} UFOs, {} lasers | tick p95 {}us",
                    state.tick,
                    state.asteroids.len(),
                    state.ufos.len(),
                    state.lasers.len(),
                    metrics.tick_time_p95_us.load(std::sync::atomic::Ordering::Relaxed)
                );
            }

            if session.max_ticks.is_some_and(|max| state.tick >= max) {
                info!("Reached {} ticks", state.tick);
                break;
            }
        }
    };

    tokio::select! {
        _ = run => {}
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for Ctrl+C: {}", e);
            }
            info!("Shutdown signal received");
        }
    }

    info!("Arena stopped");
    Ok(())
}
