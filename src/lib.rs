//! Rock Rats Arena
//!
//! Headless asteroid-field simulation with autonomous UFO opponents.
//!
//! # Features
//!
//! - `metrics_endpoint` - Prometheus/JSON metrics over HTTP from the runner binary (enabled by default)

pub mod config;
pub mod game;
pub mod metrics;
pub mod util;
