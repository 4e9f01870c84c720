//! Headless engine for the photosynthesis simulation.
//!
//! Plays a scripted student session against the day-cycle engine, pacing
//! each simulated day over its animation phases, logging what a renderer
//! would draw, and appending every finished trial to a JSON Lines file.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `photosim-config.yaml` (or `PHOTOSIM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Open the trial log (`PHOTOSIM_TRIAL_LOG`, default `photosim-trials.jsonl`)
//! 4. Open the session with the log renderer
//! 5. Load the scenario (`PHOTOSIM_SCENARIO`, or the built-in classroom script)
//! 6. Run it and log the summary

mod error;
mod log_renderer;
mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use photosim_core::SimulationConfig;
use photosim_core::config::{LogFormat, LoggingConfig};
use photosim_trials::{JsonLinesSink, SystemTimeSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_renderer::LogRenderer;
use crate::scenario::Scenario;

const DEFAULT_CONFIG_PATH: &str = "photosim-config.yaml";
const DEFAULT_TRIAL_LOG_PATH: &str = "photosim-trials.jsonl";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the trial log, the scenario, or a
/// simulated day fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = env_path("PHOTOSIM_CONFIG", DEFAULT_CONFIG_PATH);
    let config = load_config(&config_path)?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!(
        config = %config_path.display(),
        num_days = config.simulation.num_days,
        light_options = u8::from(config.simulation.light_option_count),
        policy = config.feedback.policy.as_deref().unwrap_or("none"),
        day_duration_ms = config.pacing.day_duration_ms,
        "photosim-engine starting"
    );

    // 3. Open the trial log.
    let trial_log = env_path("PHOTOSIM_TRIAL_LOG", DEFAULT_TRIAL_LOG_PATH);
    let sink = JsonLinesSink::open(&trial_log).map_err(EngineError::from)?;
    info!(path = %sink.path().display(), "Trial log opened");

    // 4. Open the session.
    let mut session = photosim_core::Session::new(
        &config,
        Arc::new(SystemTimeSource),
        Box::new(LogRenderer::new()),
        Box::new(sink),
    )?;

    // 5. Load the scenario.
    let scenario = match std::env::var_os("PHOTOSIM_SCENARIO") {
        Some(path) => {
            let path = PathBuf::from(path);
            info!(path = %path.display(), "Loading scenario");
            Scenario::from_file(&path)?
        }
        None => {
            info!("No scenario given, using the classroom script");
            Scenario::classroom()
        }
    };

    // 6. Run it.
    let summary = scenario::run(&mut session, &scenario, true).await?;

    info!(
        session = %session.session_id(),
        steps = summary.steps,
        days_simulated = summary.days_simulated,
        trials_completed = summary.trials_completed,
        "photosim-engine shutdown complete"
    );
    Ok(())
}

fn env_path(var: &str, default: &str) -> PathBuf {
    std::env::var_os(var).map_or_else(|| PathBuf::from(default), PathBuf::from)
}

/// Load the simulation configuration, falling back to defaults when the
/// file does not exist.
fn load_config(path: &Path) -> Result<SimulationConfig, EngineError> {
    if path.exists() {
        Ok(SimulationConfig::from_file(path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
