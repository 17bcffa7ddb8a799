//! Simulation engine binary for Kindred.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the path given as the first argument, or
//!    `kindred-config.yaml` in the working directory, or defaults
//! 2. Initialize structured logging (tracing), `RUST_LOG` overriding the
//!    configured level
//! 3. Load the content pack, falling back to the built-in demo pack
//! 4. Scatter starting items and spawn family groups
//! 5. Run ticks at the configured interval until `max_ticks`, everyone has
//!    died, or Ctrl-C

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use kindred_content::Registry;
use kindred_core::{SimulationConfig, SimulationState, run_tick};

use crate::error::EngineError;

/// Config file looked up in the working directory.
const DEFAULT_CONFIG: &str = "kindred-config.yaml";

/// Content used when the configuration names no pack.
const DEMO_CONTENT: &str = include_str!("../content/demo.json");

/// Why the tick loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndReason {
    /// The configured tick limit was reached.
    MaxTicks,
    /// Nobody is left alive.
    Extinction,
    /// The operator pressed Ctrl-C.
    Interrupted,
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration or content cannot be loaded, or a
/// tick fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        world_name = %config.world.name,
        seed = ?config.world.seed,
        side = config.world.dimensions().side(),
        tick_interval_ms = config.world.tick_interval_ms,
        max_ticks = ?config.world.max_ticks,
        "kindred-engine starting"
    );

    let registry = load_registry(config.content.path.as_deref())?;
    info!(
        items = registry.item_count(),
        recipes = registry.recipes().len(),
        "Content loaded"
    );

    let mut rng = config
        .world
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let mut state = SimulationState::populated(&config, registry, &mut rng)?;

    let (reason, ticks) = run(&mut state, &config, &mut rng).await?;
    info!(
        end_reason = ?reason,
        total_ticks = ticks,
        survivors = state.people.len(),
        "kindred-engine shutdown complete"
    );
    Ok(())
}

/// Drive the tick loop at the configured pace.
async fn run(
    state: &mut SimulationState,
    config: &SimulationConfig,
    rng: &mut StdRng,
) -> Result<(EndReason, u64), EngineError> {
    let mut interval = tokio::time::interval(Duration::from_millis(config.world.tick_interval_ms.max(1)));
    let every = config.logging.summary_every_ticks.max(1);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            result = &mut ctrl_c => {
                if let Err(error) = result {
                    warn!(%error, "Failed to listen for Ctrl-C");
                }
                return Ok((EndReason::Interrupted, state.clock.tick()));
            }
        }

        let summary = run_tick(state, config, rng)?;
        if summary.tick.checked_rem(every) == Some(0) {
            info!(
                tick = summary.tick,
                ambient = summary.ambient,
                population = summary.population,
                transformations = summary.transformations,
                outcomes = ?summary.outcomes,
                "Tick summary"
            );
        } else {
            debug!(tick = summary.tick, population = summary.population, "Tick");
        }

        if state.people.is_empty() {
            return Ok((EndReason::Extinction, summary.tick));
        }
        if config.world.max_ticks.is_some_and(|max| summary.tick >= max) {
            return Ok((EndReason::MaxTicks, summary.tick));
        }
    }
}

/// Load the configuration file named on the command line, else the default
/// file if present, else defaults.
fn load_config() -> Result<SimulationConfig, EngineError> {
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    if path.exists() {
        Ok(SimulationConfig::from_file(&path)?)
    } else {
        Ok(SimulationConfig::default())
    }
}

/// Load the content pack at `path`, or the built-in demo pack.
fn load_registry(path: Option<&Path>) -> Result<Registry, EngineError> {
    let Some(path) = path else {
        return Ok(Registry::from_json(DEMO_CONTENT)?);
    };
    let json = std::fs::read_to_string(path).map_err(|source| EngineError::ContentIo {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Registry::from_json(&json)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn demo_content_loads() {
        let registry = load_registry(None).unwrap();
        let planner = kindred_core::SimulationConfig::default().planner;
        assert!(registry.item_by_name(&planner.fire_item).is_some());
        assert!(registry.item_by_name(&planner.kindling_item).is_some());
        let berries = registry.item_by_name("berries").unwrap();
        assert_eq!(registry.depth(berries.id), 1);
    }

    #[test]
    fn missing_content_file_is_reported() {
        let err = load_registry(Some(Path::new("/nonexistent/pack.json"))).unwrap_err();
        assert!(matches!(err, EngineError::ContentIo { .. }));
    }

    #[tokio::test]
    async fn loop_stops_at_max_ticks() {
        let mut config = SimulationConfig::parse("world: { chunks_per_side: 3, max_ticks: 5, tick_interval_ms: 1, items: { bush: 10 } }").unwrap();
        config.population.initial_groups = 1;
        let mut rng = StdRng::seed_from_u64(9);
        let mut state = SimulationState::populated(&config, load_registry(None).unwrap(), &mut rng).unwrap();
        let (reason, ticks) = run(&mut state, &config, &mut rng).await.unwrap();
        assert_eq!(reason, EndReason::MaxTicks);
        assert_eq!(ticks, 5);
    }
}
