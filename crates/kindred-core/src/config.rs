//! Configuration loading and typed config structures for the Kindred
//! simulation.
//!
//! The configuration is a single YAML document. Every section and every
//! field has a default, so an empty document is a valid configuration and
//! partial documents override only what they name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use kindred_agents::{PlannerConfig, VitalsConfig};
use kindred_world::WorldDimensions;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid shape, seeding, pacing, and starting items.
    #[serde(default)]
    pub world: WorldConfig,

    /// Ambient temperature and its daily cycle.
    #[serde(default)]
    pub climate: ClimateConfig,

    /// Starting population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Perception and action-selection tunables.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Body-state tunables.
    #[serde(default)]
    pub vitals: VitalsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where the item and recipe content comes from.
    #[serde(default)]
    pub content: ContentConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string. Blank input yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed. Without one every run differs.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Chunks along each world axis.
    #[serde(default = "default_chunks_per_side")]
    pub chunks_per_side: usize,

    /// Cells along each chunk axis.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. Runs forever when absent.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Item name to number of instances scattered on free cells at startup.
    #[serde(default)]
    pub items: BTreeMap<String, u32>,
}

impl WorldConfig {
    /// Grid shape for [`kindred_world::World::new`].
    pub const fn dimensions(&self) -> WorldDimensions {
        WorldDimensions {
            chunks_per_side: self.chunks_per_side,
            chunk_size: self.chunk_size,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
            chunks_per_side: default_chunks_per_side(),
            chunk_size: default_chunk_size(),
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
            items: BTreeMap::new(),
        }
    }
}

/// Ambient temperature configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClimateConfig {
    /// Mean ambient temperature.
    #[serde(default = "default_ambient_temperature")]
    pub ambient_temperature: f64,

    /// Amplitude of the daily swing around the mean.
    #[serde(default = "default_daily_swing")]
    pub daily_swing: f64,

    /// Length of one day in ticks.
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            ambient_temperature: default_ambient_temperature(),
            daily_swing: default_daily_swing(),
            ticks_per_day: default_ticks_per_day(),
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Number of family groups spawned at simulation start.
    #[serde(default = "default_initial_groups")]
    pub initial_groups: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_groups: default_initial_groups(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log a tick summary every N ticks.
    #[serde(default = "default_summary_every_ticks")]
    pub summary_every_ticks: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            summary_every_ticks: default_summary_every_ticks(),
        }
    }
}

/// Content source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContentConfig {
    /// Path to a JSON content pack. The engine's built-in pack is used
    /// when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Kindred".to_owned()
}

const fn default_chunks_per_side() -> usize {
    40
}

const fn default_chunk_size() -> usize {
    10
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_ambient_temperature() -> f64 {
    10.0
}

const fn default_daily_swing() -> f64 {
    8.0
}

const fn default_ticks_per_day() -> u64 {
    86_400
}

const fn default_initial_groups() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_every_ticks() -> u64 {
    100
}
