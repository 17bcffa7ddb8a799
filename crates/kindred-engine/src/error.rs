//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and of the tick
//! loop so `main` can propagate with `?`.

use std::path::PathBuf;

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: kindred_core::ConfigError,
    },

    /// The content pack file could not be read.
    #[error("failed to read content pack {path}: {source}")]
    ContentIo {
        /// Path that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The content pack is malformed or inconsistent.
    #[error("content error: {source}")]
    Content {
        /// The underlying content error.
        #[from]
        source: kindred_content::ContentError,
    },

    /// A tick failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: kindred_core::TickError,
    },
}
