//! Error types for the game simulation.

use thiserror::Error;

use crate::buildings::BuildError;
use crate::config::ConfigError;
use crate::fleets::OrderError;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// None of these are fatal: each one is reported back to the caller that
/// triggered it and the simulation carries on unchanged.
#[derive(Debug, Error)]
pub enum GameError {
    /// A fleet order was rejected at issuance.
    #[error("Invalid order: {0}")]
    Order(#[from] OrderError),

    /// A building could not be constructed.
    #[error("Cannot build: {0}")]
    Build(#[from] BuildError),

    /// The configuration could not be loaded or is inconsistent.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid planet identifier.
    #[error("Planet not found: {0}")]
    PlanetNotFound(usize),

    /// The system has no planets to choose from.
    #[error("Star system has no planets")]
    EmptySystem,

    /// The session has been stopped and no longer accepts input.
    #[error("Session is stopped")]
    SessionStopped,
}
