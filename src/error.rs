//! Error types for the library.
//!
//! Board misuse (off-board coordinates, searching a finished board) is a
//! programming error and panics; the types here cover what a caller can
//! actually recover from.

use thiserror::Error;

/// Invalid Monte Carlo configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("score weight `{name}` must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },
}

/// Failure to parse a player marker or a square from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown player `{0}`, expected X or O")]
    Player(String),
    #[error("expected a square as `<row> <col>` or `<row>,<col>`, got `{0}`")]
    Square(String),
}

/// A session command that the current game state does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("the game is still in progress")]
    GameInProgress,
    #[error("square ({row}, {col}) is off a {dim}x{dim} board")]
    OffBoard { row: usize, col: usize, dim: usize },
}

/// Top-level library error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build the rollout thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
