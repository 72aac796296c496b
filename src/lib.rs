//! N×N tic-tac-toe with an optional reverse rule and a Monte Carlo AI.
//!
//! - [`board`]: the board model and direction-generic win/draw detection
//! - [`montecarlo`]: rollout-based move selection, sequential and parallel
//! - [`game_controller`]: a human-vs-computer session on top of both

pub mod board;
pub mod config;
pub mod error;
pub mod game_controller;
pub mod montecarlo;

pub use board::{parse_square, Board, Cell, Outcome, Player};
pub use config::MonteCarloConfig;
pub use error::{ConfigError, ControllerError, Error, ParseError};
pub use game_controller::{GameController, MoveResult};
pub use montecarlo::{get_best_move, mc_move, mc_trial, mc_update_scores, MonteCarlo, ScoreGrid};

/// Installs the `tracing` subscriber used by the binaries.
///
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
