//! Monte Carlo configuration parameters.

use crate::error::ConfigError;

/// Configuration for Monte Carlo move selection.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloConfig {
    /// Number of random rollouts to play per move.
    pub trials: u32,

    /// Weight for the searching player's squares: added when the searcher
    /// wins a rollout, subtracted when it loses.
    pub win_increment: f64,

    /// Weight for the opponent's squares: subtracted when the searcher wins a
    /// rollout, added when it loses.
    pub loss_decrement: f64,

    /// Worker threads for the parallel engine. 0 uses one per CPU core.
    /// Ignored by the sequential `mc_move`.
    pub threads: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 2500,
            win_increment: 1.0,
            loss_decrement: 1.0,
            threads: 0,
        }
    }
}

impl MonteCarloConfig {
    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            trials: 200,
            threads: 2,
            ..Self::default()
        }
    }

    /// Same configuration with a different trial count.
    pub fn with_trials(self, trials: u32) -> Self {
        Self { trials, ..self }
    }

    /// Checks that both score weights are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("win_increment", self.win_increment),
            ("loss_decrement", self.loss_decrement),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }

    /// Number of worker threads after resolving 0 to the core count.
    pub fn worker_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
