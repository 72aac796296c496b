//! # Monte Carlo Move Selection
//!
//! Estimates the value of every empty square by playing many random games
//! to completion from the current position:
//!
//! 1. **Rollout**: clone the board and alternate uniformly random legal moves,
//!    starting with the searching player, until the game ends.
//! 2. **Scoring**: if the rollout was decisive, every square held by the
//!    winner gains credit and every square held by the loser loses it. The
//!    searching player's squares move by `win_increment`, the opponent's by
//!    `loss_decrement`. Draws score nothing.
//! 3. **Selection**: among the empty squares of the real board, pick the
//!    highest score, breaking ties uniformly at random.
//!
//! Randomness is always injected by the caller so that searches are
//! reproducible from a seed. [`mc_move`] runs the rollouts sequentially;
//! [`MonteCarlo`] spreads them over a rayon thread pool.

use crate::board::{Board, Cell, Outcome, Player};
use crate::config::MonteCarloConfig;
use crate::error::Error;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::time::Instant;
use tracing::{debug, trace};

/// Per-square score accumulator for a single move selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreGrid {
    dim: usize,
    scores: Vec<f64>,
}

impl ScoreGrid {
    /// Creates a grid of zeros for a `dim` x `dim` board.
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            scores: vec![0.0; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.dim && col < self.dim,
            "square ({row}, {col}) is off a {dim}x{dim} score grid",
            dim = self.dim
        );
        row * self.dim + col
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.scores[self.index(row, col)]
    }

    pub fn add(&mut self, row: usize, col: usize, delta: f64) {
        let idx = self.index(row, col);
        self.scores[idx] += delta;
    }

    /// Adds every score of `other` into this grid.
    pub fn merge(&mut self, other: &ScoreGrid) {
        assert_eq!(self.dim, other.dim, "cannot merge score grids of different dimensions");
        for (score, delta) in self.scores.iter_mut().zip(&other.scores) {
            *score += delta;
        }
    }

    /// Rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.scores.chunks(self.dim)
    }
}

/// Plays a random game to completion on `board`, starting with `player`.
///
/// The board is modified in place; callers pass a clone.
///
/// # Panics
/// If the board has no empty square.
pub fn mc_trial<R: Rng>(board: &mut Board, player: Player, rng: &mut R) -> Outcome {
    assert!(!board.is_full(), "cannot play out a board with no empty squares");
    let mut mover = player;
    loop {
        // An unfinished game always has an empty square left.
        let empty = board.get_empty_squares();
        let (row, col) = empty[rng.random_range(0..empty.len())];
        board.make_move(row, col, mover);
        if let Some(outcome) = board.check_win(row, col, mover) {
            return outcome;
        }
        mover = mover.other();
    }
}

/// Credits the squares of a finished rollout.
///
/// Squares held by the winner gain credit and squares held by the loser lose
/// it; empty squares are untouched. Squares of the searching `player` move by
/// `config.win_increment` and the opponent's by `config.loss_decrement`,
/// whichever side won. A drawn rollout leaves `scores` unchanged.
pub fn mc_update_scores(
    scores: &mut ScoreGrid,
    board: &Board,
    player: Player,
    outcome: Outcome,
    config: &MonteCarloConfig,
) {
    let Outcome::Winner(winner) = outcome else {
        return;
    };
    let (winner_increment, loser_decrement) = if winner == player {
        (config.win_increment, config.loss_decrement)
    } else {
        (config.loss_decrement, config.win_increment)
    };
    let (winning, losing) = (Cell::from(winner), Cell::from(winner.other()));
    for ((row, col), cell) in board.squares() {
        if cell == winning {
            scores.add(row, col, winner_increment);
        } else if cell == losing {
            scores.add(row, col, -loser_decrement);
        }
    }
}

/// Picks the best empty square of `board` according to `scores`.
///
/// The comparison floor starts at zero: when no empty square scored above
/// zero, every square sitting at zero is a candidate, and if all of them are
/// negative every empty square is. Ties are broken uniformly at random.
///
/// # Panics
/// If the board has no empty square or `scores` has a different dimension.
pub fn get_best_move<R: Rng>(board: &Board, scores: &ScoreGrid, rng: &mut R) -> (usize, usize) {
    assert_eq!(scores.dim(), board.dim(), "score grid does not match the board");
    let empty = board.get_empty_squares();
    assert!(!empty.is_empty(), "no empty squares to choose a move from");

    let best = empty
        .iter()
        .map(|&(row, col)| scores.get(row, col))
        .fold(0.0, f64::max);
    let candidates: Vec<(usize, usize)> = empty
        .iter()
        .copied()
        .filter(|&(row, col)| scores.get(row, col) >= best)
        .collect();

    let choices = if candidates.is_empty() { &empty } else { &candidates };
    choices[rng.random_range(0..choices.len())]
}

/// Chooses a move for `player` by running `config.trials` sequential
/// rollouts from `board`.
///
/// With zero trials every score stays at zero and the result is a uniformly
/// random empty square.
///
/// # Panics
/// If the board has no empty square.
pub fn mc_move<R: Rng>(board: &Board, player: Player, config: &MonteCarloConfig, rng: &mut R) -> (usize, usize) {
    let started = Instant::now();
    let mut scores = ScoreGrid::new(board.dim());
    play_trials(board, player, config, config.trials, &mut scores, rng);
    let square = get_best_move(board, &scores, rng);
    debug!(
        %player,
        trials = config.trials,
        ?square,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "selected move"
    );
    square
}

/// Runs `trials` rollouts on clones of `board` and accumulates their scores.
fn play_trials<R: Rng>(
    board: &Board,
    player: Player,
    config: &MonteCarloConfig,
    trials: u32,
    scores: &mut ScoreGrid,
    rng: &mut R,
) {
    for _ in 0..trials {
        let mut rollout = board.clone();
        let outcome = mc_trial(&mut rollout, player, rng);
        trace!(?outcome, "rollout finished");
        mc_update_scores(scores, &rollout, player, outcome, config);
    }
}

/// Splits `trials` over `workers` as evenly as possible.
fn split_trials(trials: u32, workers: usize) -> Vec<u32> {
    let workers = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
    let (base, remainder) = (trials / workers, trials % workers);
    (0..workers).map(|i| base + u32::from(i < remainder)).collect()
}

/// The parallel Monte Carlo engine.
///
/// Each worker plays its share of the rollouts on its own board clones with
/// its own generator, seeded from the caller's, and accumulates a local
/// score grid. Local grids are added into the total once a worker is done.
pub struct MonteCarlo {
    /// Search parameters.
    config: MonteCarloConfig,
    /// The rayon thread pool the rollouts run on.
    pool: ThreadPool,
}

impl MonteCarlo {
    /// Creates a new engine.
    ///
    /// # Errors
    /// If the configuration is invalid or the thread pool cannot be built.
    pub fn new(config: MonteCarloConfig) -> Result<Self, Error> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads())
            .thread_name(|i| format!("rollout-{i}"))
            .build()?;
        debug!(threads = pool.current_num_threads(), trials = config.trials, "monte carlo engine ready");
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Number of worker threads in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Runs all configured rollouts in parallel and returns the merged
    /// score grid.
    ///
    /// For a fixed `rng` state the grid is the same whatever order the
    /// workers finish in, as long as the score weights sum exactly in `f64`
    /// (true for the default weights).
    pub fn scores<R: Rng>(&self, board: &Board, player: Player, rng: &mut R) -> ScoreGrid {
        let batches: Vec<(u64, u32)> = split_trials(self.config.trials, self.threads())
            .into_iter()
            .filter(|&trials| trials > 0)
            .map(|trials| (rng.random::<u64>(), trials))
            .collect();

        let total = Mutex::new(ScoreGrid::new(board.dim()));
        self.pool.install(|| {
            batches.into_par_iter().for_each(|(seed, trials)| {
                let mut worker_rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let mut local = ScoreGrid::new(board.dim());
                play_trials(board, player, &self.config, trials, &mut local, &mut worker_rng);
                total.lock().merge(&local);
            });
        });
        total.into_inner()
    }

    /// Chooses a move for `player` from `board`.
    ///
    /// # Panics
    /// If the board has no empty square.
    pub fn select_move<R: Rng>(&self, board: &Board, player: Player, rng: &mut R) -> (usize, usize) {
        let started = Instant::now();
        let scores = self.scores(board, player, rng);
        let square = get_best_move(board, &scores, rng);
        debug!(
            %player,
            trials = self.config.trials,
            threads = self.threads(),
            ?square,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "selected move"
        );
        square
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    fn board_from(dim: usize, reverse: bool, moves: &[(usize, usize, Player)]) -> Board {
        let mut board = Board::new(dim, reverse);
        for &(row, col, player) in moves {
            assert!(board.make_move(row, col, player).is_some());
        }
        board
    }

    #[test]
    fn test_score_grid_merge() {
        let mut a = ScoreGrid::new(2);
        let mut b = ScoreGrid::new(2);
        a.add(0, 1, 2.0);
        b.add(0, 1, -0.5);
        b.add(1, 1, 3.0);
        a.merge(&b);
        assert_eq!(a.rows().collect::<Vec<_>>(), vec![&[0.0, 1.5][..], &[0.0, 3.0][..]]);
    }

    #[test]
    fn test_trial_plays_to_the_end() {
        let original = board_from(3, false, &[(1, 1, Player::X)]);
        for seed in 0..50 {
            let mut board = original.clone();
            let outcome = mc_trial(&mut board, Player::O, &mut rng(seed));
            match outcome {
                Outcome::Draw => assert!(board.is_full()),
                Outcome::Winner(_) => {}
            }
            assert_eq!(original.get_empty_squares().len(), 8);
        }
    }

    #[test]
    fn test_trial_alternates_starting_with_player() {
        // O moves first into a board where X already holds two squares.
        let mut board = board_from(3, false, &[(0, 0, Player::X), (2, 2, Player::X)]);
        let _ = mc_trial(&mut board, Player::O, &mut rng(7));
        let count = |cell| board.squares().filter(|&(_, c)| c == cell).count();
        let (xs, os) = (count(Cell::X) - 2, count(Cell::O));
        assert!(os == xs || os == xs + 1, "placed {os} O and {xs} X");
    }

    #[test]
    fn test_trial_with_one_square_left() {
        let mut board = board_from(
            3,
            false,
            &[
                (0, 0, Player::X),
                (0, 1, Player::X),
                (0, 2, Player::O),
                (1, 0, Player::O),
                (1, 1, Player::O),
                (1, 2, Player::X),
                (2, 0, Player::X),
                (2, 1, Player::O),
            ],
        );
        assert_eq!(mc_trial(&mut board, Player::O, &mut rng(1)), Outcome::Draw);
        assert_eq!(board.get_square(2, 2), Cell::O);
    }

    #[test]
    #[should_panic(expected = "no empty squares")]
    fn test_trial_on_full_board_panics() {
        let mut board = Board::new(1, false);
        board.make_move(0, 0, Player::X);
        let _ = mc_trial(&mut board, Player::O, &mut rng(0));
    }

    #[test]
    fn test_update_scores_draw_is_ignored() {
        let board = board_from(2, false, &[(0, 0, Player::X), (1, 1, Player::O)]);
        let mut scores = ScoreGrid::new(2);
        scores.add(1, 0, 4.0);
        let before = scores.clone();
        mc_update_scores(&mut scores, &board, Player::X, Outcome::Draw, &MonteCarloConfig::default());
        assert_eq!(scores, before);
    }

    #[test]
    fn test_update_scores_credits_winner_and_debits_loser() {
        let board = board_from(
            3,
            false,
            &[
                (0, 0, Player::X),
                (1, 0, Player::O),
                (0, 1, Player::X),
                (1, 1, Player::O),
                (0, 2, Player::X),
            ],
        );
        let config = MonteCarloConfig {
            win_increment: 2.0,
            loss_decrement: 0.5,
            ..MonteCarloConfig::default()
        };
        let mut scores = ScoreGrid::new(3);
        mc_update_scores(&mut scores, &board, Player::X, Outcome::Winner(Player::X), &config);
        assert_eq!(
            scores.rows().collect::<Vec<_>>(),
            vec![&[2.0, 2.0, 2.0][..], &[-0.5, -0.5, 0.0][..], &[0.0, 0.0, 0.0][..]]
        );
    }

    #[test]
    fn test_update_scores_weights_follow_the_searcher() {
        // O completes the middle row against searching X.
        let board = board_from(
            3,
            false,
            &[
                (0, 0, Player::X),
                (1, 0, Player::O),
                (0, 1, Player::X),
                (1, 1, Player::O),
                (2, 2, Player::X),
                (1, 2, Player::O),
            ],
        );
        let config = MonteCarloConfig {
            win_increment: 2.0,
            loss_decrement: 0.5,
            ..MonteCarloConfig::default()
        };

        let mut scores = ScoreGrid::new(3);
        mc_update_scores(&mut scores, &board, Player::X, Outcome::Winner(Player::O), &config);
        assert_eq!((scores.get(0, 0), scores.get(1, 0)), (-2.0, 0.5));
        assert_eq!(scores.get(2, 0), 0.0);

        // Searching as O, the same rollout is a win.
        let mut scores = ScoreGrid::new(3);
        mc_update_scores(&mut scores, &board, Player::O, Outcome::Winner(Player::O), &config);
        assert_eq!((scores.get(0, 0), scores.get(1, 0)), (-0.5, 2.0));
    }

    #[test]
    fn test_update_scores_reverse_winner() {
        // X completed the row on a reverse board, so O is the winner.
        let board = board_from(
            3,
            true,
            &[(0, 0, Player::X), (2, 2, Player::O), (0, 1, Player::X), (0, 2, Player::X)],
        );
        let mut scores = ScoreGrid::new(3);
        mc_update_scores(&mut scores, &board, Player::X, Outcome::Winner(Player::O), &MonteCarloConfig::default());
        assert_eq!(scores.get(0, 0), -1.0);
        assert_eq!(scores.get(2, 2), 1.0);
        assert_eq!(scores.get(1, 1), 0.0);
    }

    #[test]
    fn test_best_move_unique_maximum() {
        let board = board_from(2, false, &[(0, 0, Player::X)]);
        let mut scores = ScoreGrid::new(2);
        // The occupied square never wins, however high its score.
        scores.add(0, 0, 100.0);
        scores.add(1, 0, 3.0);
        scores.add(1, 1, 2.0);
        for seed in 0..20 {
            assert_eq!(get_best_move(&board, &scores, &mut rng(seed)), (1, 0));
        }
    }

    #[test]
    fn test_best_move_ties_are_all_reachable() {
        let board = Board::new(2, false);
        let mut scores = ScoreGrid::new(2);
        scores.add(0, 1, 1.0);
        scores.add(1, 0, 1.0);
        scores.add(1, 1, -1.0);
        let mut r = rng(3);
        let picks: Vec<_> = (0..200).map(|_| get_best_move(&board, &scores, &mut r)).collect();
        assert!(picks.iter().all(|&sq| sq == (0, 1) || sq == (1, 0)));
        assert!(picks.contains(&(0, 1)));
        assert!(picks.contains(&(1, 0)));
    }

    #[test]
    fn test_best_move_zero_floor() {
        let board = Board::new(2, false);
        let mut scores = ScoreGrid::new(2);
        scores.add(0, 0, -2.0);
        scores.add(0, 1, -1.0);
        let mut r = rng(5);
        for _ in 0..50 {
            let square = get_best_move(&board, &scores, &mut r);
            assert!(square == (1, 0) || square == (1, 1));
        }

        // Nothing at or above zero: every empty square is a candidate.
        let mut scores = ScoreGrid::new(2);
        for (row, col) in board.get_empty_squares() {
            scores.add(row, col, -1.0 - row as f64);
        }
        let picks: Vec<_> = (0..200).map(|_| get_best_move(&board, &scores, &mut r)).collect();
        for square in board.get_empty_squares() {
            assert!(picks.contains(&square), "{square:?} never picked");
        }
    }

    #[test]
    #[should_panic(expected = "does not match the board")]
    fn test_best_move_rejects_mismatched_grid() {
        let board = Board::new(3, false);
        let _ = get_best_move(&board, &ScoreGrid::new(2), &mut rng(0));
    }

    #[test]
    fn test_mc_move_zero_trials_returns_empty_square() {
        let board = board_from(3, false, &[(0, 0, Player::X), (1, 1, Player::O)]);
        let config = MonteCarloConfig::default().with_trials(0);
        let mut r = rng(11);
        for _ in 0..50 {
            let (row, col) = mc_move(&board, Player::X, &config, &mut r);
            assert_eq!(board.get_square(row, col), Cell::Empty);
        }
    }

    #[test]
    fn test_mc_move_is_reproducible() {
        let board = board_from(4, false, &[(0, 0, Player::X), (3, 3, Player::O)]);
        let config = MonteCarloConfig::for_testing();
        let first = mc_move(&board, Player::X, &config, &mut rng(42));
        let second = mc_move(&board, Player::X, &config, &mut rng(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_split_trials() {
        assert_eq!(split_trials(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(split_trials(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_trials(5, 0), vec![5]);
        assert_eq!(split_trials(10, 4).iter().sum::<u32>(), 10);
    }

    #[test]
    fn test_parallel_scores_match_trial_count() {
        // Every rollout of a one-square board is an immediate X win worth +1.
        let board = Board::new(1, false);
        let engine = MonteCarlo::new(MonteCarloConfig::for_testing().with_trials(37)).unwrap();
        let scores = engine.scores(&board, Player::X, &mut rng(0));
        assert_eq!(scores.dim(), 1);
        assert_eq!(scores.get(0, 0), 37.0);
    }

    #[test]
    fn test_parallel_engine_is_reproducible() {
        let board = board_from(3, false, &[(1, 1, Player::O)]);
        let engine = MonteCarlo::new(MonteCarloConfig {
            threads: 4,
            ..MonteCarloConfig::for_testing()
        })
        .unwrap();
        assert_eq!(engine.threads(), 4);
        assert_eq!(engine.config().trials, MonteCarloConfig::for_testing().trials);
        let a = engine.scores(&board, Player::X, &mut rng(9));
        let b = engine.scores(&board, Player::X, &mut rng(9));
        assert_eq!(a, b);
        assert_eq!(
            engine.select_move(&board, Player::X, &mut rng(9)),
            engine.select_move(&board, Player::X, &mut rng(9))
        );
    }

    #[test]
    fn test_engine_rejects_invalid_config() {
        let config = MonteCarloConfig {
            win_increment: -1.0,
            ..MonteCarloConfig::default()
        };
        assert!(matches!(MonteCarlo::new(config), Err(Error::Config(_))));
    }
}
