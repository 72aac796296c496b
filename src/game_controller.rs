//! # Game Controller Module - Human vs Computer Session
//!
//! The `GameController` owns the authoritative board and the state of a
//! human-vs-computer session: who plays which marker, whose turn it is,
//! whether the next game uses the reverse rule and how the current game
//! ended. Front ends only translate input into controller calls and render
//! what the controller reports.
//!
//! ## Session Rules
//! - X always moves first
//! - Clicking (or typing) an occupied square does nothing and the turn stays
//! - New game, switching sides and toggling the reverse rule are only
//!   available once the current game is over
//! - A reverse toggle applies from the next new game

use crate::board::{Board, Outcome, Player};
use crate::error::ControllerError;
use crate::montecarlo::MonteCarlo;
use rand::Rng;
use tracing::{debug, info};

/// Result of attempting to play a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The move was applied
    Played {
        /// The square played
        square: (usize, usize),
        /// Player who made the move
        player: Player,
        /// Outcome if the move ended the game
        outcome: Option<Outcome>,
    },
    /// The square is taken; nothing changed and the turn did not pass
    Occupied,
    /// It is the other side's turn
    NotYourTurn,
    /// The game is already over, no more moves allowed
    GameOver,
}

/// The central session controller.
#[derive(Debug, Clone)]
pub struct GameController {
    /// The authoritative board
    board: Board,
    /// Marker played by the human
    human: Player,
    /// Reverse setting used when the next game starts
    reverse_next: bool,
    /// Marker whose turn it is
    to_move: Player,
    /// Outcome once the game is over
    outcome: Option<Outcome>,
    /// Moves played in the current game
    moves: usize,
}

impl GameController {
    /// Starts a session with a fresh game. X moves first, so the computer
    /// opens when the human plays O.
    pub fn new(dim: usize, reverse: bool, human: Player) -> Self {
        info!(dim, reverse, %human, "starting session");
        Self {
            board: Board::new(dim, reverse),
            human,
            reverse_next: reverse,
            to_move: Player::X,
            outcome: None,
            moves: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human(&self) -> Player {
        self.human
    }

    pub fn computer(&self) -> Player {
        self.human.other()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// True while the game is running and waiting for the human.
    pub fn is_human_turn(&self) -> bool {
        !self.is_game_over() && self.to_move == self.human
    }

    /// Reverse setting the next new game will use.
    pub fn reverse_next_game(&self) -> bool {
        self.reverse_next
    }

    /// Number of moves played in the current game.
    pub fn move_count(&self) -> usize {
        self.moves
    }

    /// Plays the human's move at `(row, col)`.
    ///
    /// # Errors
    /// If the square is off the board.
    pub fn human_move(&mut self, row: usize, col: usize) -> Result<MoveResult, ControllerError> {
        let dim = self.board.dim();
        if row >= dim || col >= dim {
            return Err(ControllerError::OffBoard { row, col, dim });
        }
        if self.is_game_over() {
            return Ok(MoveResult::GameOver);
        }
        if self.to_move != self.human {
            return Ok(MoveResult::NotYourTurn);
        }
        Ok(self.play(row, col))
    }

    /// Lets `engine` choose and play the computer's move.
    pub fn computer_move<R: Rng>(&mut self, engine: &MonteCarlo, rng: &mut R) -> MoveResult {
        if self.is_game_over() {
            return MoveResult::GameOver;
        }
        if self.to_move == self.human {
            return MoveResult::NotYourTurn;
        }
        let (row, col) = engine.select_move(&self.board, self.computer(), rng);
        self.play(row, col)
    }

    fn play(&mut self, row: usize, col: usize) -> MoveResult {
        let player = self.to_move;
        if self.board.make_move(row, col, player).is_none() {
            debug!(row, col, "square already taken");
            return MoveResult::Occupied;
        }
        self.moves += 1;
        let outcome = self.board.check_win(row, col, player);
        debug!(%player, row, col, ?outcome, "move played");
        match outcome {
            Some(result) => {
                info!(%result, moves = self.moves, "game over");
                self.outcome = Some(result);
            }
            None => self.to_move = player.other(),
        }
        MoveResult::Played {
            square: (row, col),
            player,
            outcome,
        }
    }

    fn ensure_finished(&self) -> Result<(), ControllerError> {
        if self.is_game_over() {
            Ok(())
        } else {
            Err(ControllerError::GameInProgress)
        }
    }

    /// Starts the next game with the current sides and reverse setting.
    ///
    /// # Errors
    /// If the current game is still in progress.
    pub fn new_game(&mut self) -> Result<(), ControllerError> {
        self.ensure_finished()?;
        self.board = Board::new(self.board.dim(), self.reverse_next);
        self.to_move = Player::X;
        self.outcome = None;
        self.moves = 0;
        info!(reverse = self.reverse_next, human = %self.human, "new game");
        Ok(())
    }

    /// Swaps the human's and the computer's markers for the next game.
    ///
    /// # Errors
    /// If the current game is still in progress.
    pub fn switch_sides(&mut self) -> Result<Player, ControllerError> {
        self.ensure_finished()?;
        self.human = self.human.other();
        debug!(human = %self.human, "switched sides");
        Ok(self.human)
    }

    /// Flips the reverse rule for the next game.
    ///
    /// # Errors
    /// If the current game is still in progress.
    pub fn toggle_reverse(&mut self) -> Result<bool, ControllerError> {
        self.ensure_finished()?;
        self.reverse_next = !self.reverse_next;
        debug!(reverse = self.reverse_next, "toggled reverse rule");
        Ok(self.reverse_next)
    }
}
