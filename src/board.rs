//! # Board Model
//!
//! An N×N tic-tac-toe board with an optional reverse rule, under which
//! completing a line loses instead of wins.
//!
//! ## Rules
//! - Players alternate placing their marker on any empty square
//! - A line is `dim` consecutive markers in a row, column or either diagonal
//! - Normal mode: the player completing a line wins
//! - Reverse mode: the player completing a line loses
//! - The game is a draw if the board fills up with no line completed
//!
//! Win detection only looks at the lines through the last placed marker (see
//! the `line-scan` crate), which keeps the per-move check at O(dim) for the
//! Monte Carlo rollouts that call it after every simulated placement.

use crate::error::ParseError;
use std::fmt;
use std::str::FromStr;

/// Line printed between rows. Nine dashes at every board size.
pub const ROW_SEPARATOR: &str = "---------";

/// One of the two player markers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Player {
    X,
    O,
}

impl Player {
    /// The opponent's marker.
    pub fn other(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::X => f.write_str("X"),
            Player::O => f.write_str("O"),
        }
    }
}

impl FromStr for Player {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Player::X),
            "O" | "o" => Ok(Player::O),
            other => Err(ParseError::Player(other.to_string())),
        }
    }
}

/// Content of a single square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    X,
    O,
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::X => Cell::X,
            Player::O => Cell::O,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => f.write_str(" "),
            Cell::X => f.write_str("X"),
            Cell::O => f.write_str("O"),
        }
    }
}

/// Result of a finished game. `Draw` is never stored in a square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
    Winner(Player),
    Draw,
}

impl Outcome {
    /// The winning player, if the game was not drawn.
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Winner(player) => Some(player),
            Outcome::Draw => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{player} wins"),
            Outcome::Draw => f.write_str("Draw"),
        }
    }
}

/// Represents the complete state of a tic-tac-toe game.
///
/// The grid is a flat, row-major vector of `dim * dim` squares. Cloning a
/// board copies the grid, so a clone can be played out without touching the
/// original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Number of rows (and columns)
    dim: usize,
    /// Whether completing a line loses instead of wins
    reverse: bool,
    /// The squares, row-major
    cells: Vec<Cell>,
}

impl Board {
    /// Creates an empty board.
    ///
    /// # Panics
    /// If `dim` is zero.
    pub fn new(dim: usize, reverse: bool) -> Self {
        assert!(dim > 0, "board dimension must be at least 1");
        Self {
            dim,
            reverse,
            cells: vec![Cell::Empty; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.dim && col < self.dim,
            "square ({row}, {col}) is off a {dim}x{dim} board",
            dim = self.dim
        );
        row * self.dim + col
    }

    /// Returns the content of a square.
    ///
    /// # Panics
    /// If `row` or `col` is not below the board dimension.
    pub fn get_square(&self, row: usize, col: usize) -> Cell {
        self.cells[self.index(row, col)]
    }

    /// All empty squares as `(row, col)`, in row-major order.
    pub fn get_empty_squares(&self) -> Vec<(usize, usize)> {
        self.squares()
            .filter(|&(_, cell)| cell == Cell::Empty)
            .map(|(square, _)| square)
            .collect()
    }

    /// Iterates over every square with its coordinates, row-major.
    pub fn squares(&self) -> impl Iterator<Item = ((usize, usize), Cell)> + '_ {
        let dim = self.dim;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, &cell)| ((idx / dim, idx % dim), cell))
    }

    pub fn is_full(&self) -> bool {
        !self.cells.contains(&Cell::Empty)
    }

    /// Returns an independent copy of the board.
    pub fn get_board(&self) -> Board {
        self.clone()
    }

    /// Places `player`'s marker at `(row, col)`.
    ///
    /// Returns the square if the move was made, or `None` if the square was
    /// already occupied, in which case the board is unchanged.
    ///
    /// # Panics
    /// If the square is off the board.
    pub fn make_move(&mut self, row: usize, col: usize, player: Player) -> Option<(usize, usize)> {
        let idx = self.index(row, col);
        if self.cells[idx] != Cell::Empty {
            return None;
        }
        self.cells[idx] = player.into();
        Some((row, col))
    }

    /// Determines the game status after `player` moved to `(row, col)`.
    ///
    /// Only the lines through `(row, col)` are checked, so the result is only
    /// meaningful when `(row, col)` is the most recent move. Returns `None`
    /// while the game is in progress.
    pub fn check_win(&self, row: usize, col: usize, player: Player) -> Option<Outcome> {
        // Validates the coordinates before the unchecked scan.
        let _ = self.index(row, col);
        if line_scan::completes_line(&self.cells, self.dim, row, col, &Cell::from(player)) {
            let winner = if self.reverse { player.other() } else { player };
            return Some(Outcome::Winner(winner));
        }
        if self.is_full() {
            Some(Outcome::Draw)
        } else {
            None
        }
    }
}

impl fmt::Display for Board {
    /// Squares are joined by `" | "` and rows by [`ROW_SEPARATOR`], e.g. for a
    /// 3x3 board:
    ///
    /// ```text
    /// X | O | X
    /// ---------
    ///   | X | O
    /// ---------
    /// O |   | X
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dim {
            if row > 0 {
                write!(f, "\n{ROW_SEPARATOR}\n")?;
            }
            for col in 0..self.dim {
                if col > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{}", self.get_square(row, col))?;
            }
        }
        Ok(())
    }
}

/// Parses a square written as `r,c` or `r c`.
pub fn parse_square(s: &str) -> Result<(usize, usize), ParseError> {
    let parts: Vec<&str> = s
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .filter(|part| !part.is_empty())
        .collect();
    let [row, col] = parts.as_slice() else {
        return Err(ParseError::Square(s.to_string()));
    };
    let row = row.parse().map_err(|_| ParseError::Square(s.to_string()))?;
    let col = col.parse().map_err(|_| ParseError::Square(s.to_string()))?;
    Ok((row, col))
}
