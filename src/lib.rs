//! A perfect agent for playing the board game 'Tic-Tac-Toe'
//!
//! This agent exhaustively searches the game tree to find the
//! mathematically optimal move for any position.
//!
//! # Basic Usage
//!
//! ```
//! use tictactoe_ai::{board::{Board, Side}, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let board: Board = "OO_XX____".parse()?;
//! let mut solver = Solver::new(board, Side::Opponent);
//!
//! assert_eq!(solver.solve(), Some((10, 2)));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod error;

pub mod board;

pub mod solver;

pub mod session;

pub mod tablebase;

mod test;

pub use board::{Board, Cell, Outcome, Side};
pub use error::{InvalidMove, ParseBoardError, SessionError};
pub use session::{GameSession, Phase, SearchRequest};
pub use solver::Solver;

/// The width and height of the game board in cells
pub const SIZE: usize = 3;

/// The number of cells on the game board
pub const CELLS: usize = SIZE * SIZE;

// a tablebase code packs two bits per cell plus the side to move into a u32
const_assert!(2 * CELLS + 1 <= 32);

/// Returns an empty board for the start of a game
pub fn new_game() -> Board {
    Board::new()
}

/// Returns an empty board, discarding whatever game was in progress
pub fn reset() -> Board {
    new_game()
}

/// Places `side`'s mark on `index`, failing if the cell is not empty
pub fn apply(board: &Board, index: usize, side: Side) -> Result<Board, InvalidMove> {
    board.apply(index, side)
}

/// Classifies `board` as won, drawn or still in progress
pub fn outcome(board: &Board) -> Outcome {
    board.outcome()
}

/// Returns the optimal cell for `computer` to play, or `None` if the board has no empty cell
///
/// The board must be [`Outcome::InProgress`]; callers check [`outcome`] first.
///
/// # Panics
/// Debug builds panic if the board is already won but still has empty cells.
/// Release builds skip that check and search the position anyway.
pub fn best_move(board: &Board, computer: Side) -> Option<usize> {
    solver::best_move(board, computer)
}
