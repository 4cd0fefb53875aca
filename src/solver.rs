//! An agent to solve the game of Tic-Tac-Toe

use tracing::debug;

use crate::board::{Board, Outcome, Side};

use std::cmp::Ordering;

/// The score of a win for the computer on the ply right after its move
pub const WIN_SCORE: i32 = 10;
/// The score of a drawn position
pub const DRAW_SCORE: i32 = 0;

/// An agent to solve Tic-Tac-Toe positions
///
/// # Notes
/// This agent runs a plain minimax search over the full game tree, with no
/// pruning and no transposition table; the 3x3 tree is small enough to search
/// completely from any position.
///
/// # Position Scoring
/// Scores are from the computer's point of view. A finished game is scored
/// `10 - depth` for a computer win, `depth - 10` for a computer loss and `0`
/// for a draw, where `depth` counts the plies played after the computer's
/// candidate move. Faster wins therefore score higher than slower ones and
/// slower losses score higher than faster ones.
#[derive(Clone)]
pub struct Solver {
    board: Board,
    computer: Side,

    /// The number of positions searched by this `Solver` so far (for diagnostics only)
    pub node_count: usize,
}

impl Solver {
    /// Creates a new `Solver` choosing moves for `computer` on `board`
    pub fn new(board: Board, computer: Side) -> Self {
        Self {
            board,
            computer,
            node_count: 0,
        }
    }

    /// Performs game tree search
    ///
    /// Returns the score of the position (see [Position Scoring]), with the computer
    /// to move if `maximizing` is set and its opponent to move otherwise
    ///
    /// [Position Scoring]: #position-scoring
    pub fn evaluate(&mut self, board: Board, depth: i32, maximizing: bool) -> i32 {
        self.node_count += 1;

        match board.outcome() {
            Outcome::Win(side) if side == self.computer => return WIN_SCORE - depth,
            Outcome::Win(_) => return depth - WIN_SCORE,
            Outcome::Draw => return DRAW_SCORE,
            Outcome::InProgress => {}
        }

        let (side, mut best) = if maximizing {
            (self.computer, i32::MIN)
        } else {
            (self.computer.opponent(), i32::MAX)
        };

        // every child has one fewer empty cell, so the recursion is at most 9 deep
        for index in board.legal_moves() {
            let score = self.evaluate(board.play(index, side), depth + 1, !maximizing);
            best = if maximizing {
                best.max(score)
            } else {
                best.min(score)
            };
        }
        best
    }

    /// Calculate the score and best move of the current position
    ///
    /// Moves are tried in ascending cell order and only a strictly better score
    /// replaces the current best, so ties go to the lowest cell index.
    /// Returns `None` if there is no empty cell left to play.
    ///
    /// # Panics
    /// Debug builds panic if the board is already won but still has empty cells.
    pub fn solve(&mut self) -> Option<(i32, usize)> {
        debug_assert!(
            !self.board.outcome().is_terminal() || self.board.is_full(),
            "searching a finished game"
        );
        self.node_count += 1;

        let board = self.board;
        let mut best: Option<(i32, usize)> = None;
        for index in board.legal_moves() {
            // the opponent replies to the candidate move
            let score = self.evaluate(board.play(index, self.computer), 0, false);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((score, index));
            }
        }

        debug!(
            computer = ?self.computer,
            nodes = self.node_count,
            ?best,
            "search complete"
        );
        best
    }

    /// Converts a root score from [`Solver::solve`] to the number of plies left
    /// in the game under perfect play, counting the computer's own move
    pub fn score_to_win_distance(&self, score: i32) -> usize {
        match score.cmp(&DRAW_SCORE) {
            Ordering::Equal => self.board.legal_moves().count(),
            Ordering::Greater => (WIN_SCORE + 1 - score) as usize,
            Ordering::Less => (WIN_SCORE + 1 + score) as usize,
        }
    }
}

/// Returns the optimal cell for `computer` to play on `board`
///
/// Panics in debug builds on a won board, see [`Solver::solve`].
pub fn best_move(board: &Board, computer: Side) -> Option<usize> {
    Solver::new(*board, computer).solve().map(|(_, index)| index)
}

/// Scores `board` for `computer` at the given search depth (see [`Solver::evaluate`])
pub fn evaluate(board: &Board, computer: Side, depth: i32, maximizing: bool) -> i32 {
    Solver::new(*board, computer).evaluate(*board, depth, maximizing)
}
