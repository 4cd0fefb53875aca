//! A single human-versus-computer game and its turn order

use tracing::{info, warn};

use crate::{
    board::{Board, Outcome, Side},
    error::SessionError,
    solver,
};

/// Where a game stands between moves
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Phase {
    AwaitingPlayerMove,
    AwaitingComputerMove,
    /// The game is over; only [`GameSession::reset`] leaves this phase
    Terminal(Outcome),
}

/// A snapshot of the board handed to the search, possibly on another thread
///
/// The result must be handed back through [`GameSession::commit`], which rejects
/// it if the session's board changed in the meantime.
#[derive(Copy, Clone, Debug)]
pub struct SearchRequest {
    board: Board,
    computer: Side,
    generation: u64,
}

impl SearchRequest {
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Runs the search, returning the cell for the computer to play
    pub fn solve(&self) -> Option<usize> {
        solver::best_move(&self.board, self.computer)
    }
}

/// Owns the authoritative board of one game and enforces turn order
///
/// The human always plays [`Side::Player`] and the computer [`Side::Opponent`].
#[derive(Clone, Debug)]
pub struct GameSession {
    board: Board,
    first: Side,
    phase: Phase,
    // bumped on every change to `board`, to detect stale searches
    generation: u64,
}

impl GameSession {
    pub const HUMAN: Side = Side::Player;
    pub const COMPUTER: Side = Side::Opponent;

    /// Starts a game in which `first` makes the opening move
    pub fn new(first: Side) -> Self {
        let mut session = Self {
            board: Board::new(),
            first,
            phase: Phase::AwaitingPlayerMove,
            generation: 0,
        };
        session.reset();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    /// Clears the board and returns to the opening move of a new game
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.generation += 1;
        self.phase = self.turn_phase(self.first);
        info!(first = ?self.first, "new game");
    }

    /// Plays the human's move on `index`
    pub fn play(&mut self, index: usize) -> Result<Phase, SessionError> {
        match self.phase {
            Phase::AwaitingPlayerMove => {}
            Phase::AwaitingComputerMove => return Err(SessionError::NotPlayerTurn),
            Phase::Terminal(_) => return Err(SessionError::GameOver),
        }

        let board = self.board.apply(index, Self::HUMAN).map_err(|err| {
            warn!(%err, "rejected player move");
            err
        })?;
        Ok(self.advance(board, Self::HUMAN))
    }

    /// Searches for and plays the computer's move, returning the chosen cell
    pub fn computer_turn(&mut self) -> Result<usize, SessionError> {
        let request = self.search_request()?;
        // an in-progress board always has an empty cell
        let index = request.solve().ok_or(SessionError::GameOver)?;
        self.commit(&request, index)?;
        Ok(index)
    }

    /// Snapshots the board for a computer search that may run elsewhere
    pub fn search_request(&self) -> Result<SearchRequest, SessionError> {
        match self.phase {
            Phase::AwaitingComputerMove => Ok(SearchRequest {
                board: self.board,
                computer: Self::COMPUTER,
                generation: self.generation,
            }),
            Phase::AwaitingPlayerMove => Err(SessionError::NotComputerTurn),
            Phase::Terminal(_) => Err(SessionError::GameOver),
        }
    }

    /// Applies the result of a search, if the board is still the one searched
    pub fn commit(&mut self, request: &SearchRequest, index: usize) -> Result<Phase, SessionError> {
        if request.generation != self.generation || request.board != self.board {
            warn!(
                searched = request.generation,
                current = self.generation,
                "discarding stale search result"
            );
            return Err(SessionError::StaleSearch);
        }
        if let Phase::Terminal(_) = self.phase {
            return Err(SessionError::GameOver);
        }

        let board = self.board.apply(index, Self::COMPUTER)?;
        Ok(self.advance(board, Self::COMPUTER))
    }

    fn advance(&mut self, board: Board, mover: Side) -> Phase {
        self.board = board;
        self.generation += 1;

        self.phase = match self.board.outcome() {
            Outcome::InProgress => self.turn_phase(mover.opponent()),
            outcome => {
                info!(?outcome, "game over");
                Phase::Terminal(outcome)
            }
        };
        self.phase
    }

    fn turn_phase(&self, side: Side) -> Phase {
        if side == Self::HUMAN {
            Phase::AwaitingPlayerMove
        } else {
            Phase::AwaitingComputerMove
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameSession::HUMAN)
    }
}
