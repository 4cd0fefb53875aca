use thiserror::Error;

/// A move that cannot be applied to the board
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum InvalidMove {
    #[error("Invalid move, cell {0} is already occupied")]
    Occupied(usize),

    #[error("Invalid move, cell {0} out of range. Cells must be between 0 and 8")]
    OutOfRange(usize),
}

/// Errors from parsing a board string such as `"XO_O_X___"`
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseBoardError {
    #[error("expected 9 cells, found {found}")]
    WrongLength { found: usize },

    #[error("could not parse '{0}' as a cell")]
    UnknownCell(char),
}

/// Errors from driving a [`GameSession`](crate::session::GameSession)
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionError {
    #[error(transparent)]
    InvalidMove(#[from] InvalidMove),

    #[error("The game is over, start a new game to keep playing")]
    GameOver,

    #[error("It is not the player's turn")]
    NotPlayerTurn,

    #[error("It is not the computer's turn")]
    NotComputerTurn,

    #[error("The board changed while the computer was searching")]
    StaleSearch,
}
