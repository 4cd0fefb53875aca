use std::fmt;
use std::str::FromStr;

use crate::{
    error::{InvalidMove, ParseBoardError},
    CELLS, SIZE,
};

/// The two competing sides
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    /// The human player, shown as `X`
    Player,
    /// The computer opponent, shown as `O`
    Opponent,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// The mark this side leaves on the board
    pub fn cell(self) -> Cell {
        match self {
            Side::Player => Cell::PlayerMark,
            Side::Opponent => Cell::OpponentMark,
        }
    }

    pub fn symbol(self) -> char {
        self.cell().symbol()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
    Empty,
    PlayerMark,
    OpponentMark,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// The side owning this mark, if any
    pub fn side(&self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::PlayerMark => Some(Side::Player),
            Cell::OpponentMark => Some(Side::Opponent),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::PlayerMark => 'X',
            Cell::OpponentMark => 'O',
        }
    }
}

/// Terminal classification of a board, always recomputed from the cells
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Outcome {
    InProgress,
    Win(Side),
    Draw,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Every row, column and diagonal, in the order they are checked
pub const WIN_LINES: [[usize; SIZE]; 8] = [
    // rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// A 3x3 board stored row-major
///
/// `Board` is a plain value: [`Board::apply`] returns a new board and leaves
/// the original untouched, so hypothetical moves can be explored on copies.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELLS],
        }
    }

    pub fn from_cells(cells: [Cell; CELLS]) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell; CELLS] {
        &self.cells
    }

    /// The cell at `index`, or `None` outside the board
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_empty(&self, index: usize) -> bool {
        self.get(index).map_or(false, |cell| cell.is_empty())
    }

    /// Returns a copy of the board with `side`'s mark on `index`
    pub fn apply(&self, index: usize, side: Side) -> Result<Self, InvalidMove> {
        match self.get(index) {
            None => Err(InvalidMove::OutOfRange(index)),
            Some(Cell::Empty) => Ok(self.play(index, side)),
            Some(_) => Err(InvalidMove::Occupied(index)),
        }
    }

    // places a mark without checking the cell, for positions known to be legal
    pub(crate) fn play(&self, index: usize, side: Side) -> Self {
        let mut next = *self;
        next.cells[index] = side.cell();
        next
    }

    /// The side owning the first fully marked line, if any
    pub fn winner(&self) -> Option<Side> {
        WIN_LINES.iter().find_map(|&[a, b, c]| {
            let cell = self.cells[a];
            if cell == self.cells[b] && cell == self.cells[c] {
                cell.side()
            } else {
                None
            }
        })
    }

    pub fn outcome(&self) -> Outcome {
        match self.winner() {
            Some(side) => Outcome::Win(side),
            None if self.is_full() => Outcome::Draw,
            None => Outcome::InProgress,
        }
    }

    /// All empty cell indices in ascending order
    pub fn legal_moves(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(index, _)| index)
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    /// Number of marks `side` has placed
    pub fn count(&self, side: Side) -> usize {
        let mark = side.cell();
        self.cells.iter().filter(|&&cell| cell == mark).count()
    }

    /// The side whose turn it is, given which side opened the game
    pub fn side_to_move(&self, first: Side) -> Side {
        if self.count(first) > self.count(first.opponent()) {
            first.opponent()
        } else {
            first
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses nine row-major cells: `X`, `O`, and `_`, `.` or `-` for empty
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let found = s.chars().count();
        if found != CELLS {
            return Err(ParseBoardError::WrongLength { found });
        }

        let mut cells = [Cell::Empty; CELLS];
        for (cell, c) in cells.iter_mut().zip(s.chars()) {
            *cell = match c.to_ascii_uppercase() {
                'X' => Cell::PlayerMark,
                'O' => Cell::OpponentMark,
                '_' | '.' | '-' => Cell::Empty,
                other => return Err(ParseBoardError::UnknownCell(other)),
            };
        }
        Ok(Self { cells })
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, cells) in self.cells.chunks(SIZE).enumerate() {
            if row > 0 {
                writeln!(f)?;
            }
            for cell in cells {
                write!(f, "{}", cell.symbol())?;
            }
        }
        Ok(())
    }
}
