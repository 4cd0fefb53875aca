//! A table of every reachable position with its solved score and best move
//!
//! The table is an analysis artefact: it is generated offline from the
//! [`Solver`] and never consulted by the search itself.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use indicatif::*;
use rayon::prelude::*;
use tracing::{debug, info};

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use crate::{
    board::{Board, Cell, Side},
    solver::Solver,
    CELLS,
};

pub const TABLEBASE_PATH: &str = "tablebase.bin";

// cells take bits 0..18, two bits each
const SIDE_TO_MOVE_BIT: u32 = 1 << (2 * CELLS);

/// Upper bound on entries: every filling of the cells, with either side to move
pub const MAX_ENTRIES: usize = 2 * 3usize.pow(CELLS as u32);

/// Packs a board and the side to move into a unique code
pub fn position_code(board: &Board, side: Side) -> u32 {
    let code = board
        .cells()
        .iter()
        .enumerate()
        .fold(0u32, |code, (i, cell)| {
            let bits: u32 = match cell {
                Cell::Empty => 0b00,
                Cell::PlayerMark => 0b01,
                Cell::OpponentMark => 0b10,
            };
            code | bits << (2 * i)
        });

    match side {
        Side::Player => code,
        Side::Opponent => code | SIDE_TO_MOVE_BIT,
    }
}

/// Unpacks a code made by [`position_code`]
pub fn decode_position(code: u32) -> Option<(Board, Side)> {
    if code >> (2 * CELLS + 1) != 0 {
        return None;
    }

    let mut cells = [Cell::Empty; CELLS];
    for (i, cell) in cells.iter_mut().enumerate() {
        *cell = match (code >> (2 * i)) & 0b11 {
            0b00 => Cell::Empty,
            0b01 => Cell::PlayerMark,
            0b10 => Cell::OpponentMark,
            _ => return None,
        };
    }
    let side = if code & SIDE_TO_MOVE_BIT == 0 {
        Side::Player
    } else {
        Side::Opponent
    };
    Some((Board::from_cells(cells), side))
}

/// Every distinct board reachable from the empty board when `first` opens,
/// finished games included
pub fn reachable_positions(first: Side) -> Vec<Board> {
    let mut seen = HashSet::new();
    let mut positions = Vec::new();
    let mut stack = vec![Board::new()];

    while let Some(board) = stack.pop() {
        if !seen.insert(board) {
            continue;
        }
        positions.push(board);

        if board.outcome().is_terminal() {
            continue;
        }
        let side = board.side_to_move(first);
        stack.extend(board.legal_moves().map(|index| board.play(index, side)));
    }
    positions
}

/// A solved position
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Entry {
    pub code: u32,
    /// Root score for the side to move (see [`Solver`])
    pub score: i8,
    pub best_move: u8,
}

impl Entry {
    fn solve(board: Board, side: Side) -> Option<Self> {
        if board.outcome().is_terminal() {
            return None;
        }
        let (score, index) = Solver::new(board, side).solve()?;
        Some(Self {
            code: position_code(&board, side),
            score: score as i8,
            best_move: index as u8,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Tablebase {
    // sorted by code
    entries: Vec<Entry>,
}

impl Tablebase {
    /// Solves every unfinished position reachable with either side opening
    pub fn generate(show_progress: bool) -> Self {
        let start = Instant::now();

        let mut positions: Vec<(u32, Board, Side)> = [Side::Player, Side::Opponent]
            .iter()
            .flat_map(|&first| {
                reachable_positions(first)
                    .into_iter()
                    .filter(|board| !board.outcome().is_terminal())
                    .map(move |board| {
                        let side = board.side_to_move(first);
                        (position_code(&board, side), board, side)
                    })
            })
            .collect();
        // boards with equal mark counts appear once per opener, with different sides to move
        positions.sort_unstable_by_key(|&(code, _, _)| code);
        positions.dedup_by_key(|&mut (code, _, _)| code);
        debug!(positions = positions.len(), "enumerated positions");

        let progress = progress_bar("Solving positions", positions.len(), show_progress);
        let entries: Vec<Entry> = positions
            .par_iter()
            .filter_map(|&(_, board, side)| {
                let entry = Entry::solve(board, side);
                progress.inc(1);
                entry
            })
            .collect();
        progress.finish();

        info!(
            entries = entries.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "tablebase generated"
        );
        Self { entries }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = BufReader::new(File::open(path.as_ref())?);

        let len = file.read_u32::<BigEndian>()? as usize;
        if len > MAX_ENTRIES {
            return Err(anyhow!(
                "tablebase header claims {} entries, at most {} positions exist",
                len,
                MAX_ENTRIES
            ));
        }
        let mut entries = Vec::with_capacity(len);
        for _ in 0..len {
            let entry = Entry {
                code: file.read_u32::<BigEndian>()?,
                score: file.read_i8()?,
                best_move: file.read_u8()?,
            };
            if decode_position(entry.code).is_none() || entry.best_move as usize >= CELLS {
                return Err(anyhow!("corrupt tablebase entry: {:?}", entry));
            }
            entries.push(entry);
        }

        if entries.windows(2).any(|pair| pair[0].code >= pair[1].code) {
            return Err(anyhow!("tablebase entries are not sorted"));
        }
        debug!(entries = entries.len(), path = %path.as_ref().display(), "tablebase loaded");
        Ok(Self { entries })
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut file = BufWriter::new(File::create(path.as_ref())?);

        file.write_u32::<BigEndian>(self.entries.len() as u32)?;
        for entry in self.entries.iter() {
            file.write_u32::<BigEndian>(entry.code)?;
            file.write_i8(entry.score)?;
            file.write_u8(entry.best_move)?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn get(&self, board: &Board, side: Side) -> Option<Entry> {
        let code = position_code(board, side);
        self.entries
            .binary_search_by_key(&code, |entry| entry.code)
            .ok()
            .map(|i| self.entries[i])
    }

    /// Re-solves every entry and returns the ones that disagree with the search
    pub fn check(&self, show_progress: bool) -> Vec<Entry> {
        let progress = progress_bar("Checking positions", self.entries.len(), show_progress);
        let mismatches = self
            .entries
            .par_iter()
            .filter(|entry| {
                let live = decode_position(entry.code)
                    .and_then(|(board, side)| Entry::solve(board, side));
                progress.inc(1);
                live.as_ref() != Some(*entry)
            })
            .copied()
            .collect();
        progress.finish();
        mismatches
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn progress_bar(label: &str, len: usize, visible: bool) -> ProgressBar {
    let progress = if visible {
        ProgressBar::new(len as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}: {{bar:40.cyan/blue}} {{pos}}/{{len}} ~{{eta}} remaining",
                label
            ))
            .progress_chars("█▓▒░  "),
    );
    progress
}
