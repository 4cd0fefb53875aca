//! Command-line interface for the tictactoe binary.

use clap::{Parser, Subcommand, ValueEnum};
use tictactoe_ai::{tablebase::TABLEBASE_PATH, Side};

use std::path::PathBuf;

/// Play Tic-Tac-Toe against a computer that never loses
#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(version)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug", "tictactoe_ai=trace")
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Subcommand to run, defaults to `play`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game in the terminal
    Play {
        /// Let the computer make the opening move
        #[arg(long)]
        computer_first: bool,
    },

    /// Print the solved score and best move of a position
    Analyse {
        /// Nine row-major cells, e.g. "OO_XX____" (X, O, and _ . or - for empty)
        board: String,

        /// The side to move
        #[arg(long, value_enum, default_value = "opponent")]
        side: SideArg,
    },

    /// Build or verify the table of solved positions
    Tablebase {
        #[command(subcommand)]
        action: TablebaseAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum TablebaseAction {
    /// Solve every reachable position and write the table to disk
    Generate {
        #[arg(long, default_value = TABLEBASE_PATH)]
        path: PathBuf,
    },

    /// Re-solve every stored position and report disagreements
    Check {
        #[arg(long, default_value = TABLEBASE_PATH)]
        path: PathBuf,
    },
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum SideArg {
    /// X
    Player,
    /// O
    Opponent,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Player => Side::Player,
            SideArg::Opponent => Side::Opponent,
        }
    }
}
