use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::cmp::Ordering;
use std::path::Path;

use tictactoe_ai::{
    tablebase::{Tablebase, TABLEBASE_PATH},
    *,
};

mod cli;
use cli::{Cli, Command, TablebaseAction};

mod terminal;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Command::Play {
        computer_first: false,
    }) {
        Command::Play { computer_first } => play(computer_first),
        Command::Analyse { board, side } => analyse(&board, side.into()),
        Command::Tablebase { action } => match action {
            TablebaseAction::Generate { path } => generate_tablebase(&path),
            TablebaseAction::Check { path } => check_tablebase(&path),
        },
    }
}

fn play(computer_first: bool) -> Result<()> {
    let first = if computer_first {
        GameSession::COMPUTER
    } else {
        GameSession::HUMAN
    };
    let mut session = GameSession::new(first);

    println!("Welcome to Tic-Tac-Toe\n");
    println!(
        "You are {}, the computer is {}",
        GameSession::HUMAN.symbol(),
        GameSession::COMPUTER.symbol()
    );

    // game loop
    loop {
        terminal::draw(session.board())?;

        match session.phase() {
            Phase::AwaitingPlayerMove => {
                let input = terminal::read_line("Move input (1-9) > ")?;
                let cell = match input.trim().parse::<usize>() {
                    Ok(cell @ 1..=CELLS) => cell,
                    _ => {
                        println!("Invalid cell: {}", input.trim());
                        continue;
                    }
                };

                match session.play(cell - 1) {
                    Ok(_) => {}
                    Err(SessionError::InvalidMove(InvalidMove::Occupied(_))) => {
                        println!("Cell {} is already taken", cell);
                    }
                    Err(err) => println!("{}", err),
                }
            }
            Phase::AwaitingComputerMove => {
                println!("Computer is thinking...");
                let index = session.computer_turn()?;
                println!("Computer plays {}", index + 1);
            }

            // end states
            Phase::Terminal(outcome) => {
                match outcome {
                    Outcome::Win(Side::Player) => println!("You win!"),
                    Outcome::Win(Side::Opponent) => println!("Computer wins!"),
                    _ => println!("It's a draw!"),
                }
                if !terminal::ask_yes_no("Play again? y/n: ")? {
                    break;
                }
                session.reset();
            }
        }
    }
    Ok(())
}

fn analyse(input: &str, side: Side) -> Result<()> {
    let board: Board = input.parse()?;
    terminal::draw(&board)?;

    match board.outcome() {
        Outcome::InProgress => {}
        Outcome::Win(winner) => {
            println!("Game over, {} has won", winner.symbol());
            return Ok(());
        }
        Outcome::Draw => {
            println!("Game over, drawn");
            return Ok(());
        }
    }

    let mut solver = Solver::new(board, side);
    let (score, best_move) = solver
        .solve()
        .ok_or_else(|| anyhow!("no empty cell to play"))?;

    let win_distance = solver.score_to_win_distance(score);
    let move_string = if win_distance == 1 { "move" } else { "moves" };
    match score.cmp(&0) {
        Ordering::Greater => println!(
            "{} can force a win in at most {} {}.",
            side.symbol(),
            win_distance,
            move_string
        ),
        Ordering::Less => println!(
            "{} can force a win in at most {} {}.",
            side.opponent().symbol(),
            win_distance,
            move_string
        ),
        Ordering::Equal => println!(
            "{} can at best force a draw, {} {} remaining",
            side.symbol(),
            win_distance,
            move_string
        ),
    }
    println!("Best move: {}", best_move + 1);
    println!("Positions searched: {}", solver.node_count);

    if Path::new(TABLEBASE_PATH).exists() {
        let table = Tablebase::load(TABLEBASE_PATH)?;
        match table.get(&board, side) {
            Some(entry) if (entry.score as i32, entry.best_move as usize) == (score, best_move) => {
                println!("Tablebase agrees")
            }
            Some(entry) => println!(
                "Tablebase disagrees: score {}, best move {}",
                entry.score,
                entry.best_move + 1
            ),
            None => println!("Position not in tablebase"),
        }
    }
    Ok(())
}

fn generate_tablebase(path: &Path) -> Result<()> {
    let table = Tablebase::generate(true);
    print!("Writing out {} positions to {} ... ", table.len(), path.display());
    table.write(path)?;
    println!("Complete");
    info!(path = %path.display(), "tablebase written");
    Ok(())
}

fn check_tablebase(path: &Path) -> Result<()> {
    let table = Tablebase::load(path)?;
    let mismatches = table.check(true);

    for entry in mismatches.iter() {
        println!("Mismatch: {:?}", entry);
    }
    if !mismatches.is_empty() {
        return Err(anyhow!(
            "{} of {} positions disagree with the search",
            mismatches.len(),
            table.len()
        ));
    }
    println!("All {} positions agree with the search", table.len());
    Ok(())
}
