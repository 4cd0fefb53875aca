use anyhow::{anyhow, Result};
use crossterm::{
    style::{style, Attribute, Color, PrintStyledContent},
    QueueableCommand,
};

use std::io::{stdin, stdout, Write};

use tictactoe_ai::{Board, Cell, SIZE};

/// Draws the board, numbering empty cells 1-9 for input
pub fn draw(board: &Board) -> Result<()> {
    let mut stdout = stdout();

    stdout.queue(PrintStyledContent(style("\n".to_string())))?;
    for (idx, cell) in board.cells().iter().enumerate() {
        let content = match cell {
            Cell::Empty => (idx + 1).to_string(),
            mark => mark.symbol().to_string(),
        };
        let styled = match cell {
            Cell::PlayerMark => style(content).attribute(Attribute::Bold).with(Color::Red),
            Cell::OpponentMark => style(content).attribute(Attribute::Bold).with(Color::Yellow),
            Cell::Empty => style(content).with(Color::DarkGrey),
        };

        stdout.queue(PrintStyledContent(style(" ".to_string())))?;
        stdout.queue(PrintStyledContent(styled))?;

        let separator = if idx % SIZE < SIZE - 1 {
            " |"
        } else if idx < board.cells().len() - 1 {
            "\n---+---+---\n"
        } else {
            "\n\n"
        };
        stdout.queue(PrintStyledContent(style(separator.to_string())))?;
    }
    stdout.flush()?;
    Ok(())
}

/// Prompts and reads one line from stdin
pub fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    stdout().flush()?;

    let mut buffer = String::new();
    if stdin().read_line(&mut buffer)? == 0 {
        return Err(anyhow!("stdin closed"));
    }
    Ok(buffer)
}

/// Asks a y/n question until it gets an answer
pub fn ask_yes_no(prompt: &str) -> Result<bool> {
    loop {
        let buffer = read_line(prompt)?;
        match buffer.to_lowercase().chars().next() {
            Some('y') => return Ok(true),
            Some('n') => return Ok(false),
            _ => println!("Unknown answer given"),
        }
    }
}
