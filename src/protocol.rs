//! Text command parser
//!
//! One command per line. Moves use the two-letters-per-stone notation
//! described in [`crate::board::Pos::from_notation`].
//!
//! # Example
//!
//! ```
//! use connect6::board::{Move, CENTER};
//! use connect6::protocol::{parse_command, Command};
//!
//! assert_eq!(parse_command("black JJ").unwrap(), Command::Black(Move::single(CENTER)));
//! assert_eq!(parse_command("depth 5").unwrap(), Command::Depth(5));
//! assert!(parse_command("black ZZ").is_err());
//! ```

use anyhow::{anyhow, Context, Result};

use crate::board::{Move, Stone};

/// A parsed protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Name,
    Print,
    Help,
    Quit,
    /// Stones for Black, played as Black's turn
    Black(Move),
    /// Stones for White, played as White's turn
    White(Move),
    /// Opponent's move; the engine answers
    Move(Move),
    /// Engine moves for the side to move
    Next,
    /// New game with the engine playing this color
    New(Stone),
    Depth(u32),
    SetOption { name: String, value: String },
    /// `vcf` / `unvcf`, accepted for compatibility
    Ignored,
}

pub const HELP: &str = "\
commands:
  name               print engine name
  print              print current board
  quit | exit        leave
  black XXXX         place black stone(s)
  white XXXX         place white stone(s)
  next               engine moves for the side to move
  move XXXX          opponent move, then engine replies
  new black|white    new game, engine plays the given color
  depth N            N seconds per move, depth cap scaled to match
  setoption NAME V   change an engine option
  vcf | unvcf        ignored
  help               this text";

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.is_empty() {
        return Err(anyhow!("Empty command"));
    }

    match parts[0].to_ascii_lowercase().as_str() {
        "name" => Ok(Command::Name),
        "print" => Ok(Command::Print),
        "help" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "next" => Ok(Command::Next),
        "vcf" | "unvcf" => Ok(Command::Ignored),

        "black" => parse_move(&parts[1..]).map(Command::Black),
        "white" => parse_move(&parts[1..]).map(Command::White),
        "move" => parse_move(&parts[1..]).map(Command::Move),
        "new" => parse_new(&parts[1..]),
        "depth" => parse_depth(&parts[1..]),
        "setoption" => parse_setoption(&parts[1..]),

        _ => Err(anyhow!("Unknown command: {}", parts[0])),
    }
}

fn parse_move(parts: &[&str]) -> Result<Move> {
    let text = match parts {
        [text] => text,
        [] => return Err(anyhow!("missing move")),
        _ => return Err(anyhow!("expected one move, got '{}'", parts.join(" "))),
    };
    Move::from_notation(text).with_context(|| format!("bad move '{text}'"))
}

/// `new` alone starts a game in which the engine plays White.
fn parse_new(parts: &[&str]) -> Result<Command> {
    match parts.first().map(|p| p.to_ascii_lowercase()) {
        None => Ok(Command::New(Stone::White)),
        Some(color) if color == "black" => Ok(Command::New(Stone::Black)),
        Some(color) if color == "white" => Ok(Command::New(Stone::White)),
        Some(other) => Err(anyhow!("new expects black or white, got '{other}'")),
    }
}

fn parse_depth(parts: &[&str]) -> Result<Command> {
    let value = parts.first().ok_or_else(|| anyhow!("Usage: depth <seconds>"))?;
    let level = value
        .parse()
        .map_err(|_| anyhow!("Invalid depth value: {value}"))?;
    Ok(Command::Depth(level))
}

/// Accepts `setoption NAME VALUE` and `setoption name NAME value VALUE`.
fn parse_setoption(parts: &[&str]) -> Result<Command> {
    if parts.first().is_some_and(|p| p.eq_ignore_ascii_case("name")) {
        let value_pos = parts
            .iter()
            .position(|p| p.eq_ignore_ascii_case("value"))
            .ok_or_else(|| anyhow!("setoption requires a value"))?;
        if value_pos < 2 || value_pos + 1 >= parts.len() {
            return Err(anyhow!("Invalid setoption format"));
        }
        return Ok(Command::SetOption {
            name: parts[1..value_pos].join(" "),
            value: parts[value_pos + 1..].join(" "),
        });
    }

    match parts {
        [name, value] => Ok(Command::SetOption {
            name: (*name).to_string(),
            value: (*value).to_string(),
        }),
        _ => Err(anyhow!("Usage: setoption NAME VALUE")),
    }
}
