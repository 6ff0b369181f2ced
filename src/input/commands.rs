//! Console command parsing
//!
//! Rows are numbered from 1 on the console and from 0 everywhere else.

use crate::{Result, StrudelError};

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Speak a row (0-based)
    Speak(usize),
    /// Blank line: speak the focused or first visible row
    SpeakDefault,
    Edit(usize, String),
    Up(usize),
    Down(usize),
    Filter(String),
    ClearFilter,
    /// Set the voice, or list voices when no argument is given
    Voice(Option<String>),
    Speed(Option<String>),
    Volume(Option<String>),
    List,
    Stop,
    Save,
    Reset,
    Help,
    Quit,
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Command::SpeakDefault);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };

    // A bare number speaks that row
    if word.chars().all(|c| c.is_ascii_digit()) && rest.is_empty() {
        return row_index(word).map(Command::Speak);
    }

    match word.to_lowercase().as_str() {
        "say" | "speak" => row_index(required(word, rest)?).map(Command::Speak),
        "edit" | "set" => {
            let rest = required(word, rest)?;
            let (row, text) = match rest.split_once(char::is_whitespace) {
                Some((row, text)) => (row, text.trim()),
                None => (rest, ""),
            };
            Ok(Command::Edit(row_index(row)?, text.to_string()))
        }
        "up" => row_index(required(word, rest)?).map(Command::Up),
        "down" => row_index(required(word, rest)?).map(Command::Down),
        "filter" | "find" => match arg {
            Some(query) => Ok(Command::Filter(query)),
            None => Ok(Command::ClearFilter),
        },
        "clear" => Ok(Command::ClearFilter),
        "voice" | "voices" => Ok(Command::Voice(arg)),
        "speed" => Ok(Command::Speed(arg)),
        "volume" => Ok(Command::Volume(arg)),
        "list" | "ls" => Ok(Command::List),
        "stop" => Ok(Command::Stop),
        "save" => Ok(Command::Save),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "close" | "q" => Ok(Command::Quit),
        _ => Err(StrudelError::Other(format!(
            "Unknown command '{}' (type 'help')",
            word
        ))),
    }
}

fn required<'a>(command: &str, rest: &'a str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(StrudelError::Other(format!("'{}' needs a row number", command)))
    } else {
        Ok(rest)
    }
}

/// Convert a 1-based row number into an index
fn row_index(text: &str) -> Result<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(StrudelError::Other(format!("Invalid row number '{}'", text))),
    }
}
