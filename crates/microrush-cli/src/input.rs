//! Console command parsing.
//!
//! One command per line:
//!
//! | Line                      | Meaning                           |
//! |---------------------------|-----------------------------------|
//! | `start`                   | start a game                      |
//! | `restart` / `reset`       | reset lives and score, play again |
//! | `status`                  | print the session snapshot        |
//! | `look`                    | print the play field              |
//! | `quit` / `exit`           | leave                             |
//! | `key <name>`              | key press (`key space` for `" "`) |
//! | `space` or an empty line  | space bar                         |
//! | `click <x> <y>`           | click                             |
//! | `down` / `move` / `up <x> <y>` | pointer press, move, release |
//! | any single character      | that key                          |

use microrush_core::microgame::InputEvent;
use microrush_core::surface::Point;

use crate::error::AppError;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start a game.
    Start,
    /// Reset and play again.
    Restart,
    /// Print the session snapshot.
    Status,
    /// Print the play field.
    Look,
    /// Leave.
    Quit,
    /// Forward an input event to the microgame.
    Input(InputEvent),
}

/// Parses one console line.
///
/// # Errors
///
/// Returns `AppError::Command` if the line is not a known command or its
/// coordinates are not numbers.
pub fn parse_command(line: &str) -> Result<Command, AppError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Input(InputEvent::key(" ")));
    };
    let args: Vec<&str> = words.collect();

    let command = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("start", []) => Command::Start,
        ("restart" | "reset", []) => Command::Restart,
        ("status", []) => Command::Status,
        ("look", []) => Command::Look,
        ("quit" | "exit", []) => Command::Quit,
        ("space", []) => Command::Input(InputEvent::key(" ")),
        ("key", [name]) => Command::Input(InputEvent::key(key_name(name))),
        ("click", [x, y]) => Command::Input(InputEvent::Click {
            at: point(x, y, line)?,
        }),
        ("down", [x, y]) => Command::Input(InputEvent::PointerDown {
            at: point(x, y, line)?,
        }),
        ("move", [x, y]) => Command::Input(InputEvent::PointerMove {
            at: point(x, y, line)?,
        }),
        ("up", [x, y]) => Command::Input(InputEvent::PointerUp {
            at: point(x, y, line)?,
        }),
        (_, []) if head.chars().count() == 1 => Command::Input(InputEvent::key(head)),
        _ => return Err(AppError::Command(line.trim().to_owned())),
    };
    Ok(command)
}

fn key_name(name: &str) -> &str {
    if name.eq_ignore_ascii_case("space") {
        " "
    } else {
        name
    }
}

fn point(x: &str, y: &str, line: &str) -> Result<Point, AppError> {
    let parse = |raw: &str| {
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| AppError::Command(line.trim().to_owned()))
    };
    Ok(Point::new(parse(x)?, parse(y)?))
}
