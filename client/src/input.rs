//! Terminal input parsing and translation into protocol frames

use shared::{Bet, ClientCommand};

/// One line typed by the player
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// `bet <number> <amount>` for the current nickname
    Bet { number: i64, amount: f64 },
    /// `nick <name>` re-registers under a new nickname
    Nickname(String),
    Quit,
    /// Anything else is sent to the server untouched
    Raw(String),
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("usage: bet <number> <amount>")]
    BetUsage,
    #[error("usage: nick <name>")]
    NickUsage,
}

/// Parses a line of user input. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<UserCommand>, InputError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let mut words = trimmed.split_whitespace();
    let command = match words.next().map(str::to_ascii_lowercase).as_deref() {
        Some("bet") => {
            let number = words.next().and_then(|w| w.parse().ok());
            let amount = words.next().and_then(|w| w.parse().ok());
            match (number, amount, words.next()) {
                (Some(number), Some(amount), None) => UserCommand::Bet { number, amount },
                _ => return Err(InputError::BetUsage),
            }
        }
        Some("nick") => match trimmed.split_once(char::is_whitespace) {
            Some((_, name)) if !name.trim().is_empty() => {
                UserCommand::Nickname(name.trim().to_string())
            }
            _ => return Err(InputError::NickUsage),
        },
        Some("quit") | Some("exit") => UserCommand::Quit,
        _ => UserCommand::Raw(line.to_string()),
    };

    Ok(Some(command))
}

/// Builds the frame to send for `command`, `None` for `Quit`
pub fn to_frame(command: &UserCommand, nickname: &str) -> Result<Option<String>, serde_json::Error> {
    Ok(match command {
        UserCommand::Bet { number, amount } => {
            let payload = Bet::new(nickname, *number, *amount).to_json()?;
            Some(ClientCommand::Bet(&payload).encode())
        }
        UserCommand::Nickname(name) => Some(ClientCommand::Nickname(name).encode()),
        UserCommand::Quit => None,
        UserCommand::Raw(raw) => Some(raw.clone()),
    })
}
