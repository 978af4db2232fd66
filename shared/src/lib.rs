//! Text protocol spoken between the betting server and its clients.
//!
//! Every message is a single text frame. Clients send `NICKNAME:<name>` or
//! `BET:<json>`; the server answers with `ERROR: ...`, `WIN: ...`, `LOSE`
//! and the per-round `WINNERS: {...}` broadcast.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const NICKNAME_PREFIX: &str = "NICKNAME:";
pub const BET_PREFIX: &str = "BET:";

pub const ERROR_PREFIX: &str = "ERROR: ";
pub const WIN_PREFIX: &str = "WIN: ";
pub const LOSE_FRAME: &str = "LOSE";
pub const WINNERS_PREFIX: &str = "WINNERS: ";

pub const USAGE_MESSAGE: &str =
    "Valid commands: NICKNAME:Player1 and BET:{\"nickname\":\"Player1\",\"number\":1,\"amount\":100}";

pub const DEFAULT_ROUND_PERIOD: Duration = Duration::from_secs(10);
pub const DEFAULT_PAYOUT_MULTIPLIER: f64 = 9.9;
pub const DEFAULT_MIN_NUMBER: i64 = 1;
pub const DEFAULT_MAX_NUMBER: i64 = 10;

/// A wager on a single number for the upcoming round.
///
/// Missing JSON fields fall back to their zero values, so a payload without
/// a nickname still decodes and is rejected later by validation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Bet {
    pub nickname: String,
    pub number: i64,
    pub amount: f64,
}

impl Bet {
    pub fn new(nickname: impl Into<String>, number: i64, amount: f64) -> Self {
        Self {
            nickname: nickname.into(),
            number,
            amount,
        }
    }

    /// Decodes a `BET:` payload. A literal `null` yields `Ok(None)`.
    pub fn from_json(payload: &str) -> Result<Option<Bet>, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Winner {
    pub nickname: String,
    pub amount: f64,
}

/// Outcome of one round, broadcast to every registered player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "roundResult", rename_all = "camelCase")]
pub struct RoundResult {
    pub winning_number: i64,
    pub winners: Vec<Winner>,
}

impl RoundResult {
    pub fn new(winning_number: i64, winners: Vec<Winner>) -> Self {
        Self {
            winning_number,
            winners,
        }
    }

    pub fn winner(&self, nickname: &str) -> Option<&Winner> {
        self.winners.iter().find(|w| w.nickname == nickname)
    }
}

/// An inbound command, borrowed from the raw frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// Everything after the first colon, untrimmed.
    Nickname(&'a str),
    /// The undecoded bet payload.
    Bet(&'a str),
}

impl<'a> ClientCommand<'a> {
    pub fn parse(raw: &'a str) -> Result<Self, UnknownCommand> {
        if let Some(name) = raw.strip_prefix(NICKNAME_PREFIX) {
            Ok(ClientCommand::Nickname(name))
        } else if let Some(payload) = raw.strip_prefix(BET_PREFIX) {
            Ok(ClientCommand::Bet(payload))
        } else {
            Err(UnknownCommand)
        }
    }

    pub fn encode(&self) -> String {
        match self {
            ClientCommand::Nickname(name) => format!("{}{}", NICKNAME_PREFIX, name),
            ClientCommand::Bet(payload) => format!("{}{}", BET_PREFIX, payload),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{}", USAGE_MESSAGE)]
pub struct UnknownCommand;

pub fn error_frame(message: &str) -> String {
    format!("{}{}", ERROR_PREFIX, message)
}

/// `Debug` formatting keeps the trailing `.0` on whole amounts (`WIN: 99.0`).
pub fn win_frame(winnings: f64) -> String {
    format!("{}{:?}", WIN_PREFIX, winnings)
}

pub fn winners_frame(summary_json: &str) -> String {
    format!("{}{}", WINNERS_PREFIX, summary_json)
}

/// An outbound frame as seen by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerFrame {
    Error(String),
    Win(f64),
    Lose,
    Winners(RoundResult),
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("unrecognized frame: {0}")]
    Unrecognized(String),
    #[error("invalid winnings amount: {0}")]
    Winnings(#[from] std::num::ParseFloatError),
    #[error("invalid round summary: {0}")]
    Summary(#[from] serde_json::Error),
}

impl ServerFrame {
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        if let Some(message) = raw.strip_prefix(ERROR_PREFIX) {
            Ok(ServerFrame::Error(message.to_string()))
        } else if let Some(amount) = raw.strip_prefix(WIN_PREFIX) {
            Ok(ServerFrame::Win(amount.trim().parse()?))
        } else if raw == LOSE_FRAME {
            Ok(ServerFrame::Lose)
        } else if let Some(summary) = raw.strip_prefix(WINNERS_PREFIX) {
            Ok(ServerFrame::Winners(serde_json::from_str(summary)?))
        } else {
            Err(FrameError::Unrecognized(raw.to_string()))
        }
    }
}

impl fmt::Display for ServerFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerFrame::Error(message) => write!(f, "error: {}", message),
            ServerFrame::Win(winnings) => write!(f, "you won {:.2}", winnings),
            ServerFrame::Lose => write!(f, "you lost"),
            ServerFrame::Winners(result) if result.winners.is_empty() => {
                write!(f, "round over, number {} - no winners", result.winning_number)
            }
            ServerFrame::Winners(result) => {
                write!(f, "round over, number {} - winners:", result.winning_number)?;
                for winner in &result.winners {
                    write!(f, " {} ({:.2})", winner.nickname, winner.amount)?;
                }
                Ok(())
            }
        }
    }
}
