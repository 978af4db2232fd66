//! Error taxonomy for the betting server
//!
//! Command errors are always reported back on the originating channel as an
//! `ERROR: ` frame; their `Display` text is the exact frame message.

use shared::UnknownCommand;

/// Failure writing to or closing a client channel
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel {0} is closed")]
    Closed(u64),
    #[error("channel {id} transport failure: {reason}")]
    Transport { id: u64, reason: String },
}

/// Rejection of a single inbound message
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Neither `NICKNAME:` nor `BET:`
    #[error(transparent)]
    UnknownCommand(#[from] UnknownCommand),
    /// Bet payload could not be decoded, or any other unexpected failure
    #[error("General error: {0}")]
    General(String),
    /// Well-formed bet from a nickname nobody registered
    #[error("Register player first, then place bet")]
    NotRegistered,
    /// Registered player, but the bet fails validation
    #[error("Error placing bet: Invalid bet")]
    InvalidBet,
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::General(err.to_string())
    }
}

/// Round summary could not be serialized
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct EncodeError(pub String);

impl From<serde_json::Error> for EncodeError {
    fn from(err: serde_json::Error) -> Self {
        EncodeError(err.to_string())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("round period must be greater than zero")]
    ZeroPeriod,
    #[error("payout multiplier must be a positive finite number, got {0}")]
    Multiplier(f64),
    #[error("number range {min}..={max} is empty")]
    EmptyRange { min: i64, max: i64 },
}
