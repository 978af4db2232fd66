//! Inbound message dispatch
//!
//! Parses one text frame, routes `NICKNAME:` to the registry and `BET:` through
//! decoding, registration check and validation into the round engine. Every
//! rejection goes back to the sender as a single `ERROR: ` frame.

use crate::channel::{send_error, ChannelHandle};
use crate::engine::RoundEngine;
use crate::error::CommandError;
use crate::registry::PlayerRegistry;
use crate::validator::BetValidator;
use log::debug;
use shared::{Bet, ClientCommand};
use std::sync::Arc;

pub struct MessageRouter {
    registry: Arc<PlayerRegistry>,
    engine: Arc<RoundEngine>,
    validator: BetValidator,
}

impl MessageRouter {
    pub fn new(registry: Arc<PlayerRegistry>, engine: Arc<RoundEngine>) -> Self {
        let validator = BetValidator::from_config(engine.config());
        Self {
            registry,
            engine,
            validator,
        }
    }

    /// Handles one raw message from `channel`. Never fails: errors are
    /// reported on the channel itself.
    pub async fn handle(&self, channel: &ChannelHandle, raw: &str) {
        if let Err(e) = self.dispatch(channel, raw).await {
            debug!("Rejected message on channel {}: {}", channel.id(), e);
            send_error(channel.as_ref(), &e.to_string());
        }
    }

    async fn dispatch(&self, channel: &ChannelHandle, raw: &str) -> Result<(), CommandError> {
        match ClientCommand::parse(raw)? {
            ClientCommand::Nickname(nickname) => {
                self.registry.register(nickname, Arc::clone(channel)).await;
                Ok(())
            }
            ClientCommand::Bet(payload) => {
                let bet = self.admit(payload).await?;
                self.engine.submit_bet(bet).await;
                Ok(())
            }
        }
    }

    /// Decodes a bet and checks it against the registry and the validator
    async fn admit(&self, payload: &str) -> Result<Bet, CommandError> {
        let Some(bet) = Bet::from_json(payload)? else {
            return Err(CommandError::InvalidBet);
        };

        if self.registry.lookup(&bet.nickname).await.is_none() {
            return Err(CommandError::NotRegistered);
        }

        if !self.validator.is_valid(Some(&bet)) {
            return Err(CommandError::InvalidBet);
        }

        Ok(bet)
    }
}
