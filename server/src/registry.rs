//! Nickname to channel registry shared by the message handlers and the round timer
//!
//! This module tracks which connected channel answers to which nickname:
//! - Registration (a later `NICKNAME:` for the same name overwrites the earlier one)
//! - Lookup when a bet arrives and again when the round settles
//! - Channel snapshots for the round-summary broadcast
//! - Cleanup of every nickname bound to a connection once it disconnects
//!
//! The map sits behind a `tokio::sync::RwLock`, so handlers can register
//! while the round timer reads and iterates without ever seeing a torn map.

use crate::channel::ChannelHandle;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// Concurrent nickname to channel mapping
///
/// No validation of nickname content happens here; whatever follows
/// `NICKNAME:` is accepted verbatim.
#[derive(Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<String, ChannelHandle>>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `nickname` to `channel`, replacing any previous binding
    pub async fn register(&self, nickname: &str, channel: ChannelHandle) {
        let channel_id = channel.id();
        let previous = self
            .players
            .write()
            .await
            .insert(nickname.to_string(), channel);

        match previous {
            Some(old) if old.id() != channel_id => info!(
                "Player '{}' moved from channel {} to channel {}",
                nickname,
                old.id(),
                channel_id
            ),
            Some(_) => debug!("Player '{}' re-registered on channel {}", nickname, channel_id),
            None => info!("Player '{}' registered on channel {}", nickname, channel_id),
        }
    }

    pub async fn lookup(&self, nickname: &str) -> Option<ChannelHandle> {
        self.players.read().await.get(nickname).cloned()
    }

    /// Snapshot of every registered channel, each listed once even when it
    /// answers to several nicknames
    pub async fn all_channels(&self) -> Vec<ChannelHandle> {
        let players = self.players.read().await;
        let mut seen = HashSet::with_capacity(players.len());
        players
            .values()
            .filter(|channel| seen.insert(channel.id()))
            .cloned()
            .collect()
    }

    /// Drops every nickname still bound to the given channel
    ///
    /// Returns the removed nicknames. Bindings that were already taken over
    /// by another channel are left alone.
    pub async fn remove_channel(&self, channel_id: u64) -> Vec<String> {
        let mut players = self.players.write().await;
        let removed: Vec<String> = players
            .iter()
            .filter(|(_, channel)| channel.id() == channel_id)
            .map(|(nickname, _)| nickname.clone())
            .collect();

        for nickname in &removed {
            players.remove(nickname);
            info!("Player '{}' left (channel {})", nickname, channel_id);
        }

        removed
    }

    /// Returns the number of registered nicknames
    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }
}
