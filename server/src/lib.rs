//! # Number Betting Server Library
//!
//! This library provides the authoritative round engine for a real-time
//! multiplayer number-betting game. Clients register a nickname, place bets
//! on a number, and a periodic draw settles every pending bet and tells all
//! connected players how the round went.
//!
//! ## Core Responsibilities
//!
//! ### Player Registry
//! Maps nicknames to the channel of the client that registered them. A later
//! registration of the same nickname takes the mapping over; disconnecting
//! drops every nickname still bound to that connection.
//!
//! ### Bet Intake
//! Every `BET:` payload is decoded, checked against the registry and then
//! validated (number in range, positive stake, non-blank nickname) before it
//! joins the pending round. Rejections are reported to the sender only.
//!
//! ### Round Resolution
//! A timer task settles a round every fixed period: it drains the pending
//! bets, draws the winning number, sends `WIN: <amount>` or `LOSE` to each
//! reachable bettor in submission order, and finally broadcasts a `WINNERS:`
//! summary to every registered channel.
//!
//! ## Architecture Design
//!
//! ### Concurrent Handlers, One Timer
//! Each connection is served by its own task, while the round timer runs
//! independently. The registry and the pending bets are the only shared
//! state; both live behind tokio locks owned by the structures injected at
//! construction, never in globals.
//!
//! ### Fire-and-Forget Sends
//! Channels queue outbound frames for a per-connection writer task. A failing
//! or slow client never stalls the round for anybody else, and no send error
//! stops the timer.
//!
//! ## Module Organization
//!
//! - `channel`: the `Channel` trait, WebSocket and in-memory implementations,
//!   and the shared error-frame helper
//! - `config`: round period, payout multiplier and number range
//! - `engine`: pending bets, number draw, payouts and broadcast
//! - `error`: error taxonomy and the exact error-frame messages
//! - `network`: WebSocket listener and per-connection tasks
//! - `registry`: nickname to channel mapping
//! - `router`: inbound command parsing and dispatch
//! - `validator`: the bet admission predicate
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::engine::RoundEngine;
//! use server::network::GameServer;
//! use server::registry::PlayerRegistry;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(PlayerRegistry::new());
//!     let engine = RoundEngine::new(GameConfig::default(), registry)?;
//!
//!     // Resolves a round every 10 seconds and serves WebSocket clients
//!     let server = GameServer::bind("127.0.0.1:8080", engine).await?;
//!     server.run().await;
//!
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod registry;
pub mod router;
pub mod validator;
