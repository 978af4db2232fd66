//! # Number Bet Client Library
//!
//! A terminal client for the number-betting server. It joins a table over
//! WebSocket, registers a nickname and turns short typed commands into the
//! server's text protocol, printing every round outcome as it arrives.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Parses what the player types:
//! - `bet <number> <amount>` places a bet under the current nickname
//! - `nick <name>` registers under a new nickname
//! - `quit` closes the connection
//! - Anything else is forwarded verbatim, which makes it easy to poke the
//!   server with raw `NICKNAME:` or `BET:` frames
//!
//! ### Game Module (`game`)
//! Keeps a running tally of wins, losses and the last round summary.
//!
//! ### Network Module (`network`)
//! Owns the WebSocket connection and multiplexes server frames with user
//! input using `tokio::select!`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = Client::new("ws://127.0.0.1:8080", "Alice");
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod game;
pub mod input;
pub mod network;
