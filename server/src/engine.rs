//! Round engine: pending bets, the periodic draw, payouts and the round broadcast
//!
//! Each round drains the pending bets, draws a winning number, tells every
//! reachable bettor whether they won, then broadcasts the round summary to
//! every registered channel. Send failures are contained per channel; no
//! single failure stops a round or the timer.
//!
//! Bets submitted while a round is settling are not lost: the pending set is
//! swapped out in one step under its lock, so a bet lands either in the round
//! being settled or in the next one.

use crate::channel::{send_error, ChannelHandle};
use crate::config::GameConfig;
use crate::error::{ConfigError, EncodeError};
use crate::registry::PlayerRegistry;
use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{win_frame, winners_frame, Bet, RoundResult, Winner, LOSE_FRAME};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Uniform source of winning numbers
pub trait NumberSource: Send {
    fn draw(&mut self, range: RangeInclusive<i64>) -> i64;
}

/// Draws from a `StdRng`, reproducible when seeded
pub struct RandomSource {
    rng: StdRng,
}

impl RandomSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl NumberSource for RandomSource {
    fn draw(&mut self, range: RangeInclusive<i64>) -> i64 {
        self.rng.gen_range(range)
    }
}

/// Always draws the same number
#[derive(Debug, Clone, Copy)]
pub struct FixedSource(pub i64);

impl NumberSource for FixedSource {
    fn draw(&mut self, _range: RangeInclusive<i64>) -> i64 {
        self.0
    }
}

/// Serializes the round summary carried by the `WINNERS:` broadcast
pub trait SummaryEncoder: Send + Sync {
    fn encode(&self, result: &RoundResult) -> Result<String, EncodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSummaryEncoder;

impl SummaryEncoder for JsonSummaryEncoder {
    fn encode(&self, result: &RoundResult) -> Result<String, EncodeError> {
        // serde_json writes non-finite floats as null, which no client can read back
        if let Some(winner) = result.winners.iter().find(|w| !w.amount.is_finite()) {
            return Err(EncodeError(format!(
                "non-finite winnings {} for '{}'",
                winner.amount, winner.nickname
            )));
        }
        Ok(serde_json::to_string(result)?)
    }
}

/// Payout for `bet` when `winning_number` is drawn, `None` for a losing bet
pub fn winnings(bet: &Bet, winning_number: i64, multiplier: f64) -> Option<f64> {
    (bet.number == winning_number).then(|| bet.amount * multiplier)
}

/// Plays `rounds` single-bet rounds with a unit stake on a uniformly random
/// number and returns the fraction of stakes paid back (return to player).
pub fn simulate_rtp(config: &GameConfig, rounds: u64, source: &mut dyn NumberSource) -> f64 {
    if rounds == 0 {
        return 0.0;
    }

    let mut total_won = 0.0;
    for _ in 0..rounds {
        let bet = Bet::new("sim", source.draw(config.number_range()), 1.0);
        let winning_number = source.draw(config.number_range());
        total_won += winnings(&bet, winning_number, config.payout_multiplier).unwrap_or(0.0);
    }

    total_won / rounds as f64
}

/// Owns the pending bets and settles them once per round
pub struct RoundEngine {
    config: GameConfig,
    registry: Arc<PlayerRegistry>,
    pending: Mutex<Vec<Bet>>,
    rounds: AtomicU64,
    source: Mutex<Box<dyn NumberSource>>,
    encoder: Box<dyn SummaryEncoder>,
}

impl RoundEngine {
    /// Builds an engine for `config`, which must pass `GameConfig::validate`
    pub fn new(config: GameConfig, registry: Arc<PlayerRegistry>) -> Result<Self, ConfigError> {
        config.validate()?;

        let source = RandomSource::new(config.rng_seed);
        Ok(Self {
            config,
            registry,
            pending: Mutex::new(Vec::new()),
            rounds: AtomicU64::new(0),
            source: Mutex::new(Box::new(source)),
            encoder: Box::new(JsonSummaryEncoder),
        })
    }

    pub fn with_source(mut self, source: impl NumberSource + 'static) -> Self {
        self.source = Mutex::new(Box::new(source));
        self
    }

    pub fn with_encoder(mut self, encoder: impl SummaryEncoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<PlayerRegistry> {
        &self.registry
    }

    /// Queues an already validated bet for the next round
    pub async fn submit_bet(&self, bet: Bet) {
        debug!(
            "Bet queued: {} on {} for {}",
            bet.nickname, bet.number, bet.amount
        );
        self.pending.lock().await.push(bet);
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Number of rounds settled so far
    pub fn rounds_resolved(&self) -> u64 {
        self.rounds.load(Ordering::Acquire)
    }

    /// Settles one round and returns its result
    pub async fn resolve(&self) -> RoundResult {
        let bets = std::mem::take(&mut *self.pending.lock().await);
        let round = self.rounds.fetch_add(1, Ordering::AcqRel) + 1;
        let winning_number = self.source.lock().await.draw(self.config.number_range());

        let mut winners = Vec::new();
        // Channel looked up for the most recent bet; the only one told about
        // a summary encoding failure.
        let mut last_channel: Option<ChannelHandle> = None;

        for bet in &bets {
            last_channel = self.registry.lookup(&bet.nickname).await;
            let Some(channel) = last_channel.as_deref().filter(|c| c.is_open()) else {
                debug!("Round {}: skipping bet from unreachable '{}'", round, bet.nickname);
                continue;
            };

            let sent = match winnings(bet, winning_number, self.config.payout_multiplier) {
                Some(amount) => {
                    winners.push(Winner {
                        nickname: bet.nickname.clone(),
                        amount,
                    });
                    channel.send_text(&win_frame(amount))
                }
                None => channel.send_text(LOSE_FRAME),
            };

            if let Err(e) = sent {
                error!("Round {}: failed to notify '{}': {}", round, bet.nickname, e);
                if channel.is_open() {
                    send_error(channel, &e.to_string());
                }
            }
        }

        let result = RoundResult::new(winning_number, winners);

        match self.encoder.encode(&result) {
            Ok(summary) => self.broadcast(&winners_frame(&summary)).await,
            Err(e) => {
                error!("Round {}: failed to encode summary: {}", round, e);
                if let Some(channel) = &last_channel {
                    send_error(channel.as_ref(), &format!("General error: {}", e));
                }
            }
        }

        if bets.is_empty() {
            debug!("Round {}: winning number {}, no bets", round, winning_number);
        } else {
            info!(
                "Round {}: winning number {}, {} bets, {} winners",
                round,
                winning_number,
                bets.len(),
                result.winners.len()
            );
        }

        result
    }

    /// Sends `frame` to every open registered channel, each independently
    async fn broadcast(&self, frame: &str) {
        for channel in self.registry.all_channels().await {
            if !channel.is_open() {
                continue;
            }
            if let Err(e) = channel.send_text(frame) {
                error!("Failed to broadcast to channel {}: {}", channel.id(), e);
            }
        }
    }

    /// Resolves a round every `round_period` until the task is dropped
    pub async fn run(self: Arc<Self>) {
        let mut timer = interval(self.config.round_period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        // Skip the first tick since it fires immediately
        timer.tick().await;

        info!(
            "Round timer started: every {:?}, numbers {}..={}, payout x{}",
            self.config.round_period,
            self.config.min_number,
            self.config.max_number,
            self.config.payout_multiplier
        );

        loop {
            timer.tick().await;
            self.resolve().await;
        }
    }

    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run())
    }
}
