//! Gate every bet must pass before it joins the pending round

use crate::config::GameConfig;
use shared::Bet;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq)]
pub struct BetValidator {
    numbers: RangeInclusive<i64>,
    multiplier: f64,
}

impl BetValidator {
    pub fn new(numbers: RangeInclusive<i64>, multiplier: f64) -> Self {
        Self {
            numbers,
            multiplier,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.number_range(), config.payout_multiplier)
    }

    /// True iff the bet exists, names a non-blank nickname, picks a number in
    /// range, and stakes a positive amount whose payout stays finite.
    pub fn is_valid(&self, bet: Option<&Bet>) -> bool {
        let Some(bet) = bet else {
            return false;
        };
        !bet.nickname.trim().is_empty()
            && self.numbers.contains(&bet.number)
            && bet.amount > 0.0
            && (bet.amount * self.multiplier).is_finite()
    }
}

impl Default for BetValidator {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}
