//! Tunable round parameters

use crate::error::ConfigError;
use shared::{
    DEFAULT_MAX_NUMBER, DEFAULT_MIN_NUMBER, DEFAULT_PAYOUT_MULTIPLIER, DEFAULT_ROUND_PERIOD,
};
use std::ops::RangeInclusive;
use std::time::Duration;

/// Parameters of the round engine. `Default` matches the reference game:
/// a draw every 10 seconds over 1..=10, paying 9.9x the stake.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub round_period: Duration,
    pub payout_multiplier: f64,
    pub min_number: i64,
    pub max_number: i64,
    /// Fixed seed for the winning-number draw; entropy when `None`
    pub rng_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_period: DEFAULT_ROUND_PERIOD,
            payout_multiplier: DEFAULT_PAYOUT_MULTIPLIER,
            min_number: DEFAULT_MIN_NUMBER,
            max_number: DEFAULT_MAX_NUMBER,
            rng_seed: None,
        }
    }
}

impl GameConfig {
    pub fn number_range(&self) -> RangeInclusive<i64> {
        self.min_number..=self.max_number
    }

    /// Count of distinct numbers a player can bet on
    pub fn range_len(&self) -> u128 {
        (i128::from(self.max_number) - i128::from(self.min_number) + 1).max(0) as u128
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_period.is_zero() {
            return Err(ConfigError::ZeroPeriod);
        }
        if !self.payout_multiplier.is_finite() || self.payout_multiplier <= 0.0 {
            return Err(ConfigError::Multiplier(self.payout_multiplier));
        }
        if self.min_number > self.max_number {
            return Err(ConfigError::EmptyRange {
                min: self.min_number,
                max: self.max_number,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_reference_game() {
        let config = GameConfig::default();
        assert_eq!(config.round_period, Duration::from_secs(10));
        assert_eq!(config.payout_multiplier, 9.9);
        assert_eq!(config.number_range(), 1..=10);
        assert_eq!(config.range_len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GameConfig {
            round_period: Duration::ZERO,
            ..GameConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod));

        config.round_period = Duration::from_millis(500);
        config.payout_multiplier = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::Multiplier(0.0)));

        config.payout_multiplier = 9.9;
        config.min_number = 5;
        config.max_number = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyRange { min: 5, max: 4 })
        );
        assert_eq!(config.range_len(), 0);
    }

    #[test]
    fn test_range_len_of_full_i64_span() {
        let config = GameConfig {
            min_number: i64::MIN,
            max_number: i64::MAX,
            ..GameConfig::default()
        };
        assert_eq!(config.range_len(), 1u128 << 64);
        assert!(config.validate().is_ok());

        let single = GameConfig {
            min_number: -3,
            max_number: -3,
            ..GameConfig::default()
        };
        assert_eq!(single.range_len(), 1);
    }

    #[test]
    fn test_validate_rejects_nan_multiplier() {
        let config = GameConfig {
            payout_multiplier: f64::NAN,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Multiplier(_))));
    }
}
