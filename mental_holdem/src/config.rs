//! Round configuration.
//!
//! Defaults are meant for simulation and tests. `from_env` reads `HOLDEM_*`
//! variables so a deployment can override any of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::primitives::{Address, Chips};

/// Hole cards per player plus the five community cards must fit in the deck.
pub const STANDARD_DECK_SIZE: usize = 52;
pub const COMMUNITY_CARDS: usize = 5;
pub const HOLE_CARDS: usize = 2;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = (STANDARD_DECK_SIZE - COMMUNITY_CARDS) / HOLE_CARDS;

pub const DEFAULT_TABLE_FEE: Chips = 10;
pub const DEFAULT_SMALL_BLIND: Chips = 5;
pub const DEFAULT_BIG_BLIND: Chips = 10;
pub const DEFAULT_ACTION_TIMEOUT_SECS: u64 = 60;
/// One day.
pub const MAX_ACTION_TIMEOUT_SECS: u64 = 86_400;
pub const DEFAULT_HOUSE: &str = "house";

/// Configuration error types
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

impl ConfigError {
    fn invalid(var: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            var: var.to_string(),
            reason: reason.into(),
        }
    }
}

/// Table stakes, timing and the house cut for a Texas Hold'em round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RoundConfig {
    /// Exact amount every player pays on joining, refunded when the game ends
    pub table_fee: Chips,

    pub small_blind: Chips,

    pub big_blind: Chips,

    /// A raise must reach at least this multiple of the bet being matched
    pub min_raise_multiplier: Chips,

    /// Seconds a player has to act before anyone may purge them
    pub action_timeout_secs: u64,

    /// House commission as `numerator / denominator` of the pot
    pub commission_numerator: Chips,

    pub commission_denominator: Chips,

    pub num_players: usize,

    /// Account receiving commission and forfeited chips
    pub house: Address,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            table_fee: DEFAULT_TABLE_FEE,
            small_blind: DEFAULT_SMALL_BLIND,
            big_blind: DEFAULT_BIG_BLIND,
            min_raise_multiplier: 2,
            action_timeout_secs: DEFAULT_ACTION_TIMEOUT_SECS,
            commission_numerator: 1,
            commission_denominator: 100,
            num_players: MIN_PLAYERS,
            house: Address::new(DEFAULT_HOUSE),
        }
    }
}

impl RoundConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    ///
    /// # Arguments
    ///
    /// * `num_players_override` - Optional player count override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<RoundConfig, ConfigError>` - Validated configuration or error
    pub fn from_env(num_players_override: Option<usize>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            table_fee: parse_env_or("HOLDEM_TABLE_FEE", defaults.table_fee),
            small_blind: parse_env_or("HOLDEM_SMALL_BLIND", defaults.small_blind),
            big_blind: parse_env_or("HOLDEM_BIG_BLIND", defaults.big_blind),
            min_raise_multiplier: parse_env_or(
                "HOLDEM_MIN_RAISE_MULTIPLIER",
                defaults.min_raise_multiplier,
            ),
            action_timeout_secs: parse_env_or(
                "HOLDEM_ACTION_TIMEOUT_SECS",
                defaults.action_timeout_secs,
            ),
            commission_numerator: parse_env_or(
                "HOLDEM_COMMISSION_NUMERATOR",
                defaults.commission_numerator,
            ),
            commission_denominator: parse_env_or(
                "HOLDEM_COMMISSION_DENOMINATOR",
                defaults.commission_denominator,
            ),
            num_players: num_players_override
                .unwrap_or_else(|| parse_env_or("HOLDEM_NUM_PLAYERS", defaults.num_players)),
            house: std::env::var("HOLDEM_HOUSE")
                .map(|house| Address::new(&house))
                .unwrap_or(defaults.house),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.small_blind == 0 {
            return Err(ConfigError::invalid("HOLDEM_SMALL_BLIND", "Must be greater than 0"));
        }

        if self.big_blind <= self.small_blind {
            return Err(ConfigError::invalid(
                "HOLDEM_BIG_BLIND",
                format!("Must be greater than small blind ({})", self.small_blind),
            ));
        }

        if self.min_raise_multiplier < 2 {
            return Err(ConfigError::invalid(
                "HOLDEM_MIN_RAISE_MULTIPLIER",
                "Must be at least 2",
            ));
        }

        if !(1..=MAX_ACTION_TIMEOUT_SECS).contains(&self.action_timeout_secs) {
            return Err(ConfigError::invalid(
                "HOLDEM_ACTION_TIMEOUT_SECS",
                format!("Must be between 1 and {MAX_ACTION_TIMEOUT_SECS}"),
            ));
        }

        if self.commission_denominator == 0 {
            return Err(ConfigError::invalid(
                "HOLDEM_COMMISSION_DENOMINATOR",
                "Must be greater than 0",
            ));
        }

        if self.commission_numerator > self.commission_denominator {
            return Err(ConfigError::invalid(
                "HOLDEM_COMMISSION_NUMERATOR",
                format!(
                    "Cannot exceed the denominator ({})",
                    self.commission_denominator
                ),
            ));
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.num_players) {
            return Err(ConfigError::invalid(
                "HOLDEM_NUM_PLAYERS",
                format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            ));
        }

        if self.house.as_str().is_empty() {
            return Err(ConfigError::invalid("HOLDEM_HOUSE", "Must not be empty"));
        }

        Ok(())
    }

    /// Action timeout as a chrono duration
    #[must_use]
    pub fn action_timeout(&self) -> chrono::Duration {
        i64::try_from(self.action_timeout_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    /// Winner's share of `pot` after commission.
    #[must_use]
    pub fn payout(&self, pot: Chips) -> Chips {
        pot / self.commission_denominator * (self.commission_denominator - self.commission_numerator)
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(RoundConfig::default().validate(), Ok(()));
        assert_eq!(MAX_PLAYERS, 23);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("HOLDEM_HOUSE", "Must not be empty");
        let msg = err.to_string();
        assert!(msg.contains("HOLDEM_HOUSE"));
        assert!(msg.contains("Must not be empty"));
    }

    #[test]
    fn test_config_validation_action_timeout() {
        for action_timeout_secs in [0, MAX_ACTION_TIMEOUT_SECS + 1, u64::MAX] {
            let config = RoundConfig {
                action_timeout_secs,
                ..RoundConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { var, .. }) if var == "HOLDEM_ACTION_TIMEOUT_SECS")
            );
        }

        let config = RoundConfig {
            action_timeout_secs: MAX_ACTION_TIMEOUT_SECS,
            ..RoundConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.action_timeout(), chrono::Duration::days(1));

        // Unvalidated values saturate instead of panicking.
        let config = RoundConfig {
            action_timeout_secs: u64::MAX,
            ..RoundConfig::default()
        };
        assert_eq!(config.action_timeout(), chrono::Duration::MAX);
    }

    #[test]
    fn test_from_env_reads_house() {
        // Only test in this binary that touches the environment.
        unsafe { std::env::set_var("HOLDEM_HOUSE", "  casino ") };
        let config = RoundConfig::from_env(Some(3));
        unsafe { std::env::remove_var("HOLDEM_HOUSE") };

        let config = config.unwrap();
        assert_eq!(config.house, Address::new("casino"));
        assert_eq!(config.num_players, 3);
    }

    #[test]
    fn test_config_validation_blinds() {
        let config = RoundConfig {
            small_blind: 0,
            ..RoundConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { var, .. }) if var == "HOLDEM_SMALL_BLIND"));

        let config = RoundConfig {
            big_blind: 5,
            ..RoundConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { var, .. }) if var == "HOLDEM_BIG_BLIND"));
    }

    #[test]
    fn test_config_validation_player_count() {
        for num_players in [0, 1, MAX_PLAYERS + 1] {
            let config = RoundConfig {
                num_players,
                ..RoundConfig::default()
            };
            assert!(config.validate().is_err());
        }
    }

    #[test]
    fn test_config_validation_commission() {
        let config = RoundConfig {
            commission_denominator: 0,
            ..RoundConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RoundConfig {
            commission_numerator: 101,
            ..RoundConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_payout_rounds_down_to_denominator() {
        let config = RoundConfig::default();
        assert_eq!(config.payout(1000), 990);
        // 150 / 100 * 99
        assert_eq!(config.payout(150), 99);
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("HOLDEM_TEST_UNSET_VARIABLE", 42u64), 42);
    }
}
