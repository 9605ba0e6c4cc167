//! Game tuning parameters.
//!
//! Defaults reproduce the standard game. A JSON file may override any
//! subset of fields; missing fields keep their defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::TierRates;

/// Lamports per SOL, for human-readable costs.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// A rule set that would let a board break its invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Starting corners must hold at least one resource.
    #[error("starting_resources must be at least 1")]
    NoStartingResources,
    /// The attack delay can't be negative.
    #[error("attack_delay_secs must not be negative, got {0}")]
    NegativeAttackDelay(i64),
    /// Attacks must become resolvable before they expire.
    #[error("attack_expiry_secs ({expiry}) is shorter than attack_delay_secs ({delay})")]
    ExpiryBeforeDelay {
        /// Configured delay.
        delay: i64,
        /// Configured expiry.
        expiry: i64,
    },
}

/// Rules every new game board is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Shared pool production per minute.
    pub resources_per_minute: u32,
    /// Resources on each starting corner.
    pub starting_resources: u16,
    /// Experience per owned tile per minute.
    pub xp_per_minute_per_tile: u32,
    /// Bonus experience per tier per minute.
    pub tier_rates: TierRates,
    /// Experience that wins the game.
    pub winning_xp_limit: u32,
    /// Seconds before an attack may be resolved.
    pub attack_delay_secs: i64,
    /// Seconds after which an unresolved attack is forfeit.
    pub attack_expiry_secs: i64,
    /// Join cost stored in a freshly created registry, in lamports.
    pub game_cost: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            resources_per_minute: 10,
            starting_resources: 10,
            xp_per_minute_per_tile: 1,
            tier_rates: TierRates::default(),
            winning_xp_limit: 10_000,
            attack_delay_secs: 3,
            attack_expiry_secs: 300,
            game_cost: LAMPORTS_PER_SOL / 10,
        }
    }
}

impl GameConfig {
    /// Check the rules a board relies on.
    ///
    /// # Errors
    ///
    /// Returns the first rule the config breaks.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.starting_resources == 0 {
            return Err(ConfigError::NoStartingResources);
        }
        if self.attack_delay_secs < 0 {
            return Err(ConfigError::NegativeAttackDelay(self.attack_delay_secs));
        }
        if self.attack_expiry_secs < self.attack_delay_secs {
            return Err(ConfigError::ExpiryBeforeDelay {
                delay: self.attack_delay_secs,
                expiry: self.attack_expiry_secs,
            });
        }
        Ok(())
    }

    /// Read and validate a config from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't valid JSON, or
    /// fails [`GameConfig::validate`].
    pub fn load(path: &Path) -> io::Result<Self> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Write this config as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be written.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}
