//! The process-wide registry of games and players.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{GameError, LedgerResult};

/// Game counter and aggregate stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Wallet allowed to change registry settings.
    pub admin: Address,
    /// Next game id. Monotonic.
    pub game_count: u64,
    /// Games whose prize was claimed.
    pub games_completed: u64,
    /// Profiles ever created.
    pub total_players: u64,
    /// Lamports each player pays to join a game.
    pub game_cost: u64,
    /// Schema version.
    pub version: u8,
}

impl Registry {
    /// Current schema version.
    pub const VERSION: u8 = 1;

    /// Empty registry owned by `admin`.
    #[must_use]
    pub const fn new(admin: Address, game_cost: u64) -> Self {
        Self {
            admin,
            game_count: 0,
            games_completed: 0,
            total_players: 0,
            game_cost,
            version: Self::VERSION,
        }
    }

    /// Reserve the next game id.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` once the counter is exhausted.
    pub fn allocate_game_id(&mut self) -> LedgerResult<u64> {
        let id = self.game_count;
        self.game_count = id.checked_add(1).ok_or(GameError::ArithmeticOverflow)?;
        Ok(id)
    }

    /// Count a newly created profile.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the counter would wrap.
    pub fn record_player(&mut self) -> LedgerResult<()> {
        self.total_players = self
            .total_players
            .checked_add(1)
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Count a finished game.
    ///
    /// # Errors
    ///
    /// `ArithmeticOverflow` if the counter would wrap.
    pub fn record_completion(&mut self) -> LedgerResult<()> {
        self.games_completed = self
            .games_completed
            .checked_add(1)
            .ok_or(GameError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Change the join cost. Admin only.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if `signer` is not the admin.
    pub fn set_game_cost(&mut self, signer: &Address, cost: u64) -> LedgerResult<()> {
        if *signer != self.admin {
            return Err(GameError::Unauthorized);
        }
        self.game_cost = cost;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_ids_are_monotonic() {
        let mut registry = Registry::new(Address::hashed(b"admin"), 0);
        assert_eq!(registry.allocate_game_id().unwrap(), 0);
        assert_eq!(registry.allocate_game_id().unwrap(), 1);
        assert_eq!(registry.game_count, 2);
    }

    #[test]
    fn test_counter_overflow() {
        let mut registry = Registry::new(Address::hashed(b"admin"), 0);
        registry.game_count = u64::MAX;
        assert_eq!(
            registry.allocate_game_id(),
            Err(GameError::ArithmeticOverflow)
        );
        assert_eq!(registry.game_count, u64::MAX);
    }

    #[test]
    fn test_set_game_cost_admin_only() {
        let admin = Address::hashed(b"admin");
        let mut registry = Registry::new(admin, 5);
        assert_eq!(
            registry.set_game_cost(&Address::hashed(b"eve"), 0),
            Err(GameError::Unauthorized)
        );
        registry.set_game_cost(&admin, 7).unwrap();
        assert_eq!(registry.game_cost, 7);
    }
}
