//! Attack sessions: one in-flight attack on one tile.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::game::Color;

/// Where a session sits in its lifecycle at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Opened; the resolution delay has not elapsed.
    Pending,
    /// May be resolved.
    Resolvable,
    /// Abandoned past the expiry window; resolving forfeits it.
    Expired,
}

/// A pending attack, keyed by `(game, defender_tile)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackSession {
    /// Board the attack belongs to.
    pub game: Address,
    /// Tile under attack.
    pub defender_tile: u16,
    /// Colour of the defending tile when the attack was opened.
    pub defender_color: Color,
    /// Tile the attack comes from.
    pub attacker_tile: u16,
    /// Colour of the attacking tile when the attack was opened.
    pub attacker_color: Color,
    /// Opening time (unix seconds).
    pub started_at: i64,
    /// Wallet that paid the session rent.
    pub payer: Address,
    /// Set once resolved.
    pub resolved: bool,
    /// Set when the attacker took the tile.
    pub attacker_won: bool,
    /// Attacker's roll, once drawn.
    pub attacker_roll: u16,
    /// Defender's roll, once drawn.
    pub defender_roll: u16,
    /// Derivation nonce.
    pub bump: u8,
}

impl AttackSession {
    /// Stored size in bytes, discriminator included.
    pub const LEN: usize = 8 + 32 + 2 + 1 + 2 + 1 + 8 + 32 + 1 + 1 + 2 + 2 + 1;

    /// Status at `now` under the given delay and expiry windows.
    #[must_use]
    pub fn status(&self, now: i64, delay_secs: i64, expiry_secs: i64) -> SessionStatus {
        let age = now.saturating_sub(self.started_at);
        if age > expiry_secs {
            SessionStatus::Expired
        } else if age >= delay_secs {
            SessionStatus::Resolvable
        } else {
            SessionStatus::Pending
        }
    }
}
