//! Ledger time and the slot hash chain.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Default genesis time: 2023-11-14T22:13:20Z.
pub const DEFAULT_START: i64 = 1_700_000_000;

/// Wall clock and the unpredictable slot hash that seeds combat rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    /// Current time (unix seconds).
    pub unix_timestamp: i64,
    /// Current slot. Bumped on every advance.
    pub slot: u64,
    /// Hash of the current slot, chained from genesis.
    pub slot_hash: [u8; 32],
}

impl Clock {
    /// Clock at slot zero, with a genesis hash derived from `seed`.
    #[must_use]
    pub fn genesis(seed: u64, start: i64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"hexone/genesis");
        hasher.update(seed.to_le_bytes());
        Self {
            unix_timestamp: start,
            slot: 0,
            slot_hash: hasher.finalize().into(),
        }
    }

    /// Move time forward by `seconds` and chain a new slot.
    pub fn advance(&mut self, seconds: i64) {
        self.unix_timestamp = self.unix_timestamp.saturating_add(seconds.max(0));
        self.slot = self.slot.wrapping_add(1);

        let mut hasher = Sha256::new();
        hasher.update(self.slot_hash);
        hasher.update(self.slot.to_le_bytes());
        self.slot_hash = hasher.finalize().into();
    }
}
