//! Position tiers and the bonus experience they earn.
//!
//! Tiers are concentric rings around the centre cell: the centre and its
//! neighbours are gold, the next ring silver, the one after bronze, and
//! everything else iron.

use serde::{Deserialize, Serialize};

use crate::game::{CENTER, Coord};

/// Position class of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Centre cell and its ring.
    Gold,
    /// Distance 2 from the centre.
    Silver,
    /// Distance 3 from the centre.
    Bronze,
    /// Everything further out.
    Iron,
}

impl Tier {
    /// Tier of the cell at `coord`.
    #[must_use]
    pub fn of(coord: Coord) -> Self {
        match coord.distance(CENTER) {
            0 | 1 => Self::Gold,
            2 => Self::Silver,
            3 => Self::Bronze,
            _ => Self::Iron,
        }
    }

    /// Tier of the cell at `index`, or `None` for a non-playable index.
    #[must_use]
    pub fn of_index(index: u16) -> Option<Self> {
        Coord::from_index(index).map(Self::of)
    }
}

/// Per-tier count of tiles held by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TierCounts {
    /// Gold tiles held.
    pub gold: u32,
    /// Silver tiles held.
    pub silver: u32,
    /// Bronze tiles held.
    pub bronze: u32,
    /// Iron tiles held.
    pub iron: u32,
}

impl TierCounts {
    fn slot_mut(&mut self, tier: Tier) -> &mut u32 {
        match tier {
            Tier::Gold => &mut self.gold,
            Tier::Silver => &mut self.silver,
            Tier::Bronze => &mut self.bronze,
            Tier::Iron => &mut self.iron,
        }
    }

    /// Record a gained tile.
    pub fn gain(&mut self, tier: Tier) {
        let slot = self.slot_mut(tier);
        *slot = slot.saturating_add(1);
    }

    /// Record a lost tile.
    pub fn lose(&mut self, tier: Tier) {
        let slot = self.slot_mut(tier);
        *slot = slot.saturating_sub(1);
    }

    /// Tiles across all tiers.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.gold + self.silver + self.bronze + self.iron
    }
}

/// Bonus experience per minute for each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierRates {
    /// Bonus per gold tile per minute.
    pub gold: u32,
    /// Bonus per silver tile per minute.
    pub silver: u32,
    /// Bonus per bronze tile per minute.
    pub bronze: u32,
    /// Bonus per iron tile per minute.
    pub iron: u32,
}

impl Default for TierRates {
    fn default() -> Self {
        Self {
            gold: 10,
            silver: 5,
            bronze: 2,
            iron: 0,
        }
    }
}

impl TierRates {
    /// Bonus experience per minute earned by `counts`.
    #[must_use]
    pub fn bonus_per_minute(&self, counts: &TierCounts) -> u64 {
        u64::from(counts.gold) * u64::from(self.gold)
            + u64::from(counts.silver) * u64::from(self.silver)
            + u64::from(counts.bronze) * u64::from(self.bronze)
            + u64::from(counts.iron) * u64::from(self.iron)
    }
}
