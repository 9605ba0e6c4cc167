//! Economy: the shared resource pool and per-player experience.
//!
//! Both accrue lazily. Nothing ticks in the background; every operation
//! that depends on a counter first settles it from its anchor timestamp.
//!
//! # Accrual Model
//!
//! settled = stored + whole_minutes(now - anchor) × rate
//! anchor' = anchor + whole_minutes × 60
//!
//! Only whole minutes are credited and the anchor advances by exactly the
//! credited minutes, so the fractional remainder carries into the next
//! settlement instead of being lost or double counted.
//!
//! # Pool Model
//!
//! The pool is a ceiling, not a balance. `total_available` only grows with
//! time; each player tracks what they have spent against it separately, so
//! one player's spending never reduces another's allowance.

use serde::{Deserialize, Serialize};

use crate::game::{TierCounts, TierRates};

/// Length of one accrual cycle.
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Outcome of settling a lazily accrued counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Accrual {
    /// Settled counter value.
    pub value: u32,
    /// Anchor advanced by the credited minutes.
    pub anchor: i64,
    /// Whole minutes credited.
    pub minutes: u64,
}

/// Settle a counter that grows by `rate_per_minute` each whole minute.
///
/// Saturates at `u32::MAX`; the result is never below `stored`.
#[must_use]
pub fn accrue(stored: u32, anchor: i64, now: i64, rate_per_minute: u64) -> Accrual {
    let elapsed = now.saturating_sub(anchor);
    if elapsed < SECONDS_PER_MINUTE {
        return Accrual {
            value: stored,
            anchor,
            minutes: 0,
        };
    }

    let minutes = elapsed / SECONDS_PER_MINUTE;
    let gained = u64::try_from(minutes)
        .unwrap_or(0)
        .saturating_mul(rate_per_minute);
    let value = u64::from(stored)
        .saturating_add(gained)
        .min(u64::from(u32::MAX));

    Accrual {
        value: u32::try_from(value).unwrap_or(u32::MAX),
        anchor: anchor + minutes * SECONDS_PER_MINUTE,
        minutes: u64::try_from(minutes).unwrap_or(0),
    }
}

/// The shared, never-decreasing production ceiling of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    /// Anchor of the current production cycle.
    pub anchor: i64,
    /// Resources produced per minute.
    pub per_minute: u32,
    /// Ceiling on what each player may have spent in total.
    pub total_available: u32,
}

impl ResourcePool {
    /// Pool that starts producing at `start`.
    #[must_use]
    pub const fn new(start: i64, per_minute: u32) -> Self {
        Self {
            anchor: start,
            per_minute,
            total_available: 0,
        }
    }

    /// Ceiling as of `now`, without mutating.
    #[must_use]
    pub fn available_at(&self, now: i64) -> u32 {
        accrue(self.total_available, self.anchor, now, u64::from(self.per_minute)).value
    }

    /// Advance the ceiling to `now`. Returns the minutes credited.
    pub fn settle(&mut self, now: i64) -> u64 {
        let accrual = accrue(
            self.total_available,
            self.anchor,
            now,
            u64::from(self.per_minute),
        );
        self.total_available = self.total_available.max(accrual.value);
        self.anchor = accrual.anchor;
        accrual.minutes
    }
}

/// One seat's production, spending and experience ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerEconomy {
    /// Resources this player has drawn from the pool.
    pub resources_spent: u32,
    /// Settled experience.
    pub experience: u32,
    /// Anchor of this player's experience cycle.
    pub experience_anchor: i64,
    /// Tiles held by this seat's colour.
    pub tile_count: u32,
    /// Held tiles broken down by tier.
    pub tiers: TierCounts,
}

impl PlayerEconomy {
    /// Experience earned per minute at current holdings.
    #[must_use]
    pub fn experience_rate(&self, xp_per_tile: u32, rates: &TierRates) -> u64 {
        u64::from(self.tile_count) * u64::from(xp_per_tile) + rates.bonus_per_minute(&self.tiers)
    }

    /// Experience as of `now`, without mutating.
    #[must_use]
    pub fn experience_at(&self, now: i64, xp_per_tile: u32, rates: &TierRates) -> u32 {
        accrue(
            self.experience,
            self.experience_anchor,
            now,
            self.experience_rate(xp_per_tile, rates),
        )
        .value
    }

    /// Credit experience earned up to `now` at current holdings.
    ///
    /// Must run before holdings change so elapsed time is credited at the
    /// rate that was actually in effect.
    pub fn settle_experience(&mut self, now: i64, xp_per_tile: u32, rates: &TierRates) -> u64 {
        let accrual = accrue(
            self.experience,
            self.experience_anchor,
            now,
            self.experience_rate(xp_per_tile, rates),
        );
        self.experience = accrual.value;
        self.experience_anchor = accrual.anchor;
        accrual.minutes
    }

    /// What this player may still spend against `pool_ceiling`.
    #[must_use]
    pub fn allowance(&self, pool_ceiling: u32) -> u32 {
        pool_ceiling.saturating_sub(self.resources_spent)
    }
}

/// Kani formal verification proofs.
///
/// Run with: `cargo kani`
#[cfg(kani)]
mod kani_proofs {
    use super::*;

    /// Accrual never decreases the stored value.
    #[kani::proof]
    fn prove_accrual_monotonic() {
        let stored: u32 = kani::any();
        let anchor: i64 = kani::any();
        let now: i64 = kani::any();
        let rate: u64 = kani::any();

        kani::assume(anchor >= 0 && anchor < 1 << 40);
        kani::assume(now >= 0 && now < 1 << 40);

        let accrual = accrue(stored, anchor, now, rate);
        assert!(accrual.value >= stored);
        assert!(accrual.anchor >= anchor);
    }

    /// The anchor never passes `now`, so no fraction of a minute is lost.
    #[kani::proof]
    fn prove_anchor_bounded_by_now() {
        let anchor: i64 = kani::any();
        let now: i64 = kani::any();

        kani::assume(anchor >= 0 && anchor < 1 << 40);
        kani::assume(now >= anchor && now < 1 << 40);

        let accrual = accrue(0, anchor, now, 1);
        assert!(accrual.anchor <= now);
        assert!(now - accrual.anchor < SECONDS_PER_MINUTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accrue_needs_a_full_minute() {
        let accrual = accrue(5, 1000, 1059, 10);
        assert_eq!(accrual.value, 5);
        assert_eq!(accrual.anchor, 1000);
        assert_eq!(accrual.minutes, 0);

        let accrual = accrue(5, 1000, 1060, 10);
        assert_eq!(accrual.value, 15);
        assert_eq!(accrual.anchor, 1060);
    }

    #[test]
    fn test_accrue_keeps_fraction() {
        let accrual = accrue(0, 0, 150, 10);
        assert_eq!(accrual.minutes, 2);
        assert_eq!(accrual.value, 20);
        assert_eq!(accrual.anchor, 120);

        // The 30 leftover seconds count towards the next minute.
        let next = accrue(accrual.value, accrual.anchor, 180, 10);
        assert_eq!(next.value, 30);
        assert_eq!(next.anchor, 180);
    }

    #[test]
    fn test_accrue_clock_behind_anchor() {
        let accrual = accrue(7, 500, 100, 10);
        assert_eq!(accrual.value, 7);
        assert_eq!(accrual.anchor, 500);
    }

    #[test]
    fn test_accrue_saturates() {
        let accrual = accrue(u32::MAX - 1, 0, 600, u64::MAX);
        assert_eq!(accrual.value, u32::MAX);
    }

    #[test]
    fn test_pool_is_a_ceiling() {
        let mut pool = ResourcePool::new(0, 10);
        assert_eq!(pool.available_at(59), 0);
        assert_eq!(pool.available_at(61), 10);

        pool.settle(61);
        assert_eq!(pool.total_available, 10);
        assert_eq!(pool.anchor, 60);

        // Settling twice at the same instant changes nothing.
        pool.settle(61);
        assert_eq!(pool.total_available, 10);
    }

    #[test]
    fn test_allowance_is_per_player() {
        let a = PlayerEconomy {
            resources_spent: 10,
            ..PlayerEconomy::default()
        };
        let b = PlayerEconomy::default();
        assert_eq!(a.allowance(10), 0);
        assert_eq!(b.allowance(10), 10);
    }

    #[test]
    fn test_experience_includes_tier_bonus() {
        let mut economy = PlayerEconomy {
            tile_count: 3,
            tiers: TierCounts {
                gold: 1,
                silver: 0,
                bronze: 0,
                iron: 2,
            },
            ..PlayerEconomy::default()
        };
        let rates = TierRates::default();
        // 3 tiles × 1 + 1 gold × 10 = 13 per minute.
        assert_eq!(economy.experience_rate(1, &rates), 13);
        assert_eq!(economy.experience_at(125, 1, &rates), 26);

        let minutes = economy.settle_experience(125, 1, &rates);
        assert_eq!(minutes, 2);
        assert_eq!(economy.experience, 26);
        assert_eq!(economy.experience_anchor, 120);
    }
}
