//! Game layer for Hexone.
//!
//! Implements the board rules independent of any ledger:
//! - Hex map geometry and tiles
//! - Position tiers and their experience bonus
//! - Lazy accrual of the resource pool and experience
//! - Combat rolls and losses
//! - Player profiles and signer authorization
//! - Attack sessions

mod board;
mod combat;
mod economy;
pub mod invariants;
mod map;
mod player;
mod session;
mod tier;

pub use board::{GameBoard, GameState, Movement, color_of_seat};
pub use combat::{CombatOutcome, ROLL_RANGE, Rolls, combat_loss, resolve_combat, roll};
pub use economy::{Accrual, PlayerEconomy, ResourcePool, SECONDS_PER_MINUTE, accrue};
pub use map::{
    CENTER, COLUMNS, Color, Coord, MAX_PLAYERS, PLAYABLE_TILES, ROWS, STARTING_CORNERS,
    TILE_SLOTS, Tile, are_tiles_adjacent, playable_cells,
};
pub use player::{NAME_LEN, PlayerName, PlayerProfile, PlayerStatus};
pub use session::{AttackSession, SessionStatus};
pub use tier::{Tier, TierCounts, TierRates};
