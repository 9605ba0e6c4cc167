// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Hexone: the authoritative state engine for a four-player hex
//! territory-conquest game.
//!
//! Players claim cells of an 11 by 13 hex board, spend a shared, time-gated
//! resource pool onto their tiles, expand into neighbouring cells and attack
//! rivals through a two-phase, time-delayed combat protocol. Experience
//! accrues per owned tile; the first seat to reach the limit takes the
//! treasury.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Simulation Runner / Recordings    │
//! ├─────────────────────────────────────┤
//! │   Ledger (accounts, clock, txs)     │
//! ├─────────────────────────────────────┤
//! │   Game Logic (board, economy, ...)  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Every transaction runs against copies of the accounts it touches and is
//! written back only when all checks pass, so a rejected transaction leaves
//! no trace.

pub mod address;
pub mod codec;
pub mod config;
pub mod error;
pub mod game;
pub mod ledger;
pub mod recording;
pub mod registry;
pub mod simulate;

pub use address::Address;
pub use config::{ConfigError, GameConfig};
pub use error::{GameError, LedgerResult};

// Re-export key game types at crate root for convenience
pub use game::{
    AttackSession, Color, Coord, GameBoard, GameState, PlayerProfile, Tile, Tier,
};
pub use ledger::{Instruction, Ledger, Receipt, Transaction};
pub use registry::Registry;
