//! Transactions and what they ask the ledger to do.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::game::{CombatOutcome, Color, Movement, Rolls};

/// One operation against the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instruction {
    /// Create the registry; the signer becomes its admin.
    CreateRegistry,
    /// Change the join cost (registry admin only).
    SetGameCost {
        /// New cost in lamports.
        cost: u64,
    },
    /// Create a game board with the signer as admin.
    CreateGame,
    /// Register a profile for the signing wallet.
    CreatePlayer {
        /// Display name, at most 32 bytes.
        name: String,
        /// Delegated signer; null for none.
        delegated_signer: Address,
    },
    /// Replace the delegated signer (primary wallet only).
    SetDelegatedSigner {
        /// New delegate; null clears delegation.
        delegate: Address,
    },
    /// Join a waiting game, paying the registry's game cost.
    JoinGame {
        /// Game to join.
        game_id: u64,
    },
    /// Move resources between adjacent tiles in the player's game.
    MoveResources {
        /// Tile to move from.
        source: u16,
        /// Tile to move to.
        destination: u16,
        /// Resources to move.
        amount: u16,
    },
    /// Spend pool allowance onto one of the player's tiles.
    AddResources {
        /// Tile to reinforce.
        tile: u16,
        /// Resources to add.
        amount: u32,
    },
    /// Open an attack session against a rival tile.
    AttackTile {
        /// Tile attacking.
        attacker_tile: u16,
        /// Tile attacked.
        defender_tile: u16,
    },
    /// Resolve and close an attack session.
    ResolveAttack {
        /// Session address.
        session: Address,
        /// Wallet that receives the session's rent.
        rent_destination: Address,
    },
    /// Pay the treasury to the winner and finish the game.
    ClaimPrize,
}

impl Instruction {
    /// Short name for log lines.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateRegistry => "create_registry",
            Self::SetGameCost { .. } => "set_game_cost",
            Self::CreateGame => "create_game",
            Self::CreatePlayer { .. } => "create_player",
            Self::SetDelegatedSigner { .. } => "set_delegated_signer",
            Self::JoinGame { .. } => "join_game",
            Self::MoveResources { .. } => "move_resources",
            Self::AddResources { .. } => "add_resources",
            Self::AttackTile { .. } => "attack_tile",
            Self::ResolveAttack { .. } => "resolve_attack",
            Self::ClaimPrize => "claim_prize",
        }
    }
}

/// A signed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Key that signed the transaction.
    pub signer: Address,
    /// Wallet whose profile acts. Differs from `signer` under delegation.
    pub player: Address,
    /// What to do.
    pub instruction: Instruction,
}

impl Transaction {
    /// Transaction signed by `signer` on behalf of `player`.
    #[must_use]
    pub const fn new(signer: Address, player: Address, instruction: Instruction) -> Self {
        Self {
            signer,
            player,
            instruction,
        }
    }

    /// Transaction signed by `wallet` for itself.
    #[must_use]
    pub const fn by(wallet: Address, instruction: Instruction) -> Self {
        Self::new(wallet, wallet, instruction)
    }
}

/// How an attack session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Rolls were drawn and applied.
    Fought {
        /// Drawn rolls.
        rolls: Rolls,
        /// Effect on both tiles.
        outcome: CombatOutcome,
    },
    /// Resolved past the expiry window; no combat.
    Forfeited,
    /// A tile changed colour or the game ended; no combat.
    Void,
}

/// What a successful transaction did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receipt {
    /// Nothing worth reporting beyond success.
    Done,
    /// A board was created.
    GameCreated {
        /// Assigned id.
        game_id: u64,
        /// Board address.
        address: Address,
    },
    /// A player took a seat.
    Joined {
        /// Colour assigned.
        color: Color,
        /// Whether this join started the game.
        started: bool,
    },
    /// Resources moved.
    Moved(Movement),
    /// An attack session was opened.
    AttackOpened {
        /// Session address.
        session: Address,
    },
    /// An attack session was closed.
    AttackResolved(Resolution),
    /// The prize was paid.
    PrizeClaimed {
        /// Lamports paid to the winner.
        amount: u64,
    },
}
