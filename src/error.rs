//! Error types for ledger operations.
//!
//! Every rejection is terminal for the transaction that produced it: the
//! ledger checks all preconditions before touching an account, so a failed
//! transaction leaves every account byte-for-byte unchanged.

use thiserror::Error;

/// A caller-visible rejection of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// Signer is not the admin of the registry.
    #[error("unauthorized: signer is not the registry admin")]
    Unauthorized,
    /// Signer is neither the player's wallet nor its delegated signer.
    #[error("player is not authorized")]
    PlayerNotAuthorized,
    /// Player profile is already seated in a game.
    #[error("player is not ready to join a game")]
    PlayerNotReady,
    /// Game is not accepting joins.
    #[error("game is not in waiting state")]
    GameNotWaiting,
    /// All four seats are taken.
    #[error("game is full")]
    GameFull,
    /// Board operations require a game that is in progress.
    #[error("game is not in progress")]
    GameNotInProgress,
    /// Tile index is outside the board or names a disabled cell.
    #[error("invalid tile index {0}")]
    InvalidTileIndex(u16),
    /// Source and destination name the same tile.
    #[error("source and destination are the same tile")]
    SameTile,
    /// Tiles are not hex neighbours.
    #[error("tiles are not adjacent")]
    TileNotAdjacent,
    /// Tile is not held by the acting player's colour.
    #[error("tile is not owned by the acting player")]
    TileNotOwned,
    /// Resources may only be moved onto unclaimed or friendly tiles.
    #[error("destination tile is held by a rival")]
    TileOwnedByRival,
    /// Attacks must target a tile held by another colour.
    #[error("target tile is not held by a rival")]
    NotAnEnemyTile,
    /// Amount would empty the source tile or exceeds what it holds.
    #[error("insufficient resources on tile")]
    InsufficientResources,
    /// Amount must be at least one.
    #[error("amount must be positive")]
    InvalidAmount,
    /// Tile resource count would exceed its 16-bit capacity.
    #[error("tile resource count would overflow")]
    TileOverflow,
    /// An attack session already exists for the defending tile.
    #[error("an attack on this tile is already in progress")]
    AttackAlreadyInProgress,
    /// The resolution delay has not elapsed yet.
    #[error("attack is not ready to resolve")]
    AttackNotReady,
    /// No open attack session at the given address.
    #[error("attack session not found")]
    AttackSessionNotFound,
    /// Spending would push the player past the shared pool ceiling.
    #[error("resource spend exceeds the available pool")]
    ResourceSpendExceedsPool,
    /// The registry was created already.
    #[error("registry already initialized")]
    RegistryAlreadyInitialized,
    /// The registry has not been created.
    #[error("registry not initialized")]
    RegistryNotInitialized,
    /// A profile already exists for this wallet.
    #[error("player profile already exists")]
    PlayerAlreadyExists,
    /// No profile exists for this wallet.
    #[error("player profile not found")]
    PlayerNotFound,
    /// No game board at the given address.
    #[error("game not found")]
    GameNotFound,
    /// Wallet holds no seat in this game.
    #[error("player is not seated in this game")]
    PlayerNotInGame,
    /// Payer cannot cover the lamports the instruction moves.
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds {
        /// Lamports required.
        needed: u64,
        /// Lamports held by the payer.
        available: u64,
    },
    /// No player has reached the winning experience yet.
    #[error("no winner has been determined")]
    NoWinnerYet,
    /// Claimant is not the winning player.
    #[error("player is not the winner")]
    NotWinner,
    /// Display names are limited to 32 bytes.
    #[error("player name exceeds 32 bytes")]
    NameTooLong,
    /// The ledger's game rules fail validation.
    #[error("game rules are invalid")]
    InvalidConfig,
    /// A counter would overflow.
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, GameError>;
