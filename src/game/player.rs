//! Player profiles and signer authorization.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{GameError, LedgerResult};

/// Fixed width of a stored display name.
pub const NAME_LEN: usize = 32;

/// A display name, zero-padded to 32 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerName([u8; NAME_LEN]);

impl PlayerName {
    /// Pad `name` to 32 bytes.
    ///
    /// # Errors
    ///
    /// Returns `NameTooLong` if `name` is longer than 32 bytes.
    pub fn new(name: &str) -> LedgerResult<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_LEN {
            return Err(GameError::NameTooLong);
        }
        let mut padded = [0u8; NAME_LEN];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(padded))
    }

    /// Wrap raw stored bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; NAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Stored bytes, including padding.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NAME_LEN] {
        &self.0
    }

    /// The name with padding stripped. Invalid UTF-8 is replaced.
    #[must_use]
    pub fn as_string(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Whether a profile is free to join a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Not seated anywhere.
    #[default]
    Ready,
    /// Seated in `active_game`.
    Playing,
}

/// Per-wallet identity and lifetime stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Primary wallet. Also the profile's derivation key.
    pub wallet: Address,
    /// Display name.
    pub name: PlayerName,
    /// Games joined.
    pub games_played: u32,
    /// Prizes claimed.
    pub games_won: u32,
    /// Game the player is seated in, if any.
    pub active_game: Option<Address>,
    /// Creation time (unix seconds).
    pub created_at: i64,
    /// Ready or Playing.
    pub status: PlayerStatus,
    /// Secondary key allowed to act for this player. Null means none.
    pub delegated_signer: Address,
    /// Schema version.
    pub version: u8,
}

impl PlayerProfile {
    /// Current schema version.
    pub const VERSION: u8 = 1;

    /// A fresh, ready profile.
    #[must_use]
    pub const fn new(
        wallet: Address,
        name: PlayerName,
        delegated_signer: Address,
        created_at: i64,
    ) -> Self {
        Self {
            wallet,
            name,
            games_played: 0,
            games_won: 0,
            active_game: None,
            created_at,
            status: PlayerStatus::Ready,
            delegated_signer,
            version: Self::VERSION,
        }
    }

    /// Accept `signer` iff it is the primary wallet or the delegated signer.
    ///
    /// A null signer never matches an unset delegation.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNotAuthorized` for any other signer.
    pub fn authorize(&self, signer: &Address) -> LedgerResult<()> {
        if *signer == self.wallet {
            return Ok(());
        }
        if !self.delegated_signer.is_null() && *signer == self.delegated_signer {
            return Ok(());
        }
        Err(GameError::PlayerNotAuthorized)
    }

    /// Whether the profile is free to join a game.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == PlayerStatus::Ready && self.active_game.is_none()
    }

    /// Seat the player in `game`.
    pub fn enter_game(&mut self, game: Address) {
        self.status = PlayerStatus::Playing;
        self.active_game = Some(game);
        self.games_played = self.games_played.saturating_add(1);
    }

    /// Release the player from their game.
    pub fn leave_game(&mut self) {
        self.status = PlayerStatus::Ready;
        self.active_game = None;
    }
}
