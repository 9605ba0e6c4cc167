//! Account addresses and deterministic derivation.
//!
//! Every entity lives at an address computed from a fixed prefix and its
//! logical key, so any caller can recompute where a game, profile, or attack
//! session lives without a lookup index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Domain separator mixed into every derived address.
const DERIVATION_DOMAIN: &[u8] = b"hexone/derive/v1";

/// Seed prefix of the registry account.
pub const REGISTRY_SEED: &[u8] = b"hexone";
/// Seed prefix of game board accounts.
pub const GAME_SEED: &[u8] = b"game";
/// Seed prefix of player profile accounts.
pub const PLAYER_SEED: &[u8] = b"player";
/// Seed prefix of attack session accounts.
pub const ATTACK_SEED: &[u8] = b"defender";
/// Seed prefix of per-game treasury accounts.
pub const TREASURY_SEED: &[u8] = b"game_treasury";

/// A 32-byte account or wallet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 32]);

impl Address {
    /// The null address. Marks empty seats and "no delegation".
    pub const NULL: Self = Self([0u8; 32]);

    /// Wrap raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the address.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Whether this is the null sentinel.
    #[must_use]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    /// Hash an arbitrary label into an address. Handy for naming wallets.
    #[must_use]
    pub fn hashed(label: &[u8]) -> Self {
        let digest = Sha256::digest(label);
        Self(digest.into())
    }

    /// Derive an address from seed parts.
    ///
    /// Each seed is length-prefixed so `["ab", "c"]` and `["a", "bc"]`
    /// never collide.
    #[must_use]
    pub fn derive(seeds: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(DERIVATION_DOMAIN);
        for seed in seeds {
            hasher.update([u8::try_from(seed.len()).unwrap_or(u8::MAX)]);
            hasher.update(seed);
        }
        Self(hasher.finalize().into())
    }

    /// First four bytes as hex, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex_encode(&self.0[..4])
    }
}

/// Address of the process-wide registry.
#[must_use]
pub fn registry_address() -> Address {
    Address::derive(&[REGISTRY_SEED])
}

/// Address of the board for `game_id` (prefix + 8-byte little-endian id).
#[must_use]
pub fn game_address(game_id: u64) -> Address {
    Address::derive(&[GAME_SEED, &game_id.to_le_bytes()])
}

/// Address of the profile owned by `wallet`.
#[must_use]
pub fn player_address(wallet: &Address) -> Address {
    Address::derive(&[PLAYER_SEED, wallet.as_bytes()])
}

/// Address of the attack session on `defender_tile` in `game`.
#[must_use]
pub fn attack_address(game: &Address, defender_tile: u16) -> Address {
    Address::derive(&[ATTACK_SEED, game.as_bytes(), &defender_tile.to_le_bytes()])
}

/// Address of the prize treasury of `game`.
#[must_use]
pub fn treasury_address(game: &Address) -> Address {
    Address::derive(&[TREASURY_SEED, game.as_bytes()])
}

fn hex_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(char::from(DIGITS[usize::from(byte >> 4)]));
        out.push(char::from(DIGITS[usize::from(byte & 0x0f)]));
    }
    out
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

/// Error parsing an address from its hex form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid address: expected 64 hex digits")]
pub struct ParseAddressError;

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.as_bytes();
        if digits.len() != 64 {
            return Err(ParseAddressError);
        }
        let mut bytes = [0u8; 32];
        for (i, pair) in digits.chunks_exact(2).enumerate() {
            let hi = hex_value(pair[0]).ok_or(ParseAddressError)?;
            let lo = hex_value(pair[1]).ok_or(ParseAddressError)?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex_encode(&self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(game_address(7), game_address(7));
        assert_ne!(game_address(7), game_address(8));
        assert_ne!(registry_address(), Address::NULL);
    }

    #[test]
    fn test_attack_address_keyed_by_game_and_tile() {
        let game = game_address(0);
        let other = game_address(1);
        assert_eq!(attack_address(&game, 12), attack_address(&game, 12));
        assert_ne!(attack_address(&game, 12), attack_address(&game, 13));
        assert_ne!(attack_address(&game, 12), attack_address(&other, 12));
    }

    #[test]
    fn test_seed_boundaries_do_not_collide() {
        assert_ne!(
            Address::derive(&[b"ab", b"c"]),
            Address::derive(&[b"a", b"bc"])
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let wallet = Address::hashed(b"alice");
        let parsed: Address = wallet.to_string().parse().unwrap();
        assert_eq!(parsed, wallet);
        assert!("zz".parse::<Address>().is_err());
        assert_eq!(wallet.short().len(), 8);
    }

    #[test]
    fn test_null_sentinel() {
        assert!(Address::NULL.is_null());
        assert!(Address::default().is_null());
        assert!(!Address::hashed(b"bob").is_null());
    }
}
