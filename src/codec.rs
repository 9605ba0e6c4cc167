//! Persisted layout of a game board.
//!
//! An 8-byte account discriminator, then every field in declaration order,
//! little endian, with fixed widths:
//!
//! ```text
//! discriminator        8   sha256("account:GameBoard")[..8]
//! admin               32
//! players          4 × 32
//! game_id              8
//! pool anchor          8   i64
//! experience anchors 4 × 8 i64
//! resources/minute     4
//! total available      4
//! resources spent  4 × 4
//! xp/minute/tile       4
//! experience       4 × 4
//! tile counts      4 × 4
//! tiles          144 × 4   [colour, padding, resources u16]
//! tier counts     4 × 16   gold, silver, bronze, iron
//! tier rates          16
//! winner              33   tag byte + address
//! winning xp limit     4
//! state                1
//! rows, columns        2
//! version              1
//! ```

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::address::Address;
use crate::game::{
    COLUMNS, Coord, GameBoard, GameState, MAX_PLAYERS, PlayerEconomy, ROWS, ResourcePool, TILE_SLOTS,
    TierCounts, TierRates, Tile,
};

/// Bytes in an encoded tile.
pub const TILE_LEN: usize = 4;

/// Offset of the tile array within an encoded board.
pub const TILES_OFFSET: usize = 8 // discriminator
    + 32 * (1 + MAX_PLAYERS) // admin, players
    + 8 // game id
    + 8 * (1 + MAX_PLAYERS) // anchors
    + 4 * 2 // pool rate and ceiling
    + 4 * MAX_PLAYERS // spent
    + 4 // xp rate
    + 4 * MAX_PLAYERS * 2; // experience, tile counts

/// Total encoded board size.
pub const BOARD_LEN: usize =
    TILES_OFFSET + TILE_LEN * TILE_SLOTS + 16 * MAX_PLAYERS + 16 + 33 + 4 + 1 + 2 + 1;

/// Errors decoding a stored board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input length differs from the fixed board size.
    #[error("expected {expected} bytes, got {actual}")]
    Length {
        /// Required length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },
    /// The leading 8 bytes do not name a game board.
    #[error("account discriminator does not match GameBoard")]
    Discriminator,
    /// Lifecycle byte out of range.
    #[error("invalid game state byte {0}")]
    State(u8),
    /// Winner tag is neither 0 nor 1.
    #[error("invalid option tag {0}")]
    OptionTag(u8),
    /// Tile colour outside `0..=4`.
    #[error("tile {index} has invalid colour {color}")]
    Color {
        /// Tile index.
        index: usize,
        /// Colour byte found.
        color: u8,
    },
    /// A disabled or padding slot is not empty.
    #[error("non-playable slot {0} is occupied")]
    DisabledTile(usize),
    /// Stored dimensions disagree with the board geometry.
    #[error("unexpected board dimensions {rows}x{columns}")]
    Dimensions {
        /// Rows stored.
        rows: u8,
        /// Columns stored.
        columns: u8,
    },
}

/// Discriminator prefix of a stored board.
#[must_use]
pub fn board_discriminator() -> [u8; 8] {
    let digest = Sha256::digest(b"account:GameBoard");
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

/// Serialize `board` to its fixed layout.
#[must_use]
pub fn encode_board(board: &GameBoard) -> Vec<u8> {
    let mut out = Vec::with_capacity(BOARD_LEN);
    out.extend_from_slice(&board_discriminator());
    out.extend_from_slice(board.admin.as_bytes());
    for player in &board.players {
        out.extend_from_slice(player.as_bytes());
    }
    out.extend_from_slice(&board.game_id.to_le_bytes());
    out.extend_from_slice(&board.pool.anchor.to_le_bytes());
    for economy in &board.economies {
        out.extend_from_slice(&economy.experience_anchor.to_le_bytes());
    }
    out.extend_from_slice(&board.pool.per_minute.to_le_bytes());
    out.extend_from_slice(&board.pool.total_available.to_le_bytes());
    for economy in &board.economies {
        out.extend_from_slice(&economy.resources_spent.to_le_bytes());
    }
    out.extend_from_slice(&board.xp_per_minute_per_tile.to_le_bytes());
    for economy in &board.economies {
        out.extend_from_slice(&economy.experience.to_le_bytes());
    }
    for economy in &board.economies {
        out.extend_from_slice(&economy.tile_count.to_le_bytes());
    }
    for tile in &board.tiles {
        out.push(tile.owner.unwrap_or(0));
        out.push(0);
        out.extend_from_slice(&tile.resources.to_le_bytes());
    }
    for economy in &board.economies {
        let tiers = &economy.tiers;
        for count in [tiers.gold, tiers.silver, tiers.bronze, tiers.iron] {
            out.extend_from_slice(&count.to_le_bytes());
        }
    }
    let rates = &board.tier_rates;
    for rate in [rates.gold, rates.silver, rates.bronze, rates.iron] {
        out.extend_from_slice(&rate.to_le_bytes());
    }
    match board.winner {
        Some(winner) => {
            out.push(1);
            out.extend_from_slice(winner.as_bytes());
        }
        None => out.extend_from_slice(&[0u8; 33]),
    }
    out.extend_from_slice(&board.winning_xp_limit.to_le_bytes());
    out.push(match board.state {
        GameState::Waiting => 0,
        GameState::InProgress => 1,
        GameState::Completed => 2,
        GameState::WinnerPendingPayout => 3,
    });
    out.push(board.rows);
    out.push(board.columns);
    out.push(board.version);
    out
}

/// Cursor over an input already checked to be `BOARD_LEN` long.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        out.copy_from_slice(&self.bytes[self.pos..self.pos + N]);
        self.pos += N;
        out
    }

    fn u8(&mut self) -> u8 {
        self.take::<1>()[0]
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes(self.take())
    }

    fn u32(&mut self) -> u32 {
        u32::from_le_bytes(self.take())
    }

    fn u64(&mut self) -> u64 {
        u64::from_le_bytes(self.take())
    }

    fn i64(&mut self) -> i64 {
        i64::from_le_bytes(self.take())
    }

    fn address(&mut self) -> Address {
        Address::new(self.take())
    }
}

/// Parse a board from its fixed layout.
///
/// # Errors
///
/// Rejects wrong lengths, foreign discriminators, out-of-range enum bytes,
/// invalid colours, occupied non-playable slots and foreign dimensions.
pub fn decode_board(bytes: &[u8]) -> Result<GameBoard, CodecError> {
    if bytes.len() != BOARD_LEN {
        return Err(CodecError::Length {
            expected: BOARD_LEN,
            actual: bytes.len(),
        });
    }
    let mut r = Reader { bytes, pos: 0 };
    if r.take::<8>() != board_discriminator() {
        return Err(CodecError::Discriminator);
    }

    let admin = r.address();
    let players = [r.address(), r.address(), r.address(), r.address()];
    let game_id = r.u64();
    let pool_anchor = r.i64();
    let mut economies = [PlayerEconomy::default(); MAX_PLAYERS];
    for economy in &mut economies {
        economy.experience_anchor = r.i64();
    }
    let per_minute = r.u32();
    let total_available = r.u32();
    for economy in &mut economies {
        economy.resources_spent = r.u32();
    }
    let xp_per_minute_per_tile = r.u32();
    for economy in &mut economies {
        economy.experience = r.u32();
    }
    for economy in &mut economies {
        economy.tile_count = r.u32();
    }

    let mut tiles = [Tile::EMPTY; TILE_SLOTS];
    for (index, tile) in tiles.iter_mut().enumerate() {
        let color = r.u8();
        let _padding = r.u8();
        let resources = r.u16();
        let owner = match color {
            0 => None,
            1..=4 => Some(color),
            _ => return Err(CodecError::Color { index, color }),
        };
        *tile = Tile { owner, resources };
        let playable = u16::try_from(index)
            .ok()
            .and_then(Coord::from_index)
            .is_some();
        if !playable && *tile != Tile::EMPTY {
            return Err(CodecError::DisabledTile(index));
        }
    }

    for economy in &mut economies {
        economy.tiers = TierCounts {
            gold: r.u32(),
            silver: r.u32(),
            bronze: r.u32(),
            iron: r.u32(),
        };
    }
    let tier_rates = TierRates {
        gold: r.u32(),
        silver: r.u32(),
        bronze: r.u32(),
        iron: r.u32(),
    };
    let winner = match r.u8() {
        0 => {
            r.take::<32>();
            None
        }
        1 => Some(r.address()),
        tag => return Err(CodecError::OptionTag(tag)),
    };
    let winning_xp_limit = r.u32();
    let state = match r.u8() {
        0 => GameState::Waiting,
        1 => GameState::InProgress,
        2 => GameState::Completed,
        3 => GameState::WinnerPendingPayout,
        other => return Err(CodecError::State(other)),
    };
    let rows = r.u8();
    let columns = r.u8();
    if rows != ROWS || columns != COLUMNS {
        return Err(CodecError::Dimensions { rows, columns });
    }
    let version = r.u8();

    Ok(GameBoard {
        admin,
        players,
        game_id,
        pool: ResourcePool {
            anchor: pool_anchor,
            per_minute,
            total_available,
        },
        xp_per_minute_per_tile,
        economies,
        tiles,
        tier_rates,
        winner,
        winning_xp_limit,
        state,
        rows,
        columns,
        version,
    })
}
