//! Board geometry and tile type.
//!
//! The board is an 11 × 13 staggered hex grid in an odd-q offset layout:
//! odd columns sit half a cell lower than even columns. Tiles are stored
//! row-major in a fixed 144-slot array; the odd columns of the final row are
//! disabled, leaving 137 playable cells.

use serde::{Deserialize, Serialize};

/// Number of rows on the board.
pub const ROWS: u8 = 11;
/// Number of columns on the board.
pub const COLUMNS: u8 = 13;
/// Stored tile slots. Slot 143 is padding.
pub const TILE_SLOTS: usize = 144;
/// Cells that can hold a colour.
pub const PLAYABLE_TILES: usize = 137;
/// Seats per game.
pub const MAX_PLAYERS: usize = 4;

/// A player colour, `1..=4`. Stored as 0 when a tile is unclaimed.
pub type Color = u8;

/// Neighbour offsets `(d_col, d_row)` for even columns.
const EVEN_COLUMN_OFFSETS: [(i8, i8); 6] = [(1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (0, 1)];

/// Neighbour offsets `(d_col, d_row)` for odd columns.
const ODD_COLUMN_OFFSETS: [(i8, i8); 6] = [(1, 1), (1, 0), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// Starting cell of each colour, in seat order.
pub const STARTING_CORNERS: [Coord; MAX_PLAYERS] = [
    Coord::new(0, 0),
    Coord::new(0, COLUMNS - 1),
    Coord::new(ROWS - 1, 0),
    Coord::new(ROWS - 1, COLUMNS - 1),
];

/// The centre cell, origin of the tier rings.
pub const CENTER: Coord = Coord::new(ROWS / 2, COLUMNS / 2);

/// A cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    /// Row, `0..ROWS`.
    pub row: u8,
    /// Column, `0..COLUMNS`.
    pub col: u8,
}

impl Coord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Whether the cell is on the board and not disabled.
    #[must_use]
    pub const fn is_playable(self) -> bool {
        self.row < ROWS && self.col < COLUMNS && !(self.row == ROWS - 1 && self.col % 2 == 1)
    }

    /// Convert a tile index to a playable coordinate.
    #[must_use]
    pub fn from_index(index: u16) -> Option<Self> {
        let row = u8::try_from(index / u16::from(COLUMNS)).ok()?;
        let col = u8::try_from(index % u16::from(COLUMNS)).ok()?;
        let coord = Self::new(row, col);
        coord.is_playable().then_some(coord)
    }

    /// Row-major tile index.
    #[must_use]
    pub const fn index(self) -> u16 {
        self.row as u16 * COLUMNS as u16 + self.col as u16
    }

    /// Playable neighbours.
    ///
    /// Returns a fixed-size array and count to avoid heap allocation.
    /// The array contains valid coordinates in indices 0..count.
    #[must_use]
    #[inline]
    pub fn adjacent(self) -> ([Coord; 6], u8) {
        let offsets = if self.col % 2 == 1 {
            &ODD_COLUMN_OFFSETS
        } else {
            &EVEN_COLUMN_OFFSETS
        };

        let mut result = [Coord::new(0, 0); 6];
        let mut count = 0u8;
        for &(d_col, d_row) in offsets {
            let Some(row) = self.row.checked_add_signed(d_row) else {
                continue;
            };
            let Some(col) = self.col.checked_add_signed(d_col) else {
                continue;
            };
            let neighbor = Coord::new(row, col);
            if neighbor.is_playable() {
                result[count as usize] = neighbor;
                count += 1;
            }
        }
        (result, count)
    }

    /// Whether `other` is one of this cell's neighbours.
    #[must_use]
    pub fn is_adjacent(self, other: Coord) -> bool {
        let (adjacent, count) = self.adjacent();
        adjacent[..count as usize].contains(&other)
    }

    /// Cube coordinates of this cell.
    const fn cube(self) -> (i16, i16, i16) {
        let x = self.col as i16;
        let z = self.row as i16 - (self.col as i16 - (self.col as i16 & 1)) / 2;
        (x, -x - z, z)
    }

    /// Hex step distance between two cells.
    #[must_use]
    pub fn distance(self, other: Coord) -> u16 {
        let (ax, ay, az) = self.cube();
        let (bx, by, bz) = other.cube();
        (ax - bx)
            .unsigned_abs()
            .max((ay - by).unsigned_abs())
            .max((az - bz).unsigned_abs())
    }
}

/// Whether two tile indices name neighbouring playable cells.
#[must_use]
pub fn are_tiles_adjacent(a: u16, b: u16) -> bool {
    match (Coord::from_index(a), Coord::from_index(b)) {
        (Some(a), Some(b)) => a.is_adjacent(b),
        _ => false,
    }
}

/// Iterate all playable cells in index order.
pub fn playable_cells() -> impl Iterator<Item = Coord> {
    (0..TILE_SLOTS as u16).filter_map(Coord::from_index)
}

/// A single cell's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Owning colour (None = unclaimed).
    pub owner: Option<Color>,
    /// Resources stationed on this tile.
    pub resources: u16,
}

impl Tile {
    /// An unclaimed, empty tile.
    pub const EMPTY: Self = Self {
        owner: None,
        resources: 0,
    };

    /// A tile held by `color` with `resources` on it.
    #[must_use]
    pub const fn owned(color: Color, resources: u16) -> Self {
        Self {
            owner: Some(color),
            resources,
        }
    }

    /// Whether `color` holds this tile.
    #[must_use]
    pub fn is_owned_by(&self, color: Color) -> bool {
        self.owner == Some(color)
    }
}
