//! The canonical per-game state.
//!
//! A board owns its tiles, the shared resource pool, one economy per seat
//! and the win condition. Every operation validates fully before it settles
//! accrual or touches a tile, so a rejected call leaves the board unchanged.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::GameConfig;
use crate::error::{GameError, LedgerResult};
use crate::game::{
    COLUMNS, CombatOutcome, Color, Coord, MAX_PLAYERS, PlayerEconomy, ROWS, ResourcePool,
    STARTING_CORNERS, TILE_SLOTS, Tier, TierRates, Tile, are_tiles_adjacent,
};

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Accepting joins.
    Waiting,
    /// All four seats taken; board operations allowed.
    InProgress,
    /// Prize paid out.
    Completed,
    /// A player reached the winning experience; prize unclaimed.
    WinnerPendingPayout,
}

/// What a successful move did to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    /// Destination was unclaimed and now belongs to the mover.
    Claimed,
    /// Destination already belonged to the mover.
    Reinforced,
}

/// One game's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameBoard {
    /// Wallet that created the game.
    pub admin: Address,
    /// Seated wallets in join order. Null until filled.
    pub players: [Address; MAX_PLAYERS],
    /// Identifier assigned by the registry.
    pub game_id: u64,
    /// Shared production ceiling.
    pub pool: ResourcePool,
    /// Experience earned per owned tile per minute.
    pub xp_per_minute_per_tile: u32,
    /// Per-seat spend, experience and holdings. Seat `i` plays colour `i + 1`.
    pub economies: [PlayerEconomy; MAX_PLAYERS],
    /// Row-major tiles; slot 143 and disabled cells stay empty.
    pub tiles: [Tile; TILE_SLOTS],
    /// Tier bonus rates.
    pub tier_rates: TierRates,
    /// Wallet that reached the winning experience first.
    pub winner: Option<Address>,
    /// Experience that wins.
    pub winning_xp_limit: u32,
    /// Lifecycle state.
    pub state: GameState,
    /// Board rows.
    pub rows: u8,
    /// Board columns.
    pub columns: u8,
    /// Schema version.
    pub version: u8,
}

fn seat_of(color: Color) -> Option<usize> {
    match color {
        1..=4 => Some(usize::from(color) - 1),
        _ => None,
    }
}

/// Colour played by seat `seat`.
#[must_use]
pub fn color_of_seat(seat: usize) -> Color {
    u8::try_from(seat + 1).unwrap_or(0)
}

impl GameBoard {
    /// Current schema version.
    pub const VERSION: u8 = 1;

    /// A waiting board with the four corners pre-owned.
    #[must_use]
    pub fn new(admin: Address, game_id: u64, now: i64, config: &GameConfig) -> Self {
        let mut board = Self {
            admin,
            players: [Address::NULL; MAX_PLAYERS],
            game_id,
            pool: ResourcePool::new(now, config.resources_per_minute),
            xp_per_minute_per_tile: config.xp_per_minute_per_tile,
            economies: [PlayerEconomy::default(); MAX_PLAYERS],
            tiles: [Tile::EMPTY; TILE_SLOTS],
            tier_rates: config.tier_rates,
            winner: None,
            winning_xp_limit: config.winning_xp_limit,
            state: GameState::Waiting,
            rows: ROWS,
            columns: COLUMNS,
            version: Self::VERSION,
        };

        for (seat, corner) in STARTING_CORNERS.into_iter().enumerate() {
            let color = color_of_seat(seat);
            board.tiles[usize::from(corner.index())] = Tile::owned(color, config.starting_resources);
            let economy = &mut board.economies[seat];
            economy.tile_count = 1;
            economy.tiers.gain(Tier::of(corner));
            economy.experience_anchor = now;
        }
        board
    }

    /// Number of filled seats.
    #[must_use]
    pub fn seated(&self) -> usize {
        self.players.iter().take_while(|p| !p.is_null()).count()
    }

    /// Colour played by `wallet`, if seated.
    #[must_use]
    pub fn color_of(&self, wallet: &Address) -> Option<Color> {
        if wallet.is_null() {
            return None;
        }
        self.players
            .iter()
            .position(|p| p == wallet)
            .map(color_of_seat)
    }

    /// Seat `wallet` in the first empty slot and return its colour.
    ///
    /// Filling the fourth seat starts the game: the pool and every
    /// experience anchor restart at `now`.
    ///
    /// # Errors
    ///
    /// `GameNotWaiting` unless waiting, `GameFull` if no seat is free.
    pub fn seat(&mut self, wallet: Address, now: i64) -> LedgerResult<Color> {
        if self.state != GameState::Waiting {
            return Err(GameError::GameNotWaiting);
        }
        let seat = self.seated();
        if seat >= MAX_PLAYERS {
            return Err(GameError::GameFull);
        }

        self.players[seat] = wallet;
        if seat + 1 == MAX_PLAYERS {
            self.state = GameState::InProgress;
            self.pool.anchor = now;
            for economy in &mut self.economies {
                economy.experience_anchor = now;
            }
        }
        Ok(color_of_seat(seat))
    }

    /// Tile at a playable `index`.
    ///
    /// # Errors
    ///
    /// `InvalidTileIndex` for padding, disabled or out-of-range indices.
    pub fn tile(&self, index: u16) -> LedgerResult<&Tile> {
        Coord::from_index(index).ok_or(GameError::InvalidTileIndex(index))?;
        Ok(&self.tiles[usize::from(index)])
    }

    /// Economy of the seat playing `color`.
    #[must_use]
    pub fn economy(&self, color: Color) -> Option<&PlayerEconomy> {
        self.economies.get(seat_of(color)?)
    }

    /// Indices of tiles held by `color`.
    pub fn tiles_of(&self, color: Color) -> impl Iterator<Item = u16> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.is_owned_by(color))
            .filter_map(|(i, _)| u16::try_from(i).ok())
    }

    /// Experience of `color` as of `now`, without settling.
    #[must_use]
    pub fn experience_at(&self, color: Color, now: i64) -> u32 {
        self.economy(color).map_or(0, |e| {
            if self.state == GameState::InProgress {
                e.experience_at(now, self.xp_per_minute_per_tile, &self.tier_rates)
            } else {
                e.experience
            }
        })
    }

    /// What `color` may still spend as of `now`.
    #[must_use]
    pub fn allowance(&self, color: Color, now: i64) -> u32 {
        self.economy(color)
            .map_or(0, |e| e.allowance(self.pool.available_at(now)))
    }

    fn require_in_progress(&self) -> LedgerResult<()> {
        if self.state == GameState::InProgress {
            Ok(())
        } else {
            Err(GameError::GameNotInProgress)
        }
    }

    /// Settle the pool and every seat's experience up to `now`, then run
    /// the winner check. No-op unless the game is in progress.
    pub fn settle(&mut self, now: i64) {
        if self.state != GameState::InProgress {
            return;
        }
        let minutes = self.pool.settle(now);
        if minutes > 0 {
            tracing::debug!(
                game_id = self.game_id,
                minutes,
                total_available = self.pool.total_available,
                "resource pool settled"
            );
        }
        for economy in &mut self.economies {
            economy.settle_experience(now, self.xp_per_minute_per_tile, &self.tier_rates);
        }
        self.check_for_winner();
    }

    /// Record a winner once any seat's settled experience reaches the limit.
    ///
    /// The highest total wins; equal totals go to the earlier seat.
    pub fn check_for_winner(&mut self) -> Option<Address> {
        if self.state != GameState::InProgress {
            return self.winner;
        }
        let mut best: Option<(usize, u32)> = None;
        for (seat, economy) in self.economies.iter().enumerate() {
            if economy.experience < self.winning_xp_limit {
                continue;
            }
            if best.is_none_or(|(_, xp)| economy.experience > xp) {
                best = Some((seat, economy.experience));
            }
        }
        if let Some((seat, experience)) = best {
            self.winner = Some(self.players[seat]);
            self.state = GameState::WinnerPendingPayout;
            tracing::info!(
                game_id = self.game_id,
                winner = %self.players[seat].short(),
                experience,
                "winner determined"
            );
        }
        self.winner
    }

    /// Move `amount` from `source` to the adjacent `destination`.
    ///
    /// The source always keeps at least one resource. An unclaimed
    /// destination is claimed; a friendly one is reinforced.
    ///
    /// # Errors
    ///
    /// Rejects when the game is not in progress, an index is invalid, the
    /// tiles coincide or are not adjacent, the amount is zero or not below
    /// the source count, the source is not `color`'s, the destination is a
    /// rival's, or the destination would overflow.
    pub fn move_resources(
        &mut self,
        color: Color,
        source: u16,
        destination: u16,
        amount: u16,
        now: i64,
    ) -> LedgerResult<Movement> {
        self.require_in_progress()?;
        let from = *self.tile(source)?;
        let to = *self.tile(destination)?;
        if source == destination {
            return Err(GameError::SameTile);
        }
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        if !from.is_owned_by(color) {
            return Err(GameError::TileNotOwned);
        }
        if amount >= from.resources {
            return Err(GameError::InsufficientResources);
        }
        if !are_tiles_adjacent(source, destination) {
            return Err(GameError::TileNotAdjacent);
        }
        let movement = match to.owner {
            None => Movement::Claimed,
            Some(owner) if owner == color => Movement::Reinforced,
            Some(_) => return Err(GameError::TileOwnedByRival),
        };
        let landed = to
            .resources
            .checked_add(amount)
            .ok_or(GameError::TileOverflow)?;

        self.settle(now);
        self.tiles[usize::from(source)].resources = from.resources - amount;
        if movement == Movement::Claimed {
            self.transfer(destination, color);
        }
        self.tiles[usize::from(destination)].resources = landed;
        Ok(movement)
    }

    /// Spend `amount` from the pool onto `color`'s tile at `index`.
    ///
    /// # Errors
    ///
    /// Rejects when the game is not in progress, the index is invalid, the
    /// amount is zero, the tile is not `color`'s, the tile would overflow,
    /// or the spend would pass the pool ceiling.
    pub fn add_resources(
        &mut self,
        color: Color,
        index: u16,
        amount: u32,
        now: i64,
    ) -> LedgerResult<()> {
        self.require_in_progress()?;
        let tile = *self.tile(index)?;
        if amount == 0 {
            return Err(GameError::InvalidAmount);
        }
        if !tile.is_owned_by(color) {
            return Err(GameError::TileNotOwned);
        }
        let seat = seat_of(color).ok_or(GameError::PlayerNotInGame)?;
        let landed = u16::try_from(amount)
            .ok()
            .and_then(|a| tile.resources.checked_add(a))
            .ok_or(GameError::TileOverflow)?;
        let spent = self.economies[seat]
            .resources_spent
            .checked_add(amount)
            .ok_or(GameError::ResourceSpendExceedsPool)?;
        if spent > self.pool.available_at(now) {
            return Err(GameError::ResourceSpendExceedsPool);
        }

        self.settle(now);
        self.economies[seat].resources_spent = spent;
        self.tiles[usize::from(index)].resources = landed;
        Ok(())
    }

    /// Check an attack from `attacker` on `defender` by `color`.
    ///
    /// Returns the defending colour.
    ///
    /// # Errors
    ///
    /// Rejects when the game is not in progress, an index is invalid, the
    /// tiles coincide or are not adjacent, the attacking tile is not
    /// `color`'s or holds fewer than two resources, or the defending tile
    /// is not held by another colour.
    pub fn validate_attack(&self, color: Color, attacker: u16, defender: u16) -> LedgerResult<Color> {
        self.require_in_progress()?;
        let from = self.tile(attacker)?;
        let to = self.tile(defender)?;
        if attacker == defender {
            return Err(GameError::SameTile);
        }
        if !are_tiles_adjacent(attacker, defender) {
            return Err(GameError::TileNotAdjacent);
        }
        if !from.is_owned_by(color) {
            return Err(GameError::TileNotOwned);
        }
        if from.resources < 2 {
            return Err(GameError::InsufficientResources);
        }
        match to.owner {
            Some(owner) if owner != color => Ok(owner),
            _ => Err(GameError::NotAnEnemyTile),
        }
    }

    /// Write a resolved combat back to the board.
    ///
    /// Experience is settled first, at the holdings that were in effect
    /// before the tile changes hands.
    ///
    /// # Errors
    ///
    /// `GameNotInProgress` or `InvalidTileIndex`.
    pub fn apply_combat(
        &mut self,
        attacker: u16,
        defender: u16,
        attacker_color: Color,
        outcome: CombatOutcome,
        now: i64,
    ) -> LedgerResult<()> {
        self.require_in_progress()?;
        self.tile(attacker)?;
        self.tile(defender)?;

        self.settle(now);
        if outcome.attacker_won {
            self.transfer(defender, attacker_color);
        }
        self.tiles[usize::from(attacker)].resources = outcome.attacker_remaining;
        self.tiles[usize::from(defender)].resources = outcome.defender_remaining;
        Ok(())
    }

    /// Mark the prize paid.
    pub fn complete(&mut self) {
        self.state = GameState::Completed;
    }

    /// Hand tile `index` to `to`, keeping tile and tier counts in step.
    fn transfer(&mut self, index: u16, to: Color) {
        let Some(coord) = Coord::from_index(index) else {
            return;
        };
        let tier = Tier::of(coord);
        let tile = &mut self.tiles[usize::from(index)];

        if let Some(previous) = tile.owner.and_then(seat_of) {
            let economy = &mut self.economies[previous];
            economy.tile_count = economy.tile_count.saturating_sub(1);
            economy.tiers.lose(tier);
        }
        tile.owner = Some(to);
        if let Some(seat) = seat_of(to) {
            let economy = &mut self.economies[seat];
            economy.tile_count = economy.tile_count.saturating_add(1);
            economy.tiers.gain(tier);
        }
    }
}
