//! Board invariants - sanity checks that detect bugs.
//!
//! Every operation maintains tile and tier counts incrementally. These
//! checks recompute them from the tile array and compare, along with the
//! seat, pool and lifecycle rules. They should NEVER trigger; a violation
//! means an operation is broken.

use crate::game::{
    Coord, GameBoard, GameState, MAX_PLAYERS, Tier, TierCounts, Tile, color_of_seat,
};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all board invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(board: &GameBoard) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut push = |message: String| violations.push(InvariantViolation { message });

    // Seats fill as a prefix
    let seated = board.seated();
    for (seat, player) in board.players.iter().enumerate().skip(seated) {
        if !player.is_null() {
            push(format!("Seat {seat} filled after an empty seat"));
        }
    }
    if board.state != GameState::Waiting && seated != MAX_PLAYERS {
        push(format!("Game started with {seated} seats filled"));
    }

    // Recount holdings from the tile array
    let mut tile_counts = [0u32; MAX_PLAYERS];
    let mut tier_counts = [TierCounts::default(); MAX_PLAYERS];
    for (index, tile) in board.tiles.iter().enumerate() {
        let coord = u16::try_from(index).ok().and_then(Coord::from_index);
        let Some(coord) = coord else {
            if *tile != Tile::EMPTY {
                push(format!("Non-playable slot {index} is not empty"));
            }
            continue;
        };
        match tile.owner {
            None if tile.resources != 0 => {
                push(format!("Unowned tile {index} holds {} resources", tile.resources));
            }
            None => {}
            Some(color) if !(1..=4).contains(&color) => {
                push(format!("Tile {index} has invalid colour {color}"));
            }
            Some(color) => {
                if tile.resources == 0 {
                    push(format!("Owned tile {index} holds no resources"));
                }
                let seat = usize::from(color) - 1;
                tile_counts[seat] += 1;
                tier_counts[seat].gain(Tier::of(coord));
            }
        }
    }

    for (seat, economy) in board.economies.iter().enumerate() {
        let color = color_of_seat(seat);
        if economy.tile_count != tile_counts[seat] {
            push(format!(
                "Colour {color} tile count {} != {} tiles on board",
                economy.tile_count, tile_counts[seat]
            ));
        }
        if economy.tiers != tier_counts[seat] {
            push(format!(
                "Colour {color} tier counts {:?} != recount {:?}",
                economy.tiers, tier_counts[seat]
            ));
        }
        if economy.resources_spent > board.pool.total_available {
            push(format!(
                "Colour {color} spent {} > pool {}",
                economy.resources_spent, board.pool.total_available
            ));
        }
    }

    // Winner recorded exactly when a payout is due or done
    let has_winner = board.winner.is_some();
    let expects_winner = matches!(
        board.state,
        GameState::WinnerPendingPayout | GameState::Completed
    );
    if has_winner != expects_winner {
        push(format!(
            "Winner {:?} inconsistent with state {:?}",
            board.winner, board.state
        ));
    }
    if let Some(winner) = board.winner.filter(|w| board.color_of(w).is_none()) {
        push(format!("Winner {} is not seated", winner.short()));
    }

    violations
}

/// Assert all board invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(board: &GameBoard) {
    let violations = check_invariants(board);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Board invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_board: &GameBoard) {}
