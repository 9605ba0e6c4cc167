//! Output formatting utilities for CLI.

use hexone::game::{COLUMNS, Coord, ROWS, color_of_seat};
use hexone::simulate::GameResult;
use hexone::{Address, GameBoard, GameState};
use serde::Serialize;

/// JSON-serializable board summary.
#[derive(Debug, Serialize)]
pub(super) struct BoardSummary {
    /// Game id.
    pub(super) game_id: u64,
    /// Lifecycle state.
    pub(super) state: GameState,
    /// Winning wallet, if decided.
    pub(super) winner: Option<Address>,
    /// Settled pool ceiling.
    pub(super) total_available: u32,
    /// Experience that wins.
    pub(super) winning_xp_limit: u32,
    /// Per-seat holdings.
    pub(super) seats: Vec<SeatSummary>,
}

/// JSON-serializable seat summary.
#[derive(Debug, Serialize)]
pub(super) struct SeatSummary {
    /// Colour (1-4).
    pub(super) color: u8,
    /// Seated wallet.
    pub(super) wallet: Address,
    /// Tiles held.
    pub(super) tiles: u32,
    /// Settled experience.
    pub(super) experience: u32,
    /// Resources drawn from the pool.
    pub(super) resources_spent: u32,
    /// Tiles held per tier: gold, silver, bronze, iron.
    pub(super) tiers: [u32; 4],
}

impl BoardSummary {
    /// Create from a board.
    pub(super) fn from_board(board: &GameBoard) -> Self {
        let seats = board
            .players
            .iter()
            .zip(board.economies.iter())
            .enumerate()
            .filter(|(_, (wallet, _))| !wallet.is_null())
            .map(|(seat, (wallet, economy))| SeatSummary {
                color: color_of_seat(seat),
                wallet: *wallet,
                tiles: economy.tile_count,
                experience: economy.experience,
                resources_spent: economy.resources_spent,
                tiers: [
                    economy.tiers.gold,
                    economy.tiers.silver,
                    economy.tiers.bronze,
                    economy.tiers.iron,
                ],
            })
            .collect();

        Self {
            game_id: board.game_id,
            state: board.state,
            winner: board.winner,
            total_available: board.pool.total_available,
            winning_xp_limit: board.winning_xp_limit,
            seats,
        }
    }
}

/// Draw the board, one character per cell.
///
/// `.` is unclaimed, `1`-`4` is the owning colour, blank is disabled.
pub(super) fn render_map(board: &GameBoard) -> String {
    let mut output = String::new();
    for row in 0..ROWS {
        output.push_str("  ");
        for col in 0..COLUMNS {
            let coord = Coord::new(row, col);
            let cell = if coord.is_playable() {
                match board.tiles[usize::from(coord.index())].owner {
                    Some(color) => char::from(b'0' + color),
                    None => '.',
                }
            } else {
                ' '
            };
            output.push(cell);
            output.push(' ');
        }
        output.push('\n');
    }
    output
}

/// Format a board as human-readable text.
pub(super) fn format_board_text(board: &GameBoard) -> String {
    let summary = BoardSummary::from_board(board);
    let mut output = String::new();

    output.push_str(&format!("Game {} ({:?})\n", summary.game_id, summary.state));
    if let Some(winner) = summary.winner {
        output.push_str(&format!("  Winner: {}\n", winner.short()));
    }
    output.push_str(&format!(
        "  Pool: {} available, {} xp to win\n\n",
        summary.total_available, summary.winning_xp_limit
    ));
    for seat in &summary.seats {
        output.push_str(&format!(
            "  Player {} ({}): {} tiles, {} xp, {} spent [G{} S{} B{} I{}]\n",
            seat.color,
            seat.wallet.short(),
            seat.tiles,
            seat.experience,
            seat.resources_spent,
            seat.tiers[0],
            seat.tiers[1],
            seat.tiers[2],
            seat.tiers[3],
        ));
    }
    output.push('\n');
    output.push_str(&render_map(board));
    output
}

/// Format a game result as human-readable text.
pub(super) fn format_result_text(result: &GameResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    if let Some(winner) = result.winner {
        output.push_str(&format!("  Winner: Player {winner} (prize {} lamports)\n", result.prize));
    } else {
        output.push_str("  Winner: none (step limit reached)\n");
    }
    output.push_str(&format!(
        "  Steps: {} ({}s simulated)\n",
        result.steps, result.elapsed_secs
    ));
    output.push_str(&format!(
        "  Transactions: {} accepted, {} rejected\n\n",
        result.accepted, result.rejected
    ));

    for stats in &result.player_stats {
        output.push_str(&format!(
            "  Player {}: {} tiles, {} xp, {} claimed, {}/{} attacks won, {} added\n",
            stats.color,
            stats.tiles,
            stats.experience,
            stats.tiles_claimed,
            stats.attacks_won,
            stats.attacks_opened,
            stats.resources_added
        ));
    }

    output
}

/// Ratio of two counters; zero when the denominator is.
#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregated statistics across many simulated games.
#[derive(Debug, Default)]
pub(super) struct SimulationStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games that hit the step limit.
    pub(super) unfinished: u64,
    /// Win count per colour.
    wins: [u64; 4],
    /// Final experience per colour, summed.
    total_experience: [u64; 4],
    /// Final tiles per colour, summed.
    total_tiles: [u64; 4],
    /// Attacks opened per colour, summed.
    total_attacks: [u64; 4],
    /// Steps across all games.
    total_steps: u64,
    /// Rejected transactions across all games.
    total_rejected: u64,
}

impl SimulationStats {
    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_steps += u64::from(result.steps);
        self.total_rejected += u64::from(result.rejected);

        match result.winner {
            Some(winner) if (1..=4).contains(&winner) => {
                self.wins[usize::from(winner) - 1] += 1;
            }
            _ => self.unfinished += 1,
        }

        for stats in &result.player_stats {
            if let Some(i) = usize::from(stats.color).checked_sub(1).filter(|&i| i < 4) {
                self.total_experience[i] += u64::from(stats.experience);
                self.total_tiles[i] += u64::from(stats.tiles);
                self.total_attacks[i] += u64::from(stats.attacks_opened);
            }
        }
    }

    /// Merge stats accumulated on another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.unfinished += other.unfinished;
        self.total_steps += other.total_steps;
        self.total_rejected += other.total_rejected;
        for i in 0..4 {
            self.wins[i] += other.wins[i];
            self.total_experience[i] += other.total_experience[i];
            self.total_tiles[i] += other.total_tiles[i];
            self.total_attacks[i] += other.total_attacks[i];
        }
    }

    /// Win rate for colour index `i` (0.0-1.0).
    pub(super) fn win_rate(&self, i: usize) -> f64 {
        ratio(self.wins[i], self.games_played)
    }

    /// Average final experience for colour index `i`.
    pub(super) fn avg_experience(&self, i: usize) -> f64 {
        ratio(self.total_experience[i], self.games_played)
    }

    /// Average final tiles for colour index `i`.
    pub(super) fn avg_tiles(&self, i: usize) -> f64 {
        ratio(self.total_tiles[i], self.games_played)
    }

    /// Average attacks opened for colour index `i`.
    pub(super) fn avg_attacks(&self, i: usize) -> f64 {
        ratio(self.total_attacks[i], self.games_played)
    }

    /// Average game length.
    pub(super) fn avg_steps(&self) -> f64 {
        ratio(self.total_steps, self.games_played)
    }

    /// Average rejected transactions per game.
    pub(super) fn avg_rejected(&self) -> f64 {
        ratio(self.total_rejected, self.games_played)
    }
}

/// JSON-serializable simulation result.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationResult {
    /// Total games played.
    games_played: u64,
    /// Games without a winner.
    unfinished: u64,
    /// Average game length in steps.
    avg_steps: f64,
    /// Average rejected transactions per game.
    avg_rejected: f64,
    /// Per-colour statistics.
    players: Vec<JsonSimulationPlayer>,
}

/// JSON-serializable per-colour simulation stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonSimulationPlayer {
    /// Colour (1-4).
    color: usize,
    /// Number of wins.
    wins: u64,
    /// Win rate (0.0-1.0).
    win_rate: f64,
    /// Average final experience.
    avg_experience: f64,
    /// Average final tiles.
    avg_tiles: f64,
    /// Average attacks opened.
    avg_attacks: f64,
}

impl JsonSimulationResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &SimulationStats) -> Self {
        let players = (0..4)
            .map(|i| JsonSimulationPlayer {
                color: i + 1,
                wins: stats.wins[i],
                win_rate: stats.win_rate(i),
                avg_experience: stats.avg_experience(i),
                avg_tiles: stats.avg_tiles(i),
                avg_attacks: stats.avg_attacks(i),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            unfinished: stats.unfinished,
            avg_steps: stats.avg_steps(),
            avg_rejected: stats.avg_rejected(),
            players,
        }
    }
}

/// Format simulation stats as human-readable text.
pub(super) fn format_simulation_text(stats: &SimulationStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("Simulation Results ({} games)\n", stats.games_played));
    output.push_str("========================================\n\n");

    output.push_str("Win Rates:\n");
    for i in 0..4 {
        output.push_str(&format!(
            "  Player {}: {:.1}% ({} wins)\n",
            i + 1,
            stats.win_rate(i) * 100.0,
            stats.wins[i]
        ));
    }
    output.push_str(&format!(
        "  Unfinished: {} ({:.1}%)\n\n",
        stats.unfinished,
        ratio(stats.unfinished, stats.games_played) * 100.0
    ));

    output.push_str("Averages:\n");
    for i in 0..4 {
        output.push_str(&format!(
            "  Player {}: {:.0} xp, {:.1} tiles, {:.1} attacks\n",
            i + 1,
            stats.avg_experience(i),
            stats.avg_tiles(i),
            stats.avg_attacks(i)
        ));
    }

    output.push_str(&format!(
        "\nAverage Game Length: {:.0} steps ({:.1} rejected transactions)\n",
        stats.avg_steps(),
        stats.avg_rejected()
    ));

    output
}

/// Format simulation stats as CSV.
pub(super) fn format_simulation_csv(stats: &SimulationStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("color,wins,win_rate,avg_experience,avg_tiles,avg_attacks\n");

    // Data rows
    for i in 0..4 {
        output.push_str(&format!(
            "{},{},{:.4},{:.2},{:.2},{:.2}\n",
            i + 1,
            stats.wins[i],
            stats.win_rate(i),
            stats.avg_experience(i),
            stats.avg_tiles(i),
            stats.avg_attacks(i)
        ));
    }

    output
}
