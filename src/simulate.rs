//! Simulation runner for Hexone games.
//!
//! Provides a pure function interface: `(seed, config) -> GameResult`
//!
//! One run sets up a fresh ledger, registers four bot wallets, seats them
//! in one game and lets them play until the winner claims the prize or the
//! step limit passes. Every step advances the clock, then each bot in seat
//! order submits at most one settle, one spend and one board action. All
//! inputs are recorded, so any run can be replayed exactly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::{Address, game_address};
use crate::config::{ConfigError, GameConfig, LAMPORTS_PER_SOL};
use crate::error::GameError;
use crate::game::{
    Color, Coord, GameBoard, GameState, MAX_PLAYERS, Movement, SessionStatus, color_of_seat,
};
use crate::ledger::{DEFAULT_START, Instruction, Receipt, Resolution, Transaction};
use crate::recording::{Recorder, Recording};

/// How often each seat attacks when it could, in percent.
const AGGRESSION: [u64; MAX_PLAYERS] = [15, 60, 35, 85];

/// Configuration for a simulated game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Steps before the game is abandoned.
    pub max_steps: u32,
    /// Seconds the clock advances per step.
    pub step_seconds: i64,
    /// Rules of the simulated game.
    pub game: GameConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_steps: 5_000,
            step_seconds: 20,
            game: GameConfig::default(),
        }
    }
}

/// Statistics for a single seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    /// Colour played.
    pub color: Color,
    /// Tiles held at the end.
    pub tiles: u32,
    /// Settled experience at the end.
    pub experience: u32,
    /// Attacks opened.
    pub attacks_opened: u32,
    /// Attacks that took the tile.
    pub attacks_won: u32,
    /// Resources spent from the pool.
    pub resources_added: u64,
    /// Unowned tiles claimed by moving.
    pub tiles_claimed: u32,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// The seed used for this game.
    pub seed: u64,
    /// Winning colour (None if the step limit passed first).
    pub winner: Option<Color>,
    /// Steps played.
    pub steps: u32,
    /// Simulated seconds elapsed.
    pub elapsed_secs: i64,
    /// Lamports paid to the winner.
    pub prize: u64,
    /// Transactions accepted.
    pub accepted: u32,
    /// Transactions rejected.
    pub rejected: u32,
    /// Per-seat statistics.
    pub player_stats: Vec<PlayerStats>,
}

/// Error type for simulation setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A setup transaction was rejected.
    #[error("setup step {step} rejected: {error}")]
    Setup {
        /// Name of the failing step.
        step: &'static str,
        /// Ledger rejection.
        error: GameError,
    },
    /// The game rules fail validation.
    #[error("invalid game rules: {0}")]
    Config(#[from] ConfigError),
    /// Step length must be positive.
    #[error("step length must be positive, got {0}")]
    StepLength(i64),
}

/// Deterministic PRNG using xorshift64.
#[derive(Debug, Clone, Copy)]
struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed.
    const fn new(seed: u64) -> Self {
        // Ensure non-zero state
        let state = if seed == 0 { 0x5555_5555_5555_5555 } else { seed };
        Self { state }
    }

    /// Generate next random u64.
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Random index in `[0, len)`.
    fn below(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        usize::try_from(self.next_u64() % len).unwrap_or(0)
    }

    /// True with probability `percent` / 100.
    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Wallet of bot `seat`.
#[must_use]
pub fn bot_wallet(seat: usize) -> Address {
    let seat = u64::try_from(seat).unwrap_or(u64::MAX);
    Address::derive(&[b"hexone/bot".as_slice(), &seat.to_le_bytes()])
}

/// Wallet of the simulation's registry and game admin.
#[must_use]
pub fn admin_wallet() -> Address {
    Address::hashed(b"hexone/simulation/admin")
}

/// Run a complete game.
///
/// # Errors
///
/// Returns an error if the config is unusable or setup is rejected.
pub fn run_game(
    seed: u64,
    config: &SimulationConfig,
) -> Result<(GameResult, Recording), SimulationError> {
    if config.step_seconds <= 0 {
        return Err(SimulationError::StepLength(config.step_seconds));
    }
    config.game.validate()?;
    let mut runner = GameRunner::new(seed, config)?;
    runner.play();
    Ok(runner.finish())
}

/// The game runner that drives four bots.
struct GameRunner {
    recorder: Recorder,
    rng: Rng,
    config: SimulationConfig,
    seed: u64,
    game_id: u64,
    stats: [PlayerStats; MAX_PLAYERS],
    steps: u32,
    accepted: u32,
    rejected: u32,
    prize: u64,
}

impl GameRunner {
    fn new(seed: u64, config: &SimulationConfig) -> Result<Self, SimulationError> {
        let mut runner = Self {
            recorder: Recorder::new(config.game, seed, DEFAULT_START),
            rng: Rng::new(seed),
            config: *config,
            seed,
            game_id: 0,
            stats: [PlayerStats::default(); MAX_PLAYERS],
            steps: 0,
            accepted: 0,
            rejected: 0,
            prize: 0,
        };

        let admin = admin_wallet();
        runner.setup("create_registry", Transaction::by(admin, Instruction::CreateRegistry))?;
        let receipt = runner.setup("create_game", Transaction::by(admin, Instruction::CreateGame))?;
        if let Receipt::GameCreated { game_id, .. } = receipt {
            runner.game_id = game_id;
        }

        let funding = config.game.game_cost.saturating_add(LAMPORTS_PER_SOL);
        for seat in 0..MAX_PLAYERS {
            let wallet = bot_wallet(seat);
            runner.stats[seat].color = color_of_seat(seat);
            runner.recorder.airdrop(wallet, funding);
            runner.setup(
                "create_player",
                Transaction::by(
                    wallet,
                    Instruction::CreatePlayer {
                        name: format!("bot-{}", seat + 1),
                        delegated_signer: Address::NULL,
                    },
                ),
            )?;
            runner.setup(
                "join_game",
                Transaction::by(
                    wallet,
                    Instruction::JoinGame {
                        game_id: runner.game_id,
                    },
                ),
            )?;
        }
        Ok(runner)
    }

    fn setup(&mut self, step: &'static str, tx: Transaction) -> Result<Receipt, SimulationError> {
        let receipt = self
            .recorder
            .execute(tx)
            .map_err(|error| SimulationError::Setup { step, error })?;
        self.accepted += 1;
        Ok(receipt)
    }

    fn submit(&mut self, tx: Transaction) -> Option<Receipt> {
        if let Ok(receipt) = self.recorder.execute(tx) {
            self.accepted += 1;
            Some(receipt)
        } else {
            self.rejected += 1;
            None
        }
    }

    fn board(&self) -> Option<GameBoard> {
        self.recorder.ledger().board(self.game_id).copied()
    }

    fn play(&mut self) {
        while self.steps < self.config.max_steps {
            self.steps += 1;
            self.recorder.advance(self.config.step_seconds);
            for seat in 0..MAX_PLAYERS {
                self.take_turn(seat);
                if self.claim_if_won(seat) {
                    return;
                }
            }
        }
    }

    /// Claim the prize if `seat` is the recorded winner. True once the game is over.
    fn claim_if_won(&mut self, seat: usize) -> bool {
        let Some(board) = self.board() else {
            return true;
        };
        match board.state {
            GameState::WinnerPendingPayout if board.winner == Some(bot_wallet(seat)) => {
                if let Some(Receipt::PrizeClaimed { amount }) =
                    self.submit(Transaction::by(bot_wallet(seat), Instruction::ClaimPrize))
                {
                    self.prize = amount;
                    return true;
                }
                false
            }
            GameState::Completed => true,
            _ => false,
        }
    }

    fn take_turn(&mut self, seat: usize) {
        let wallet = bot_wallet(seat);
        let color = color_of_seat(seat);
        self.resolve_own_attacks(wallet, color, seat);

        let Some(board) = self.board() else {
            return;
        };
        if board.state != GameState::InProgress {
            return;
        }
        self.spend(wallet, color, seat, &board);

        let Some(board) = self.board() else {
            return;
        };
        self.act(wallet, color, seat, &board);
    }

    fn resolve_own_attacks(&mut self, wallet: Address, color: Color, seat: usize) {
        let ledger = self.recorder.ledger();
        let now = ledger.now();
        let delay = ledger.config().attack_delay_secs;
        let expiry = ledger.config().attack_expiry_secs;
        let game = game_address(self.game_id);
        let ready: Vec<Address> = ledger
            .sessions_of(&game)
            .filter(|(_, s)| s.attacker_color == color)
            .filter(|(_, s)| s.status(now, delay, expiry) != SessionStatus::Pending)
            .map(|(address, _)| *address)
            .collect();

        for session in ready {
            let receipt = self.submit(Transaction::by(
                wallet,
                Instruction::ResolveAttack {
                    session,
                    rent_destination: wallet,
                },
            ));
            if matches!(
                receipt,
                Some(Receipt::AttackResolved(Resolution::Fought { outcome, .. })) if outcome.attacker_won
            ) {
                self.stats[seat].attacks_won += 1;
            }
        }
    }

    fn spend(&mut self, wallet: Address, color: Color, seat: usize, board: &GameBoard) {
        let now = self.recorder.ledger().now();
        let allowance = board.allowance(color, now);
        if allowance == 0 {
            return;
        }
        let owned: Vec<u16> = board.tiles_of(color).collect();
        if owned.is_empty() {
            return;
        }
        // Reinforce the strongest tile; it leads the expansion.
        let tile = owned
            .iter()
            .copied()
            .max_by_key(|&i| board.tiles[usize::from(i)].resources)
            .unwrap_or(owned[0]);
        let headroom = u32::from(u16::MAX - board.tiles[usize::from(tile)].resources);
        let amount = allowance.min(headroom);
        if amount == 0 {
            return;
        }
        if self
            .submit(Transaction::by(
                wallet,
                Instruction::AddResources { tile, amount },
            ))
            .is_some()
        {
            self.stats[seat].resources_added += u64::from(amount);
        }
    }

    fn act(&mut self, wallet: Address, color: Color, seat: usize, board: &GameBoard) {
        let sources: Vec<u16> = board
            .tiles_of(color)
            .filter(|&i| board.tiles[usize::from(i)].resources >= 2)
            .collect();
        if sources.is_empty() {
            return;
        }
        let source = sources[self.rng.below(sources.len())];
        let Some(coord) = Coord::from_index(source) else {
            return;
        };
        let (adjacent, count) = coord.adjacent();
        let neighbors = &adjacent[..usize::from(count)];
        let strength = board.tiles[usize::from(source)].resources;

        let mut empty = Vec::new();
        let mut enemy = Vec::new();
        let mut friendly = Vec::new();
        for n in neighbors {
            let index = n.index();
            let tile = board.tiles[usize::from(index)];
            match tile.owner {
                None => empty.push(index),
                Some(owner) if owner == color => friendly.push(index),
                Some(_) => {
                    if self.recorder.ledger().session(self.game_id, index).is_none() {
                        enemy.push(index);
                    }
                }
            }
        }

        if !enemy.is_empty() && self.rng.chance(AGGRESSION[seat]) {
            let target = enemy[self.rng.below(enemy.len())];
            let receipt = self.submit(Transaction::by(
                wallet,
                Instruction::AttackTile {
                    attacker_tile: source,
                    defender_tile: target,
                },
            ));
            if receipt.is_some() {
                self.stats[seat].attacks_opened += 1;
            }
            return;
        }

        let (destination, amount) = if empty.is_empty() {
            if friendly.is_empty() {
                return;
            }
            (friendly[self.rng.below(friendly.len())], strength - 1)
        } else {
            (empty[self.rng.below(empty.len())], (strength / 2).max(1))
        };
        let receipt = self.submit(Transaction::by(
            wallet,
            Instruction::MoveResources {
                source,
                destination,
                amount,
            },
        ));
        if matches!(receipt, Some(Receipt::Moved(Movement::Claimed))) {
            self.stats[seat].tiles_claimed += 1;
        }
    }

    fn finish(self) -> (GameResult, Recording) {
        let (ledger, recording) = self.recorder.finish();
        let board = ledger.board(self.game_id).copied();
        let mut player_stats = self.stats.to_vec();
        let mut winner = None;

        if let Some(board) = board {
            for stats in &mut player_stats {
                if let Some(economy) = board.economy(stats.color) {
                    stats.tiles = economy.tile_count;
                    stats.experience = economy.experience;
                }
            }
            winner = board.winner.and_then(|w| board.color_of(&w));
        }

        let result = GameResult {
            seed: self.seed,
            winner,
            steps: self.steps,
            elapsed_secs: ledger.now() - recording.start,
            prize: self.prize,
            accepted: self.accepted,
            rejected: self.rejected,
            player_stats,
        };
        (result, recording)
    }
}
