//! In-memory ledger host.
//!
//! Stores every account, orders transactions and supplies the clock. Each
//! transaction is all-or-nothing: a handler reads copies of the accounts it
//! needs, runs every check, and only then writes its copies back. A
//! rejected transaction leaves every account and balance untouched.
//!
//! Lamports are conserved: join costs move from the signer to the game's
//! treasury, session rent is held at the session's own address while the
//! session is open, and the prize drains the treasury into the winner's
//! wallet.

mod clock;
mod instruction;

pub use clock::{Clock, DEFAULT_START};
pub use instruction::{Instruction, Receipt, Resolution, Transaction};

use std::collections::BTreeMap;

use crate::address::{
    Address, attack_address, game_address, player_address, registry_address, treasury_address,
};
use crate::config::GameConfig;
use crate::error::{GameError, LedgerResult};
use crate::game::{
    AttackSession, Color, GameBoard, GameState, PlayerName, PlayerProfile, Rolls, SessionStatus,
    invariants, resolve_combat,
};
use crate::registry::Registry;

/// Lamports per byte-year of storage.
const LAMPORTS_PER_BYTE_YEAR: u64 = 3480;
/// Years of rent an account must hold to be exempt.
const EXEMPTION_YEARS: u64 = 2;
/// Bytes charged for every account on top of its data.
const ACCOUNT_OVERHEAD: u64 = 128;

/// Deposit that keeps an account of `len` data bytes alive.
#[must_use]
pub fn rent_exempt_minimum(len: usize) -> u64 {
    let len = u64::try_from(len).unwrap_or(u64::MAX);
    ACCOUNT_OVERHEAD
        .saturating_add(len)
        .saturating_mul(LAMPORTS_PER_BYTE_YEAR * EXEMPTION_YEARS)
}

/// The seat a board operation acts for.
#[derive(Debug, Clone, Copy)]
struct Actor {
    profile: PlayerProfile,
    game: Address,
    board: GameBoard,
    color: Color,
}

/// Accounts, balances and time.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: GameConfig,
    clock: Clock,
    registry: Option<Registry>,
    players: BTreeMap<Address, PlayerProfile>,
    games: BTreeMap<Address, GameBoard>,
    sessions: BTreeMap<Address, AttackSession>,
    balances: BTreeMap<Address, u64>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(GameConfig::default(), 0)
    }
}

impl Ledger {
    /// Empty ledger starting at [`DEFAULT_START`], genesis hash from `seed`.
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::starting_at(config, seed, DEFAULT_START)
    }

    /// Empty ledger starting at `start`.
    #[must_use]
    pub fn starting_at(config: GameConfig, seed: u64, start: i64) -> Self {
        Self {
            config,
            clock: Clock::genesis(seed, start),
            registry: None,
            players: BTreeMap::new(),
            games: BTreeMap::new(),
            sessions: BTreeMap::new(),
            balances: BTreeMap::new(),
        }
    }

    /// Rules new games are created with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current clock.
    #[must_use]
    pub const fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Current time (unix seconds).
    #[must_use]
    pub const fn now(&self) -> i64 {
        self.clock.unix_timestamp
    }

    /// Move time forward.
    pub fn advance(&mut self, seconds: i64) {
        self.clock.advance(seconds);
    }

    /// Credit `lamports` to `address` out of thin air.
    pub fn airdrop(&mut self, address: Address, lamports: u64) {
        let balance = self.balances.entry(address).or_default();
        *balance = balance.saturating_add(lamports);
    }

    /// Lamports held at `address`.
    #[must_use]
    pub fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    /// The registry, once created.
    #[must_use]
    pub const fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    /// Profile owned by `wallet`.
    #[must_use]
    pub fn player(&self, wallet: &Address) -> Option<&PlayerProfile> {
        self.players.get(&player_address(wallet))
    }

    /// Board of `game_id`.
    #[must_use]
    pub fn board(&self, game_id: u64) -> Option<&GameBoard> {
        self.games.get(&game_address(game_id))
    }

    /// Board stored at `address`.
    #[must_use]
    pub fn board_at(&self, address: &Address) -> Option<&GameBoard> {
        self.games.get(address)
    }

    /// Every board, by address.
    pub fn boards(&self) -> impl Iterator<Item = (&Address, &GameBoard)> {
        self.games.iter()
    }

    /// Open session on `defender_tile` of `game_id`.
    #[must_use]
    pub fn session(&self, game_id: u64, defender_tile: u16) -> Option<&AttackSession> {
        self.sessions
            .get(&attack_address(&game_address(game_id), defender_tile))
    }

    /// Session stored at `address`.
    #[must_use]
    pub fn session_at(&self, address: &Address) -> Option<&AttackSession> {
        self.sessions.get(address)
    }

    /// Open sessions of the board at `game`.
    pub fn sessions_of<'a>(
        &'a self,
        game: &'a Address,
    ) -> impl Iterator<Item = (&'a Address, &'a AttackSession)> + 'a {
        self.sessions.iter().filter(move |(_, s)| s.game == *game)
    }

    /// Experience of `wallet` in `game_id` as of now.
    #[must_use]
    pub fn experience_at(&self, game_id: u64, wallet: &Address) -> Option<u32> {
        let board = self.board(game_id)?;
        let color = board.color_of(wallet)?;
        Some(board.experience_at(color, self.now()))
    }

    /// What `wallet` may still spend in `game_id` as of now.
    #[must_use]
    pub fn available_allowance(&self, game_id: u64, wallet: &Address) -> Option<u32> {
        let board = self.board(game_id)?;
        let color = board.color_of(wallet)?;
        Some(board.allowance(color, self.now()))
    }

    /// Apply one transaction atomically.
    ///
    /// # Errors
    ///
    /// Returns the first precondition the transaction violates; the ledger
    /// is unchanged in that case.
    pub fn execute(&mut self, tx: &Transaction) -> LedgerResult<Receipt> {
        let result = self.dispatch(tx);
        if let Err(error) = &result {
            tracing::warn!(
                signer = %tx.signer.short(),
                player = %tx.player.short(),
                instruction = tx.instruction.name(),
                %error,
                "transaction rejected"
            );
        }
        result
    }

    fn dispatch(&mut self, tx: &Transaction) -> LedgerResult<Receipt> {
        let signer = tx.signer;
        let player = tx.player;
        match &tx.instruction {
            Instruction::CreateRegistry => self.create_registry(signer),
            Instruction::SetGameCost { cost } => self.set_game_cost(signer, *cost),
            Instruction::CreateGame => self.create_game(signer),
            Instruction::CreatePlayer {
                name,
                delegated_signer,
            } => self.create_player(signer, name, *delegated_signer),
            Instruction::SetDelegatedSigner { delegate } => {
                self.set_delegated_signer(signer, player, *delegate)
            }
            Instruction::JoinGame { game_id } => self.join_game(signer, player, *game_id),
            Instruction::MoveResources {
                source,
                destination,
                amount,
            } => self.move_resources(signer, player, *source, *destination, *amount),
            Instruction::AddResources { tile, amount } => {
                self.add_resources(signer, player, *tile, *amount)
            }
            Instruction::AttackTile {
                attacker_tile,
                defender_tile,
            } => self.attack_tile(signer, player, *attacker_tile, *defender_tile),
            Instruction::ResolveAttack {
                session,
                rent_destination,
            } => self.resolve_attack(*session, *rent_destination),
            Instruction::ClaimPrize => self.claim_prize(signer, player),
        }
    }

    fn registry_copy(&self) -> LedgerResult<Registry> {
        self.registry.ok_or(GameError::RegistryNotInitialized)
    }

    fn profile_copy(&self, wallet: &Address) -> LedgerResult<PlayerProfile> {
        self.player(wallet).copied().ok_or(GameError::PlayerNotFound)
    }

    /// Check `lamports` can leave `from`.
    fn require_funds(&self, from: &Address, lamports: u64) -> LedgerResult<()> {
        let available = self.balance(from);
        if available < lamports {
            return Err(GameError::InsufficientFunds {
                needed: lamports,
                available,
            });
        }
        Ok(())
    }

    /// Move lamports already checked by [`Self::require_funds`].
    fn move_lamports(&mut self, from: Address, to: Address, lamports: u64) {
        if lamports == 0 {
            return;
        }
        let source = self.balances.entry(from).or_default();
        *source = source.saturating_sub(lamports);
        if *source == 0 {
            self.balances.remove(&from);
        }
        self.airdrop(to, lamports);
    }

    /// Resolve who is acting on which board.
    fn actor(&self, signer: Address, player: Address) -> LedgerResult<Actor> {
        let profile = self.profile_copy(&player)?;
        profile.authorize(&signer)?;
        let game = profile.active_game.ok_or(GameError::PlayerNotInGame)?;
        let board = *self.games.get(&game).ok_or(GameError::GameNotFound)?;
        let color = board
            .color_of(&profile.wallet)
            .ok_or(GameError::PlayerNotInGame)?;
        Ok(Actor {
            profile,
            game,
            board,
            color,
        })
    }

    /// Write a board back after checking it in debug builds.
    fn commit_board(&mut self, game: Address, board: GameBoard) {
        invariants::assert_invariants(&board);
        self.games.insert(game, board);
    }

    fn create_registry(&mut self, signer: Address) -> LedgerResult<Receipt> {
        if self.registry.is_some() {
            return Err(GameError::RegistryAlreadyInitialized);
        }
        self.registry = Some(Registry::new(signer, self.config.game_cost));
        tracing::info!(
            admin = %signer.short(),
            address = %registry_address().short(),
            "registry created"
        );
        Ok(Receipt::Done)
    }

    fn set_game_cost(&mut self, signer: Address, cost: u64) -> LedgerResult<Receipt> {
        let mut registry = self.registry_copy()?;
        registry.set_game_cost(&signer, cost)?;
        self.registry = Some(registry);
        tracing::info!(cost, "game cost updated");
        Ok(Receipt::Done)
    }

    fn create_game(&mut self, signer: Address) -> LedgerResult<Receipt> {
        let mut registry = self.registry_copy()?;
        if let Err(error) = self.config.validate() {
            tracing::warn!(%error, "refusing to create a game");
            return Err(GameError::InvalidConfig);
        }
        let game_id = registry.allocate_game_id()?;
        let address = game_address(game_id);
        let board = GameBoard::new(signer, game_id, self.now(), &self.config);
        self.registry = Some(registry);
        self.commit_board(address, board);
        tracing::info!(game_id, admin = %signer.short(), "game created");
        Ok(Receipt::GameCreated { game_id, address })
    }

    fn create_player(
        &mut self,
        signer: Address,
        name: &str,
        delegated_signer: Address,
    ) -> LedgerResult<Receipt> {
        let mut registry = self.registry_copy()?;
        let name = PlayerName::new(name)?;
        let address = player_address(&signer);
        if self.players.contains_key(&address) {
            return Err(GameError::PlayerAlreadyExists);
        }
        registry.record_player()?;

        let profile = PlayerProfile::new(signer, name, delegated_signer, self.now());
        self.registry = Some(registry);
        self.players.insert(address, profile);
        tracing::info!(wallet = %signer.short(), %name, "player created");
        Ok(Receipt::Done)
    }

    fn set_delegated_signer(
        &mut self,
        signer: Address,
        player: Address,
        delegate: Address,
    ) -> LedgerResult<Receipt> {
        let mut profile = self.profile_copy(&player)?;
        if signer != profile.wallet {
            return Err(GameError::PlayerNotAuthorized);
        }
        profile.delegated_signer = delegate;
        self.players.insert(player_address(&player), profile);
        tracing::info!(
            wallet = %player.short(),
            delegate = %delegate.short(),
            "delegated signer updated"
        );
        Ok(Receipt::Done)
    }

    fn join_game(&mut self, signer: Address, player: Address, game_id: u64) -> LedgerResult<Receipt> {
        let registry = self.registry_copy()?;
        let mut profile = self.profile_copy(&player)?;
        profile.authorize(&signer)?;

        let game = game_address(game_id);
        let mut board = *self.games.get(&game).ok_or(GameError::GameNotFound)?;
        if board.state != GameState::Waiting {
            return Err(GameError::GameNotWaiting);
        }
        if !profile.is_ready() {
            return Err(GameError::PlayerNotReady);
        }
        let now = self.now();
        let color = board.seat(profile.wallet, now)?;
        self.require_funds(&signer, registry.game_cost)?;

        let started = board.state == GameState::InProgress;
        profile.enter_game(game);
        self.move_lamports(signer, treasury_address(&game), registry.game_cost);
        self.players.insert(player_address(&player), profile);
        self.commit_board(game, board);

        tracing::info!(game_id, wallet = %player.short(), color, "player joined");
        if started {
            tracing::info!(game_id, started_at = now, "game started");
        }
        Ok(Receipt::Joined { color, started })
    }

    fn move_resources(
        &mut self,
        signer: Address,
        player: Address,
        source: u16,
        destination: u16,
        amount: u16,
    ) -> LedgerResult<Receipt> {
        let Actor {
            game,
            mut board,
            color,
            ..
        } = self.actor(signer, player)?;
        let movement = board.move_resources(color, source, destination, amount, self.now())?;
        self.commit_board(game, board);
        Ok(Receipt::Moved(movement))
    }

    fn add_resources(
        &mut self,
        signer: Address,
        player: Address,
        tile: u16,
        amount: u32,
    ) -> LedgerResult<Receipt> {
        let Actor {
            game,
            mut board,
            color,
            ..
        } = self.actor(signer, player)?;
        board.add_resources(color, tile, amount, self.now())?;
        self.commit_board(game, board);
        Ok(Receipt::Done)
    }

    fn attack_tile(
        &mut self,
        signer: Address,
        player: Address,
        attacker_tile: u16,
        defender_tile: u16,
    ) -> LedgerResult<Receipt> {
        let Actor {
            profile,
            game,
            board,
            color,
        } = self.actor(signer, player)?;
        let defender_color = board.validate_attack(color, attacker_tile, defender_tile)?;

        let now = self.now();
        let address = attack_address(&game, defender_tile);
        let stale = match self.sessions.get(&address) {
            Some(existing)
                if existing.status(
                    now,
                    self.config.attack_delay_secs,
                    self.config.attack_expiry_secs,
                ) == SessionStatus::Expired =>
            {
                Some(*existing)
            }
            Some(_) => return Err(GameError::AttackAlreadyInProgress),
            None => None,
        };
        let rent = rent_exempt_minimum(AttackSession::LEN);
        self.require_funds(&signer, rent)?;

        if let Some(stale) = stale {
            self.sessions.remove(&address);
            let held = self.balance(&address);
            self.move_lamports(address, stale.payer, held);
            tracing::info!(
                game_id = board.game_id,
                defender_tile,
                "expired attack reclaimed"
            );
        }
        self.move_lamports(signer, address, rent);
        self.sessions.insert(
            address,
            AttackSession {
                game,
                defender_tile,
                defender_color,
                attacker_tile,
                attacker_color: color,
                started_at: now,
                payer: signer,
                resolved: false,
                attacker_won: false,
                attacker_roll: 0,
                defender_roll: 0,
                bump: u8::MAX,
            },
        );
        tracing::info!(
            game_id = board.game_id,
            attacker = %profile.wallet.short(),
            attacker_tile,
            defender_tile,
            "attack opened"
        );
        Ok(Receipt::AttackOpened { session: address })
    }

    fn resolve_attack(
        &mut self,
        address: Address,
        rent_destination: Address,
    ) -> LedgerResult<Receipt> {
        let mut session = *self
            .sessions
            .get(&address)
            .ok_or(GameError::AttackSessionNotFound)?;
        let mut board = *self
            .games
            .get(&session.game)
            .ok_or(GameError::GameNotFound)?;
        let now = self.now();

        let status = session.status(
            now,
            self.config.attack_delay_secs,
            self.config.attack_expiry_secs,
        );
        let resolution = match status {
            SessionStatus::Pending => return Err(GameError::AttackNotReady),
            SessionStatus::Expired => Resolution::Forfeited,
            SessionStatus::Resolvable => {
                let attacker = *board.tile(session.attacker_tile)?;
                let defender = *board.tile(session.defender_tile)?;
                let intact = board.state == GameState::InProgress
                    && attacker.is_owned_by(session.attacker_color)
                    && defender.is_owned_by(session.defender_color);
                if intact {
                    let rolls = Rolls::draw(&self.clock.slot_hash, &address, &session);
                    let outcome = resolve_combat(attacker.resources, defender.resources, rolls);
                    board.apply_combat(
                        session.attacker_tile,
                        session.defender_tile,
                        session.attacker_color,
                        outcome,
                        now,
                    )?;
                    Resolution::Fought { rolls, outcome }
                } else {
                    Resolution::Void
                }
            }
        };

        session.resolved = true;
        if let Resolution::Fought { rolls, outcome } = resolution {
            session.attacker_won = outcome.attacker_won;
            session.attacker_roll = rolls.attacker;
            session.defender_roll = rolls.defender;
        }

        let held = self.balance(&address);
        self.sessions.remove(&address);
        self.move_lamports(address, rent_destination, held);
        if matches!(resolution, Resolution::Fought { .. }) {
            self.commit_board(session.game, board);
        }

        tracing::info!(
            game_id = board.game_id,
            defender_tile = session.defender_tile,
            resolution = ?resolution,
            attacker_roll = session.attacker_roll,
            defender_roll = session.defender_roll,
            attacker_won = session.attacker_won,
            "attack resolved"
        );
        Ok(Receipt::AttackResolved(resolution))
    }

    fn claim_prize(&mut self, signer: Address, player: Address) -> LedgerResult<Receipt> {
        let mut registry = self.registry_copy()?;
        let Actor {
            mut profile,
            game,
            mut board,
            ..
        } = self.actor(signer, player)?;

        board.settle(self.now());
        let winner = board.winner.ok_or(GameError::NoWinnerYet)?;
        if winner != profile.wallet {
            return Err(GameError::NotWinner);
        }
        registry.record_completion()?;

        let mut others = Vec::with_capacity(board.players.len());
        for wallet in board.players.iter().filter(|w| !w.is_null() && **w != winner) {
            let mut other = self.profile_copy(wallet)?;
            other.leave_game();
            others.push(other);
        }
        profile.leave_game();
        profile.games_won = profile.games_won.saturating_add(1);

        let treasury = treasury_address(&game);
        let amount = self.balance(&treasury);
        board.complete();

        self.move_lamports(treasury, winner, amount);
        for other in others.into_iter().chain([profile]) {
            self.players.insert(player_address(&other.wallet), other);
        }
        self.registry = Some(registry);
        self.commit_board(game, board);

        tracing::info!(
            game_id = board.game_id,
            winner = %winner.short(),
            amount,
            "prize claimed"
        );
        Ok(Receipt::PrizeClaimed { amount })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{STARTING_CORNERS, Tile};

    fn wallet(i: u8) -> Address {
        Address::new([i + 1; 32])
    }

    /// Registry, four funded profiles, game 0 started.
    fn started() -> Ledger {
        let mut ledger = Ledger::default();
        let admin = wallet(100);
        ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)).unwrap();
        ledger.execute(&Transaction::by(admin, Instruction::CreateGame)).unwrap();
        for i in 0..4 {
            ledger.airdrop(wallet(i), 1_000_000_000);
            ledger
                .execute(&Transaction::by(
                    wallet(i),
                    Instruction::CreatePlayer {
                        name: format!("p{i}"),
                        delegated_signer: Address::NULL,
                    },
                ))
                .unwrap();
            ledger
                .execute(&Transaction::by(wallet(i), Instruction::JoinGame { game_id: 0 }))
                .unwrap();
        }
        ledger
    }

    #[test]
    fn test_rent_exempt_minimum() {
        assert_eq!(rent_exempt_minimum(0), 128 * 6960);
        assert_eq!(rent_exempt_minimum(AttackSession::LEN), (128 + 93) * 6960);
    }

    #[test]
    fn test_registry_created_once() {
        let mut ledger = Ledger::default();
        let admin = wallet(100);
        ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)).unwrap();
        assert_eq!(
            ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)),
            Err(GameError::RegistryAlreadyInitialized)
        );
    }

    #[test]
    fn test_join_charges_cost_into_treasury() {
        let ledger = started();
        let cost = ledger.config().game_cost;
        assert_eq!(ledger.balance(&wallet(0)), 1_000_000_000 - cost);
        assert_eq!(
            ledger.balance(&treasury_address(&game_address(0))),
            4 * cost
        );
        assert_eq!(ledger.player(&wallet(0)).unwrap().games_played, 1);
        assert_eq!(ledger.registry().unwrap().total_players, 4);
    }

    #[test]
    fn test_join_without_funds_changes_nothing() {
        let mut ledger = Ledger::default();
        let admin = wallet(100);
        ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)).unwrap();
        ledger.execute(&Transaction::by(admin, Instruction::CreateGame)).unwrap();
        ledger
            .execute(&Transaction::by(
                wallet(0),
                Instruction::CreatePlayer {
                    name: "broke".into(),
                    delegated_signer: Address::NULL,
                },
            ))
            .unwrap();
        let result = ledger.execute(&Transaction::by(wallet(0), Instruction::JoinGame { game_id: 0 }));
        assert!(matches!(result, Err(GameError::InsufficientFunds { .. })));
        assert!(ledger.player(&wallet(0)).unwrap().is_ready());
        assert_eq!(ledger.board(0).unwrap().seated(), 0);
    }

    #[test]
    fn test_delegate_acts_but_cannot_rotate() {
        let mut ledger = started();
        let hot = wallet(50);
        ledger
            .execute(&Transaction::by(
                wallet(0),
                Instruction::SetDelegatedSigner { delegate: hot },
            ))
            .unwrap();
        ledger
            .execute(&Transaction::new(
                hot,
                wallet(0),
                Instruction::MoveResources {
                    source: 0,
                    destination: 1,
                    amount: 1,
                },
            ))
            .unwrap();
        assert_eq!(
            ledger.execute(&Transaction::new(
                hot,
                wallet(0),
                Instruction::SetDelegatedSigner {
                    delegate: Address::NULL,
                },
            )),
            Err(GameError::PlayerNotAuthorized)
        );
        // A delegate of one player cannot act for another.
        assert_eq!(
            ledger.execute(&Transaction::new(
                hot,
                wallet(1),
                Instruction::MoveResources {
                    source: 12,
                    destination: 11,
                    amount: 1,
                },
            )),
            Err(GameError::PlayerNotAuthorized)
        );
    }

    /// Hand tile 1, next to colour 1's corner, to colour 2.
    fn with_rival_neighbour(ledger: &mut Ledger) {
        let game = game_address(0);
        let mut board = *ledger.board(0).unwrap();
        board.tiles[1] = Tile::owned(2, 5);
        board.economies[1].tile_count += 1;
        board.economies[1].tiers.gain(crate::game::Tier::Iron);
        ledger.games.insert(game, board);
    }

    #[test]
    fn test_attack_rent_round_trip() {
        let mut ledger = started();
        with_rival_neighbour(&mut ledger);
        let before = ledger.balance(&wallet(0));
        let rent = rent_exempt_minimum(AttackSession::LEN);

        let attack = Transaction::by(
            wallet(0),
            Instruction::AttackTile {
                attacker_tile: 0,
                defender_tile: 1,
            },
        );
        let Receipt::AttackOpened { session } = ledger.execute(&attack).unwrap() else {
            panic!("expected an opened attack");
        };
        assert_eq!(ledger.balance(&wallet(0)), before - rent);
        assert_eq!(ledger.balance(&session), rent);
        assert_eq!(
            ledger.execute(&attack),
            Err(GameError::AttackAlreadyInProgress)
        );

        let resolve = Transaction::by(
            wallet(0),
            Instruction::ResolveAttack {
                session,
                rent_destination: wallet(0),
            },
        );
        assert_eq!(ledger.execute(&resolve), Err(GameError::AttackNotReady));
        ledger.advance(3);
        let receipt = ledger.execute(&resolve).unwrap();
        assert!(matches!(
            receipt,
            Receipt::AttackResolved(Resolution::Fought { .. })
        ));
        assert_eq!(ledger.balance(&wallet(0)), before);
        assert_eq!(ledger.balance(&session), 0);
        assert!(ledger.session(0, 1).is_none());
        assert_eq!(
            ledger.execute(&resolve),
            Err(GameError::AttackSessionNotFound)
        );
    }

    #[test]
    fn test_expired_attack_is_forfeit() {
        let mut ledger = started();
        with_rival_neighbour(&mut ledger);
        let attack = Transaction::by(
            wallet(0),
            Instruction::AttackTile {
                attacker_tile: 0,
                defender_tile: 1,
            },
        );
        let Receipt::AttackOpened { session } = ledger.execute(&attack).unwrap() else {
            panic!("expected an opened attack");
        };
        let board = *ledger.board(0).unwrap();

        ledger.advance(301);
        let receipt = ledger
            .execute(&Transaction::by(
                wallet(3),
                Instruction::ResolveAttack {
                    session,
                    rent_destination: wallet(3),
                },
            ))
            .unwrap();
        assert_eq!(receipt, Receipt::AttackResolved(Resolution::Forfeited));
        assert_eq!(ledger.board(0).unwrap().tiles, board.tiles);
    }

    #[test]
    fn test_expired_attack_can_be_replaced() {
        let mut ledger = started();
        with_rival_neighbour(&mut ledger);
        let attack = Transaction::by(
            wallet(0),
            Instruction::AttackTile {
                attacker_tile: 0,
                defender_tile: 1,
            },
        );
        ledger.execute(&attack).unwrap();
        let before = ledger.balance(&wallet(0));
        ledger.advance(301);
        ledger.execute(&attack).unwrap();
        // Old rent came back, new rent went out.
        assert_eq!(ledger.balance(&wallet(0)), before);
        assert_eq!(
            ledger.session(0, 1).unwrap().started_at,
            ledger.now()
        );
    }

    #[test]
    fn test_recoloured_target_voids_attack() {
        let mut ledger = started();
        with_rival_neighbour(&mut ledger);
        let before = ledger.balance(&wallet(0));
        let Receipt::AttackOpened { session } = ledger
            .execute(&Transaction::by(
                wallet(0),
                Instruction::AttackTile {
                    attacker_tile: 0,
                    defender_tile: 1,
                },
            ))
            .unwrap()
        else {
            panic!("expected an opened attack");
        };

        // Tile 1 passes from colour 2 to colour 3 while the attack is pending.
        let game = game_address(0);
        let mut board = *ledger.board(0).unwrap();
        board.tiles[1] = Tile::owned(3, 5);
        board.economies[1].tile_count -= 1;
        board.economies[1].tiers.lose(crate::game::Tier::Iron);
        board.economies[2].tile_count += 1;
        board.economies[2].tiers.gain(crate::game::Tier::Iron);
        ledger.games.insert(game, board);

        ledger.advance(3);
        let receipt = ledger
            .execute(&Transaction::by(
                wallet(2),
                Instruction::ResolveAttack {
                    session,
                    rent_destination: wallet(0),
                },
            ))
            .unwrap();
        assert_eq!(receipt, Receipt::AttackResolved(Resolution::Void));
        assert_eq!(ledger.board(0).unwrap().tiles, board.tiles);
        assert_eq!(ledger.balance(&wallet(0)), before);
        assert_eq!(ledger.balance(&session), 0);
        assert!(ledger.session(0, 1).is_none());
    }

    #[test]
    fn test_create_game_rejects_invalid_rules() {
        let config = GameConfig {
            starting_resources: 0,
            ..GameConfig::default()
        };
        let mut ledger = Ledger::new(config, 0);
        let admin = wallet(100);
        ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)).unwrap();
        assert_eq!(
            ledger.execute(&Transaction::by(admin, Instruction::CreateGame)),
            Err(GameError::InvalidConfig)
        );
        assert!(ledger.board(0).is_none());
        assert_eq!(ledger.registry().unwrap().game_count, 0);
    }

    #[test]
    fn test_claim_requires_winner() {
        let mut ledger = started();
        assert_eq!(
            ledger.execute(&Transaction::by(wallet(0), Instruction::ClaimPrize)),
            Err(GameError::NoWinnerYet)
        );
    }

    #[test]
    fn test_corners_owned_after_start() {
        let ledger = started();
        let board = ledger.board(0).unwrap();
        assert_eq!(board.state, GameState::InProgress);
        for (seat, corner) in STARTING_CORNERS.iter().enumerate() {
            assert_eq!(board.tiles[usize::from(corner.index())].owner, Some(u8::try_from(seat + 1).unwrap()));
        }
    }
}
