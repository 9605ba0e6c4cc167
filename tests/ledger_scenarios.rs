//! End-to-end game scenarios driven through the ledger.
//!
//! Each test builds a fresh ledger, seats four wallets and then plays one
//! situation from the rules through transactions only.
//!
//! Run with: cargo test ledger_scenarios

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use hexone::address::{attack_address, game_address, treasury_address};
use hexone::game::{Coord, GameState, STARTING_CORNERS, Tile};
use hexone::ledger::{Receipt, Resolution, rent_exempt_minimum};
use hexone::{Address, AttackSession, GameConfig, GameError, Instruction, Ledger, Transaction};

const FUNDING: u64 = 2_000_000_000;

fn wallet(seat: u8) -> Address {
    Address::hashed(&[b'w', seat])
}

fn admin() -> Address {
    Address::hashed(b"admin")
}

fn exec(ledger: &mut Ledger, signer: Address, instruction: Instruction) -> Result<Receipt, GameError> {
    ledger.execute(&Transaction::by(signer, instruction))
}

/// Registry, game 0 and four registered, funded wallets. Nobody has joined.
fn lobby() -> Ledger {
    lobby_seeded(0)
}

/// As [`lobby`], with the genesis slot hash drawn from `seed`.
fn lobby_seeded(seed: u64) -> Ledger {
    let mut ledger = Ledger::new(GameConfig::default(), seed);
    exec(&mut ledger, admin(), Instruction::CreateRegistry).unwrap();
    let receipt = exec(&mut ledger, admin(), Instruction::CreateGame).unwrap();
    assert_eq!(
        receipt,
        Receipt::GameCreated {
            game_id: 0,
            address: game_address(0)
        }
    );
    for seat in 0..4 {
        ledger.airdrop(wallet(seat), FUNDING);
        exec(
            &mut ledger,
            wallet(seat),
            Instruction::CreatePlayer {
                name: format!("player {}", seat + 1),
                delegated_signer: Address::NULL,
            },
        )
        .unwrap();
    }
    ledger
}

fn started() -> Ledger {
    started_seeded(0)
}

fn started_seeded(seed: u64) -> Ledger {
    let mut ledger = lobby_seeded(seed);
    for seat in 0..4 {
        exec(&mut ledger, wallet(seat), Instruction::JoinGame { game_id: 0 }).unwrap();
    }
    ledger
}

fn index(row: u8, col: u8) -> u16 {
    Coord::new(row, col).index()
}

fn tile(ledger: &Ledger, index: u16) -> Tile {
    ledger.board(0).unwrap().tiles[usize::from(index)]
}

/// Spend two minutes of production on the first corner, then walk it along
/// row 0 leaving one resource behind per hop. Ends next to colour 2.
fn walk_top_row(ledger: &mut Ledger) -> u16 {
    ledger.advance(120);
    exec(ledger, wallet(0), Instruction::AddResources { tile: 0, amount: 20 }).unwrap();
    for col in 0..11 {
        let source = index(0, col);
        let amount = tile(ledger, source).resources - 1;
        exec(
            ledger,
            wallet(0),
            Instruction::MoveResources {
                source,
                destination: index(0, col + 1),
                amount,
            },
        )
        .unwrap();
    }
    index(0, 11)
}

#[test]
fn test_fourth_join_starts_game() {
    let mut ledger = lobby();
    for seat in 0..4u8 {
        assert_eq!(ledger.board(0).unwrap().state, GameState::Waiting);
        let receipt = exec(&mut ledger, wallet(seat), Instruction::JoinGame { game_id: 0 }).unwrap();
        assert_eq!(
            receipt,
            Receipt::Joined {
                color: seat + 1,
                started: seat == 3
            }
        );
    }
    let board = ledger.board(0).unwrap();
    assert_eq!(board.state, GameState::InProgress);
    for (seat, corner) in STARTING_CORNERS.iter().enumerate() {
        let corner = board.tiles[usize::from(corner.index())];
        assert_eq!(corner.owner, Some(u8::try_from(seat + 1).unwrap()));
        assert_eq!(corner.resources, 10);
    }
}

#[test]
fn test_fifth_join_rejected() {
    let mut ledger = started();
    let late = Address::hashed(b"late");
    ledger.airdrop(late, FUNDING);
    exec(
        &mut ledger,
        late,
        Instruction::CreatePlayer {
            name: "late".into(),
            delegated_signer: Address::NULL,
        },
    )
    .unwrap();
    assert_eq!(
        exec(&mut ledger, late, Instruction::JoinGame { game_id: 0 }),
        Err(GameError::GameNotWaiting)
    );
    assert_eq!(ledger.balance(&late), FUNDING);
}

#[test]
fn test_player_in_game_cannot_join_another() {
    let mut ledger = started();
    exec(&mut ledger, admin(), Instruction::CreateGame).unwrap();
    assert_eq!(
        exec(&mut ledger, wallet(0), Instruction::JoinGame { game_id: 1 }),
        Err(GameError::PlayerNotReady)
    );
}

#[test]
fn test_move_chain_leaves_one_per_hop() {
    let mut ledger = started();
    let last = walk_top_row(&mut ledger);

    for col in 0..11 {
        let hop = tile(&ledger, index(0, col));
        assert_eq!(hop, Tile::owned(1, 1));
    }
    // 10 starting + 20 added, one left behind on each of 11 hops.
    let end = tile(&ledger, last);
    assert_eq!(end.owner, Some(1));
    assert!(end.resources >= 30 - 11);
    assert_eq!(ledger.board(0).unwrap().economy(1).unwrap().tile_count, 12);
}

#[test]
fn test_move_into_rival_rejected() {
    let mut ledger = started();
    let last = walk_top_row(&mut ledger);
    let before = *ledger.board(0).unwrap();
    assert_eq!(
        exec(
            &mut ledger,
            wallet(0),
            Instruction::MoveResources {
                source: last,
                destination: index(0, 12),
                amount: 1,
            },
        ),
        Err(GameError::TileOwnedByRival)
    );
    assert_eq!(*ledger.board(0).unwrap(), before);
}

#[test]
fn test_second_attack_on_tile_rejected_until_resolved() {
    let mut ledger = started();
    let attacker_tile = walk_top_row(&mut ledger);
    let defender_tile = index(0, 12);
    let attack = Instruction::AttackTile {
        attacker_tile,
        defender_tile,
    };

    let balance = ledger.balance(&wallet(0));
    let receipt = exec(&mut ledger, wallet(0), attack.clone()).unwrap();
    let session = attack_address(&game_address(0), defender_tile);
    assert_eq!(receipt, Receipt::AttackOpened { session });
    let rent = rent_exempt_minimum(AttackSession::LEN);
    assert_eq!(ledger.balance(&wallet(0)), balance - rent);
    assert_eq!(ledger.balance(&session), rent);

    assert_eq!(
        exec(&mut ledger, wallet(0), attack),
        Err(GameError::AttackAlreadyInProgress)
    );

    let resolve = Instruction::ResolveAttack {
        session,
        rent_destination: wallet(0),
    };
    assert_eq!(
        exec(&mut ledger, wallet(2), resolve.clone()),
        Err(GameError::AttackNotReady)
    );

    ledger.advance(3);
    let before = tile(&ledger, attacker_tile).resources + tile(&ledger, defender_tile).resources;
    let receipt = exec(&mut ledger, wallet(2), resolve.clone()).unwrap();
    let Receipt::AttackResolved(Resolution::Fought { outcome, .. }) = receipt else {
        panic!("expected combat, got {receipt:?}");
    };
    let after = tile(&ledger, attacker_tile).resources + tile(&ledger, defender_tile).resources;
    assert!(after < before);
    assert!(tile(&ledger, attacker_tile).resources >= 1);
    assert!(tile(&ledger, defender_tile).resources >= 1);
    let expected_owner = if outcome.attacker_won { 1 } else { 2 };
    assert_eq!(tile(&ledger, defender_tile).owner, Some(expected_owner));

    assert!(ledger.session(0, defender_tile).is_none());
    assert!(ledger.session_at(&session).is_none());
    assert_eq!(ledger.balance(&session), 0);
    assert_eq!(ledger.balance(&wallet(0)), balance);
    assert_eq!(
        exec(&mut ledger, wallet(2), resolve),
        Err(GameError::AttackSessionNotFound)
    );
}

#[test]
fn test_attack_needs_two_resources() {
    let mut ledger = started();
    ledger.advance(120);
    exec(&mut ledger, wallet(0), Instruction::AddResources { tile: 0, amount: 20 }).unwrap();
    for col in 0..11 {
        let source = index(0, col);
        exec(
            &mut ledger,
            wallet(0),
            Instruction::MoveResources {
                source,
                destination: index(0, col + 1),
                amount: 1,
            },
        )
        .unwrap();
        if col < 10 {
            // Keep the walking stack on the next tile.
            let stack = tile(&ledger, source).resources;
            if stack > 1 {
                exec(
                    &mut ledger,
                    wallet(0),
                    Instruction::MoveResources {
                        source,
                        destination: index(0, col + 1),
                        amount: stack - 1,
                    },
                )
                .unwrap();
            }
        }
    }
    // The last hop carried a single resource.
    assert_eq!(tile(&ledger, index(0, 11)).resources, 1);
    assert_eq!(
        exec(
            &mut ledger,
            wallet(0),
            Instruction::AttackTile {
                attacker_tile: index(0, 11),
                defender_tile: index(0, 12),
            },
        ),
        Err(GameError::InsufficientResources)
    );
}

#[test]
fn test_pool_shared_not_summed() {
    let mut ledger = started();
    ledger.advance(61);
    for seat in 0..4u8 {
        let corner = STARTING_CORNERS[usize::from(seat)].index();
        exec(
            &mut ledger,
            wallet(seat),
            Instruction::AddResources {
                tile: corner,
                amount: 10,
            },
        )
        .unwrap();
        assert_eq!(tile(&ledger, corner).resources, 20);
    }
    let board = ledger.board(0).unwrap();
    assert_eq!(board.pool.total_available, 10);
    for color in 1..=4 {
        assert_eq!(board.economy(color).unwrap().resources_spent, 10);
    }
    assert_eq!(
        exec(
            &mut ledger,
            wallet(0),
            Instruction::AddResources { tile: 0, amount: 1 },
        ),
        Err(GameError::ResourceSpendExceedsPool)
    );
}

#[test]
fn test_add_before_first_minute_rejected() {
    let mut ledger = started();
    ledger.advance(59);
    assert_eq!(
        exec(
            &mut ledger,
            wallet(0),
            Instruction::AddResources { tile: 0, amount: 1 },
        ),
        Err(GameError::ResourceSpendExceedsPool)
    );
    assert_eq!(ledger.board(0).unwrap().pool.total_available, 0);
}

#[test]
fn test_prize_goes_to_winner() {
    let mut ledger = started();
    let treasury = treasury_address(&game_address(0));
    let prize = ledger.balance(&treasury);
    assert_eq!(prize, 4 * ledger.config().game_cost);

    // One owned iron tile earns one experience per minute.
    let limit = ledger.board(0).unwrap().winning_xp_limit;
    ledger.advance(i64::from(limit) * 60);
    assert_eq!(
        exec(&mut ledger, wallet(1), Instruction::ClaimPrize),
        Err(GameError::NotWinner)
    );
    // The rejected claim settled nothing; the winner's claim settles first.
    let before = ledger.balance(&wallet(0));
    let receipt = exec(&mut ledger, wallet(0), Instruction::ClaimPrize).unwrap();
    assert_eq!(receipt, Receipt::PrizeClaimed { amount: prize });
    assert_eq!(ledger.balance(&wallet(0)), before + prize);
    assert_eq!(ledger.balance(&treasury), 0);

    let board = ledger.board(0).unwrap();
    assert_eq!(board.state, GameState::Completed);
    assert_eq!(board.winner, Some(wallet(0)));
    let winner = ledger.player(&wallet(0)).unwrap();
    assert_eq!(winner.games_won, 1);
    assert!(winner.is_ready());
    assert!(ledger.player(&wallet(3)).unwrap().active_game.is_none());
    assert_eq!(ledger.registry().unwrap().games_completed, 1);

    assert_eq!(
        exec(&mut ledger, wallet(0), Instruction::ClaimPrize),
        Err(GameError::PlayerNotInGame)
    );
}

#[test]
fn test_crossing_attack_voided_after_flip() {
    let (attack_from, attack_to) = (index(0, 11), index(0, 12));
    let mut voided = 0;
    // Combat is decided by the slot hash; try seeds until the first attack takes its tile.
    for seed in 0..32 {
        let mut ledger = started_seeded(seed);
        walk_top_row(&mut ledger);
        let Receipt::AttackOpened { session: first } = exec(
            &mut ledger,
            wallet(0),
            Instruction::AttackTile {
                attacker_tile: attack_from,
                defender_tile: attack_to,
            },
        )
        .unwrap() else {
            panic!("expected an opened attack");
        };
        let Receipt::AttackOpened { session: second } = exec(
            &mut ledger,
            wallet(1),
            Instruction::AttackTile {
                attacker_tile: attack_to,
                defender_tile: attack_from,
            },
        )
        .unwrap() else {
            panic!("expected an opened attack");
        };
        let rival_balance = ledger.balance(&wallet(1));
        let rent = rent_exempt_minimum(AttackSession::LEN);

        ledger.advance(3);
        let receipt = exec(
            &mut ledger,
            wallet(2),
            Instruction::ResolveAttack {
                session: first,
                rent_destination: wallet(0),
            },
        )
        .unwrap();
        let Receipt::AttackResolved(Resolution::Fought { outcome, .. }) = receipt else {
            panic!("expected combat, got {receipt:?}");
        };

        let board = *ledger.board(0).unwrap();
        let receipt = exec(
            &mut ledger,
            wallet(2),
            Instruction::ResolveAttack {
                session: second,
                rent_destination: wallet(1),
            },
        )
        .unwrap();
        assert!(ledger.session_at(&second).is_none());
        assert_eq!(ledger.balance(&second), 0);
        assert_eq!(ledger.balance(&wallet(1)), rival_balance + rent);

        if outcome.attacker_won {
            // The second attack comes from a tile that no longer has its colour.
            assert_eq!(tile(&ledger, attack_to).owner, Some(1));
            assert_eq!(receipt, Receipt::AttackResolved(Resolution::Void));
            assert_eq!(ledger.board(0).unwrap().tiles, board.tiles);
            voided += 1;
        } else {
            assert!(matches!(
                receipt,
                Receipt::AttackResolved(Resolution::Fought { .. })
            ));
        }
    }
    assert!(voided > 0);
}

#[test]
fn test_delegate_adds_and_attacks_for_its_player() {
    let mut ledger = started();
    let attacker_tile = walk_top_row(&mut ledger);
    let hot = Address::hashed(b"hot wallet");
    ledger.airdrop(hot, FUNDING);
    exec(
        &mut ledger,
        wallet(0),
        Instruction::SetDelegatedSigner { delegate: hot },
    )
    .unwrap();

    ledger.advance(60);
    let stack = tile(&ledger, attacker_tile).resources;
    ledger
        .execute(&Transaction::new(
            hot,
            wallet(0),
            Instruction::AddResources {
                tile: attacker_tile,
                amount: 5,
            },
        ))
        .unwrap();
    assert_eq!(tile(&ledger, attacker_tile).resources, stack + 5);

    let receipt = ledger
        .execute(&Transaction::new(
            hot,
            wallet(0),
            Instruction::AttackTile {
                attacker_tile,
                defender_tile: index(0, 12),
            },
        ))
        .unwrap();
    let session = attack_address(&game_address(0), index(0, 12));
    assert_eq!(receipt, Receipt::AttackOpened { session });
    let opened = ledger.session_at(&session).unwrap();
    assert_eq!(opened.attacker_color, 1);
    // The delegate signed, so the delegate paid the rent.
    assert_eq!(opened.payer, hot);
    assert_eq!(
        ledger.balance(&hot),
        FUNDING - rent_exempt_minimum(AttackSession::LEN)
    );
}

#[test]
fn test_delegate_refused_for_other_player() {
    let mut ledger = started();
    let hot = Address::hashed(b"hot wallet");
    ledger.airdrop(hot, FUNDING);
    exec(
        &mut ledger,
        wallet(0),
        Instruction::SetDelegatedSigner { delegate: hot },
    )
    .unwrap();
    ledger.advance(60);

    let corner = STARTING_CORNERS[1].index();
    let board = *ledger.board(0).unwrap();
    assert_eq!(
        ledger.execute(&Transaction::new(
            hot,
            wallet(1),
            Instruction::AddResources {
                tile: corner,
                amount: 1,
            },
        )),
        Err(GameError::PlayerNotAuthorized)
    );
    assert_eq!(
        ledger.execute(&Transaction::new(
            hot,
            wallet(1),
            Instruction::AttackTile {
                attacker_tile: corner,
                defender_tile: index(0, 11),
            },
        )),
        Err(GameError::PlayerNotAuthorized)
    );
    assert_eq!(ledger.board(0).unwrap().tiles, board.tiles);
    assert_eq!(ledger.balance(&hot), FUNDING);
}
