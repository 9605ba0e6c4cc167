#![no_main]

use arbitrary::Arbitrary;
use hexone::game::invariants::check_invariants;
use hexone::{Address, Instruction, Ledger, Transaction};
use libfuzzer_sys::fuzz_target;

/// One fuzzed board operation.
#[derive(Arbitrary, Debug)]
enum Action {
    /// Advance the clock (capped).
    Wait(u16),
    /// Move resources between raw tile indices.
    Move {
        seat: u8,
        source: u16,
        destination: u16,
        amount: u16,
    },
    /// Spend pool allowance onto a raw tile index.
    Add { seat: u8, tile: u16, amount: u32 },
    /// Open an attack between raw tile indices.
    Attack { seat: u8, from: u16, to: u16 },
    /// Resolve the session on a raw defender tile.
    Resolve { seat: u8, tile: u16 },
}

fn wallet(seat: u8) -> Address {
    Address::hashed(&[b'f', seat % 4])
}

fn started() -> Option<Ledger> {
    let mut ledger = Ledger::default();
    let admin = Address::hashed(b"admin");
    ledger.execute(&Transaction::by(admin, Instruction::CreateRegistry)).ok()?;
    ledger.execute(&Transaction::by(admin, Instruction::CreateGame)).ok()?;
    for seat in 0..4 {
        ledger.airdrop(wallet(seat), 10_000_000_000);
        ledger
            .execute(&Transaction::by(
                wallet(seat),
                Instruction::CreatePlayer {
                    name: String::new(),
                    delegated_signer: Address::NULL,
                },
            ))
            .ok()?;
        ledger
            .execute(&Transaction::by(wallet(seat), Instruction::JoinGame { game_id: 0 }))
            .ok()?;
    }
    Some(ledger)
}

fuzz_target!(|actions: Vec<Action>| {
    let Some(mut ledger) = started() else {
        return;
    };

    // Cap action count to avoid timeouts
    for action in actions.into_iter().take(500) {
        let (seat, instruction) = match action {
            Action::Wait(seconds) => {
                ledger.advance(i64::from(seconds));
                continue;
            }
            Action::Move {
                seat,
                source,
                destination,
                amount,
            } => (
                seat,
                Instruction::MoveResources {
                    source,
                    destination,
                    amount,
                },
            ),
            Action::Add { seat, tile, amount } => (seat, Instruction::AddResources { tile, amount }),
            Action::Attack { seat, from, to } => (
                seat,
                Instruction::AttackTile {
                    attacker_tile: from,
                    defender_tile: to,
                },
            ),
            Action::Resolve { seat, tile } => {
                let Some(session) = ledger.session(0, tile).map(|s| {
                    hexone::address::attack_address(&s.game, s.defender_tile)
                }) else {
                    continue;
                };
                (
                    seat,
                    Instruction::ResolveAttack {
                        session,
                        rent_destination: wallet(seat),
                    },
                )
            }
        };

        let Some(before) = ledger.board(0).copied() else {
            return;
        };
        let result = ledger.execute(&Transaction::by(wallet(seat), instruction));
        let Some(after) = ledger.board(0).copied() else {
            return;
        };

        if result.is_err() {
            assert_eq!(before, after, "rejected transaction changed the board");
        }
        assert!(after.pool.total_available >= before.pool.total_available);
        let violations = check_invariants(&after);
        assert!(violations.is_empty(), "invariant violations: {violations:?}");
    }
});
