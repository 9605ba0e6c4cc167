#![no_main]

use arbitrary::Arbitrary;
use hexone::Address;
use hexone::game::{AttackSession, ROLL_RANGE, Rolls, resolve_combat, roll};
use libfuzzer_sys::fuzz_target;

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    /// Resources on the attacking tile.
    attacker: u16,
    /// Resources on the defending tile.
    defender: u16,
    /// Slot hash the rolls are drawn from.
    slot_hash: [u8; 32],
    /// Session address bytes.
    session: [u8; 32],
    /// Session opening time.
    started_at: i64,
    /// Attacking tile index.
    attacker_tile: u16,
    /// Attacking colour.
    attacker_color: u8,
}

fuzz_target!(|input: CombatInput| {
    // Attacks need two resources; defended tiles always hold one.
    if input.attacker < 2 || input.defender == 0 {
        return;
    }

    let address = Address::new(input.session);
    let session = AttackSession {
        game: Address::NULL,
        defender_tile: 0,
        defender_color: 0,
        attacker_tile: input.attacker_tile,
        attacker_color: input.attacker_color,
        started_at: input.started_at,
        payer: Address::NULL,
        resolved: false,
        attacker_won: false,
        attacker_roll: 0,
        defender_roll: 0,
        bump: 0,
    };
    let rolls = Rolls::draw(&input.slot_hash, &address, &session);
    assert!(u64::from(rolls.attacker) < ROLL_RANGE);
    assert!(u64::from(rolls.defender) < ROLL_RANGE);
    assert_eq!(
        rolls.attacker,
        roll(&input.slot_hash, &address, &session, b"attacker")
    );

    let outcome = resolve_combat(input.attacker, input.defender, rolls);
    assert_eq!(outcome.attacker_won, rolls.attacker > rolls.defender);

    // Combat never creates resources and never empties a tile.
    assert!(outcome.attacker_remaining <= input.attacker);
    assert!(outcome.defender_remaining <= input.defender);
    assert!(outcome.attacker_remaining >= 1);
    assert!(outcome.defender_remaining >= 1);

    // Exactly one side pays.
    if outcome.attacker_won {
        assert_eq!(outcome.attacker_remaining, input.attacker);
    } else {
        assert_eq!(outcome.defender_remaining, input.defender);
    }
});
