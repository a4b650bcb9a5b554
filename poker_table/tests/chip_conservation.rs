/// Chip conservation across arbitrary command sequences
///
/// Chips never appear or disappear: every stack plus the pot, plus whatever
/// departed users carried away, always adds up to what users brought.
use std::collections::HashMap;

use poker_table::{
    Command, GameSettings, TableEngine,
    entities::{Chips, DisplayName, Phase, PlayerId, TableSnapshot},
};
use proptest::prelude::*;

const PLAYERS: [&str; 5] = ["p1", "p2", "p3", "p4", "p5"];
const STACK: Chips = 1_000;

#[derive(Clone, Debug)]
enum Move {
    Fold(usize),
    Call(usize),
    Raise(usize, Chips),
    Leave(usize),
    Spectate(usize),
    Promote(usize),
    Join(usize),
    StartHand,
}

fn move_strategy() -> impl Strategy<Value = Move> {
    let player = 0..PLAYERS.len();
    prop_oneof![
        6 => player.clone().prop_map(Move::Call),
        3 => player.clone().prop_map(Move::Fold),
        3 => (player.clone(), 0u32..1_500).prop_map(|(p, amount)| Move::Raise(p, amount)),
        1 => player.clone().prop_map(Move::Leave),
        1 => player.clone().prop_map(Move::Spectate),
        1 => player.clone().prop_map(Move::Promote),
        1 => player.prop_map(Move::Join),
        1 => Just(Move::StartHand),
    ]
}

fn id(idx: usize) -> PlayerId {
    PlayerId::new(PLAYERS[idx])
}

fn to_command(mv: &Move) -> Command {
    match *mv {
        Move::Fold(p) => Command::Fold(id(p)),
        Move::Call(p) => Command::Call(id(p)),
        Move::Raise(p, amount) => Command::Raise(id(p), amount),
        Move::Leave(p) => Command::Leave(id(p)),
        Move::Spectate(p) => Command::Spectate(id(p)),
        Move::Promote(p) => Command::Promote(id(p)),
        Move::Join(p) => Command::Join {
            player_id: id(p),
            name: DisplayName::new(PLAYERS[p]),
            as_spectator: false,
        },
        Move::StartHand => Command::StartHand,
    }
}

fn casual_table(seed: u64) -> TableEngine {
    let mut engine = TableEngine::new(GameSettings {
        small_blind: 10,
        big_blind: 20,
        starting_stack: STACK,
        seat_capacity: 4,
        seed: Some(seed),
        ..GameSettings::default()
    });
    for i in 0..PLAYERS.len() {
        engine.apply(to_command(&Move::Join(i))).unwrap();
    }
    engine
}

/// Every user's stack, whatever their role.
fn stacks(snapshot: &TableSnapshot) -> HashMap<PlayerId, Chips> {
    snapshot
        .players
        .iter()
        .map(|p| (p.id.clone(), p.chips))
        .chain(
            snapshot
                .spectators
                .iter()
                .chain(&snapshot.waitlist)
                .map(|u| (u.id.clone(), u.chips)),
        )
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_chips_are_conserved(
        seed in any::<u64>(),
        moves in prop::collection::vec(move_strategy(), 1..300),
    ) {
        let mut engine = casual_table(seed);
        let mut brought = engine.total_chips();
        let mut carried_away: Chips = 0;

        for mv in &moves {
            let before = engine.snapshot();
            match engine.apply(to_command(mv)) {
                Ok(()) => {
                    let old = stacks(&before);
                    let new = stacks(&engine.snapshot());
                    for (user, chips) in &old {
                        if !new.contains_key(user) {
                            carried_away += chips;
                        }
                    }
                    brought += STACK * new.keys().filter(|u| !old.contains_key(*u)).count() as Chips;
                }
                Err(_) => prop_assert_eq!(engine.snapshot(), before),
            }
            prop_assert_eq!(engine.total_chips() + carried_away, brought);
        }
    }

    #[test]
    fn test_chips_conserved_without_departures(
        seed in any::<u64>(),
        moves in prop::collection::vec(move_strategy(), 1..300),
    ) {
        let mut engine = casual_table(seed);
        let total = engine.total_chips();

        for mv in moves.iter().filter(|mv| !matches!(mv, Move::Leave(_) | Move::Join(_))) {
            let _ = engine.apply(to_command(mv));
            prop_assert_eq!(engine.total_chips(), total);
        }
    }
}

#[test]
fn test_pot_is_empty_after_settlement() {
    let mut engine = casual_table(1);
    for i in 2..PLAYERS.len() {
        engine.apply(Command::Leave(id(i))).unwrap();
    }
    engine.apply(Command::StartHand).unwrap();
    assert_eq!(engine.pot(), 30);

    let acting = engine.acting_player().cloned().unwrap();
    engine.apply(Command::Leave(acting)).unwrap();

    // One seat left, so no new hand is dealt.
    assert_eq!(engine.phase(), Phase::Waiting);
    assert_eq!(engine.pot(), 0);
    assert_eq!(engine.snapshot().players.len(), 1);
}
