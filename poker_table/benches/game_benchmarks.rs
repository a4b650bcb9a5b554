use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use poker_table::{
    Command, GameSettings, TableEngine,
    entities::{Card, Deck, DisplayName, PlayerId, Suit},
    functional::{argmax, evaluate},
};
use rand::{SeedableRng, rngs::StdRng};

/// Helper to create an engine with N seated players
fn setup_engine_with_players(n_players: usize) -> TableEngine {
    let mut engine = TableEngine::new(GameSettings {
        seed: Some(7),
        ..GameSettings::default()
    });

    for i in 0..n_players {
        let name = format!("player{i}");
        engine
            .apply(Command::Join {
                player_id: PlayerId::new(&name),
                name: DisplayName::new(&name),
                as_spectator: false,
            })
            .unwrap();
    }

    engine
}

/// Benchmark hand evaluation with 7 cards (hole cards + board)
fn bench_hand_eval_7_cards(c: &mut Criterion) {
    let cards = vec![
        Card(14, Suit::Spade),
        Card(13, Suit::Spade),
        Card(12, Suit::Spade),
        Card(11, Suit::Spade),
        Card(10, Suit::Spade),
        Card(2, Suit::Heart),
        Card(3, Suit::Diamond),
    ];

    c.bench_function("hand_eval_7_cards", |b| {
        b.iter(|| evaluate(&cards));
    });
}

/// Benchmark evaluating 100 random 7-card hands
fn bench_hand_eval_100_random(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let all_hands: Vec<Vec<Card>> = (0..100)
        .map(|_| Deck::shuffled(&mut rng).cards()[..7].to_vec())
        .collect();

    c.bench_function("hand_eval_100_random", |b| {
        b.iter(|| {
            all_hands
                .iter()
                .map(|cards| evaluate(cards))
                .collect::<Vec<_>>()
        });
    });
}

/// Benchmark picking winners among showdown hands
fn bench_hand_comparison(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(9);
    let deck = Deck::shuffled(&mut rng);
    let board = &deck.cards()[..5];
    let hands: Vec<_> = deck.cards()[5..25]
        .chunks(2)
        .filter_map(|hole| {
            let mut cards = board.to_vec();
            cards.extend_from_slice(hole);
            evaluate(&cards).ok()
        })
        .collect();

    c.bench_function("hand_comparison_10_hands", |b| {
        b.iter(|| argmax(&hands));
    });
}

/// Benchmark snapshot generation with different player counts
fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot");

    for n_players in [2, 6, 10].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, &n| {
                let mut engine = setup_engine_with_players(n);
                engine.apply(Command::StartHand).unwrap();
                let viewer = PlayerId::new("player0");
                b.iter(|| engine.snapshot().visible_to(Some(&viewer)));
            },
        );
    }

    group.finish();
}

/// Benchmark dealing a hand and folding it around to the big blind
fn bench_fold_around(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold_around");

    for n_players in [2, 10].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_players", n_players)),
            n_players,
            |b, &n| {
                b.iter_batched(
                    || setup_engine_with_players(n),
                    |mut engine| {
                        engine.apply(Command::StartHand).unwrap();
                        let hand = engine.hand_number();
                        while engine.hand_number() == hand {
                            let Some(acting) = engine.acting_player().cloned() else {
                                break;
                            };
                            engine.apply(Command::Fold(acting)).unwrap();
                        }
                        engine.drain_events()
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    hand_evaluation,
    bench_hand_eval_7_cards,
    bench_hand_eval_100_random,
    bench_hand_comparison,
);

criterion_group!(game_operations, bench_snapshot, bench_fold_around);

criterion_main!(hand_evaluation, game_operations);
