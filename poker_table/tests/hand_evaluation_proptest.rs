/// Property-based tests for hand evaluation and shuffling using proptest
///
/// These tests verify that the evaluator and the deck behave correctly
/// across a wide range of randomly generated cards and seeds.
use poker_table::game::{
    entities::{ACE, Card, Deck, Suit},
    functional::{EvalError, HandCategory, argmax, compare_hands, evaluate},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use std::{cmp::Ordering, collections::BTreeSet};

// Strategy to generate a valid card (values 2-14, aces are value 14)
fn card_strategy() -> impl Strategy<Value = Card> {
    (2u8..=ACE, 0usize..4).prop_map(|(value, suit_idx)| Card(value, Suit::ALL[suit_idx]))
}

// Strategy to generate a vec of unique cards (no duplicates)
fn unique_cards_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::vec(card_strategy(), min..=max).prop_filter("Cards must be unique", |cards| {
        let set: BTreeSet<_> = cards.iter().collect();
        set.len() == cards.len()
    })
}

// Strategy to generate 7 unique cards (2 hole + 5 board)
fn seven_card_hand_strategy() -> impl Strategy<Value = Vec<Card>> {
    unique_cards_strategy(7, 7)
}

fn cards(s: &str) -> Vec<Card> {
    s.split_whitespace().map(|c| c.parse().unwrap()).collect()
}

/// Every 5-card subset of `hand`.
fn five_card_subsets(hand: &[Card]) -> Vec<Vec<Card>> {
    let n = hand.len();
    let mut subsets = Vec::new();
    for skip_a in 0..n {
        for skip_b in skip_a + 1..n {
            let subset: Vec<Card> = hand
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip_a && *i != skip_b)
                .map(|(_, card)| *card)
                .collect();
            subsets.push(subset);
        }
    }
    subsets
}

proptest! {
    #[test]
    fn test_eval_always_succeeds(hand in unique_cards_strategy(5, 7)) {
        let strength = evaluate(&hand);
        prop_assert!(strength.is_ok());
        prop_assert!(strength.unwrap().tiebreak.len() <= 5);
    }

    #[test]
    fn test_eval_ignores_card_order(shuffled in seven_card_hand_strategy().prop_flat_map(|hand| {
        (Just(hand.clone()), Just(hand).prop_shuffle())
    })) {
        let (hand, permuted) = shuffled;
        prop_assert_eq!(evaluate(&hand), evaluate(&permuted));
    }

    #[test]
    fn test_seven_cards_rank_as_best_five(hand in seven_card_hand_strategy()) {
        let best = five_card_subsets(&hand)
            .iter()
            .map(|subset| evaluate(subset).unwrap())
            .max()
            .unwrap();
        prop_assert_eq!(evaluate(&hand).unwrap(), best);
    }

    #[test]
    fn test_more_cards_never_worse(hand in seven_card_hand_strategy()) {
        let five = evaluate(&hand[..5]).unwrap();
        let six = evaluate(&hand[..6]).unwrap();
        let seven = evaluate(&hand).unwrap();
        prop_assert!(six >= five);
        prop_assert!(seven >= six);
    }

    #[test]
    fn test_argmax_returns_the_best(
        hands in prop::collection::vec(seven_card_hand_strategy(), 1..8)
    ) {
        let strengths: Vec<_> = hands.iter().map(|h| evaluate(h).unwrap()).collect();
        let winners = argmax(&strengths);
        prop_assert!(!winners.is_empty());
        for &winner in &winners {
            for other in &strengths {
                prop_assert_ne!(compare_hands(&strengths[winner], other), Ordering::Less);
            }
        }
    }

    #[test]
    fn test_compare_is_antisymmetric(a in seven_card_hand_strategy(), b in seven_card_hand_strategy()) {
        let a = evaluate(&a).unwrap();
        let b = evaluate(&b).unwrap();
        prop_assert_eq!(compare_hands(&a, &b), compare_hands(&b, &a).reverse());
    }

    #[test]
    fn test_shuffle_is_a_permutation(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let deck = Deck::shuffled(&mut rng);
        prop_assert_eq!(deck.len(), 52);
        let shuffled: BTreeSet<_> = deck.cards().iter().copied().collect();
        let standard: BTreeSet<_> = Deck::standard().cards().iter().copied().collect();
        prop_assert_eq!(shuffled, standard);
    }

    #[test]
    fn test_same_seed_same_deck(seed in any::<u64>()) {
        let first = Deck::shuffled(&mut StdRng::seed_from_u64(seed));
        let second = Deck::shuffled(&mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(first.cards(), second.cards());
    }
}

#[test]
fn test_category_total_order() {
    let ranked = [
        cards("As Ks Qs Js Ts 2h 3d"),
        cards("9s 8s 7s 6s 5s 2h 3d"),
        cards("Ah Ad Ac As Kd 2h 3d"),
        cards("Ah Ad Ac Kd Ks 2h 3d"),
        cards("Ah 9h 7h 4h 2h Kd 3d"),
        cards("9h 8d 7c 6s 5h 2d Kc"),
        cards("Qh Qd Qc 8s 5h 2d Kc"),
        cards("Qh Qd 8c 8s 5h 2d Kc"),
        cards("Qh Qd 9c 8s 5h 2d Kc"),
        cards("Ah Qd 9c 8s 5h 2d Kc"),
    ];
    let strengths: Vec<_> = ranked.iter().map(|h| evaluate(h).unwrap()).collect();
    let categories: Vec<_> = strengths.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            HandCategory::RoyalFlush,
            HandCategory::StraightFlush,
            HandCategory::FourOfAKind,
            HandCategory::FullHouse,
            HandCategory::Flush,
            HandCategory::Straight,
            HandCategory::ThreeOfAKind,
            HandCategory::TwoPair,
            HandCategory::OnePair,
            HandCategory::HighCard,
        ]
    );
    for pair in strengths.windows(2) {
        assert_eq!(compare_hands(&pair[0], &pair[1]), Ordering::Greater);
    }
}

#[test]
fn test_wheel_is_the_lowest_straight() {
    let wheel = evaluate(&cards("Ah 2d 3c 4s 5h 9d Kc")).unwrap();
    let six_high = evaluate(&cards("6h 2d 3c 4s 5h 9d Kc")).unwrap();
    assert_eq!(wheel.category, HandCategory::Straight);
    assert_eq!(wheel.tiebreak, vec![5]);
    assert!(six_high > wheel);
}

#[test]
fn test_invalid_input_rejected() {
    assert_eq!(
        evaluate(&cards("As Ks Qs Js")),
        Err(EvalError::InvalidCardCount(4))
    );
    assert_eq!(
        evaluate(&cards("As As Qs Js Ts")),
        Err(EvalError::DuplicateCard(Card(ACE, Suit::Spade)))
    );
}
