//! Property tests for the turn evaluator (pure domain, no DB).
//!
//! Rules under test:
//! - There is no triple bull
//! - Reaching zero without a double last dart is a bust
//! - Overshooting the remaining score is a bust and leaves the score alone
//! - Non-bust turns subtract exactly the darts' total

use proptest::prelude::*;

use crate::domain::test_gens;
use crate::domain::test_prelude;
use crate::domain::throws::{compute_score, DartThrow, Ring, BULL_SEGMENT};
use crate::domain::turn::evaluate_turn;
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn triple_bull_is_invalid_throw() {
    match compute_score(BULL_SEGMENT, Ring::Triple) {
        Err(DomainError::Validation(ValidationKind::InvalidThrow, _)) => {}
        other => panic!("expected InvalidThrow, got {other:?}"),
    }
    assert!(DartThrow::new(BULL_SEGMENT, Ring::Triple).is_err());
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: finishing exactly on a non-double is always a bust.
    #[test]
    fn prop_exact_finish_without_double_busts(
        darts in prop::collection::vec(test_gens::non_double_dart(), 1..=3),
    ) {
        let total: u16 = darts.iter().map(DartThrow::score).sum();
        prop_assume!(total > 0);

        let outcome = evaluate_turn(total, &darts).unwrap();
        prop_assert!(outcome.busted);
        prop_assert!(!outcome.checkout);
        prop_assert_eq!(outcome.new_score, total);
    }

    /// Property: scoring more than what is left is always a bust.
    #[test]
    fn prop_overshoot_busts(darts in test_gens::visit(), shortfall in 1u16..=180) {
        let total: u16 = darts.iter().map(DartThrow::score).sum();
        prop_assume!(total > 0);
        let score_before = total.saturating_sub(shortfall);
        prop_assume!(score_before < total);

        let outcome = evaluate_turn(score_before, &darts).unwrap();
        prop_assert!(outcome.busted);
        prop_assert_eq!(outcome.new_score, score_before);
        prop_assert!(!outcome.maximum);
    }

    /// Property: a surviving turn subtracts the total and never leaves 1.
    #[test]
    fn prop_non_bust_subtracts_total(score_before in 2u16..=501, darts in test_gens::visit()) {
        let outcome = evaluate_turn(score_before, &darts).unwrap();
        if !outcome.busted {
            prop_assert_eq!(outcome.new_score, score_before - outcome.total);
            prop_assert_ne!(outcome.new_score, 1);
            if outcome.new_score == 0 {
                prop_assert!(outcome.checkout);
                prop_assert!(darts.last().is_some_and(DartThrow::is_double));
            }
        }
        prop_assert_eq!(outcome.checkout_attempt, score_before <= 170);
    }

    /// Property: ring tallies are recorded whatever the outcome.
    #[test]
    fn prop_tallies_count_every_scoring_dart(score_before in 2u16..=501, darts in test_gens::visit()) {
        let outcome = evaluate_turn(score_before, &darts).unwrap();
        let tallies = outcome.tallies;
        let scoring = darts.iter().filter(|d| !d.is_miss()).count() as u32;
        prop_assert_eq!(tallies.singles + tallies.doubles + tallies.triples, scoring);
    }
}
