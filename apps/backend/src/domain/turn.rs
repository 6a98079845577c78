//! Turn evaluation: resolves up to three darts against a remaining score.

use serde::{Deserialize, Serialize};

use crate::domain::throws::{DartThrow, Ring};
use crate::errors::domain::DomainError;

pub const MAX_DARTS_PER_TURN: usize = 3;
/// A turn starting at or below this score counts as a checkout attempt.
pub const CHECKOUT_ATTEMPT_CEILING: u16 = 170;
pub const MAXIMUM_TURN: u16 = 180;
/// Turns scoring more than this count as "ton plus" visits.
pub const OVER_100_THRESHOLD: u16 = 100;

/// Per-ring hit counts. A bull is counted on any ring.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ThrowTallies {
    pub singles: u32,
    pub doubles: u32,
    pub triples: u32,
    pub bulls: u32,
}

impl ThrowTallies {
    pub fn of(darts: &[DartThrow]) -> Self {
        let mut tallies = Self::default();
        for dart in darts {
            tallies.record(dart);
        }
        tallies
    }

    pub fn record(&mut self, dart: &DartThrow) {
        if dart.is_miss() {
            return;
        }
        match dart.ring() {
            Ring::Single => self.singles += 1,
            Ring::Double => self.doubles += 1,
            Ring::Triple => self.triples += 1,
        }
        if dart.is_bull() {
            self.bulls += 1;
        }
    }

    pub fn add(&mut self, other: &ThrowTallies) {
        self.singles += other.singles;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.bulls += other.bulls;
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub score_before: u16,
    pub total: u16,
    pub new_score: u16,
    pub busted: bool,
    pub checkout: bool,
    pub checkout_attempt: bool,
    /// Set only on non-bust turns.
    pub over_100: bool,
    /// Set only on non-bust turns.
    pub maximum: bool,
    pub tallies: ThrowTallies,
}

/// Resolve a turn of 1..=3 darts starting from `score_before`.
///
/// A turn busts when it would leave the player below zero, on exactly one, or
/// on zero without the last dart being a double. A bust leaves the score
/// untouched; the ring tallies are still reported since the darts were thrown.
pub fn evaluate_turn(score_before: u16, darts: &[DartThrow]) -> Result<TurnOutcome, DomainError> {
    if darts.is_empty() {
        return Err(DomainError::invalid_throw("A turn needs at least one dart"));
    }
    if darts.len() > MAX_DARTS_PER_TURN {
        return Err(DomainError::invalid_throw(format!(
            "A turn has at most {MAX_DARTS_PER_TURN} darts, got {}",
            darts.len()
        )));
    }

    let total: u16 = darts.iter().map(DartThrow::score).sum();
    let candidate = i32::from(score_before) - i32::from(total);
    let finished_on_double = darts.last().is_some_and(DartThrow::is_double);

    let checkout = candidate == 0 && finished_on_double;
    let busted = candidate < 0 || candidate == 1 || (candidate == 0 && !finished_on_double);

    let new_score = if busted {
        score_before
    } else {
        score_before - total
    };

    Ok(TurnOutcome {
        score_before,
        total,
        new_score,
        busted,
        checkout,
        checkout_attempt: score_before <= CHECKOUT_ATTEMPT_CEILING,
        over_100: !busted && total > OVER_100_THRESHOLD,
        maximum: !busted && total == MAXIMUM_TURN,
        tallies: ThrowTallies::of(darts),
    })
}
