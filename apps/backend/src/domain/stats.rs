//! Statistics folding: per-leg, per-set, per-match and lifetime records.
//!
//! Every record here is a plain accumulator. Counters add, highs take the
//! max and fastest checkout takes the min.

use serde::{Deserialize, Serialize};

use crate::domain::roster::PlayerId;
use crate::domain::turn::{ThrowTallies, TurnOutcome};

/// Non-bust turns at or above this score are "big fish" visits, maximums
/// included.
pub const BIG_FISH_THRESHOLD: u16 = 170;

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// Cumulative match-scoped statistics for one player.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub darts_thrown: u32,
    pub total_score: u32,
    /// Bust visits count here but add nothing to `total_score`.
    pub total_turns: u32,
    pub highest_turn: u16,
    pub tallies: ThrowTallies,
    pub over_100: u32,
    pub maximums: u32,
    pub big_fish: u32,
    pub checkout_attempts: u32,
    pub successful_checkouts: u32,
    pub highest_checkout: u16,
    pub fastest_checkout: Option<u32>,
    pub bull_finishes: u32,
    pub legs_won_total: u32,
}

impl PlayerStats {
    pub fn record_darts(&mut self, tallies: &ThrowTallies, count: u32) {
        self.darts_thrown += count;
        self.tallies.add(tallies);
    }

    /// Folds a closed visit. Ring tallies are recorded per dart, not here.
    pub fn record_visit(&mut self, visit: &TurnOutcome) {
        self.total_turns += 1;
        if visit.checkout_attempt {
            self.checkout_attempts += 1;
        }
        if visit.busted {
            return;
        }
        self.total_score += u32::from(visit.total);
        self.highest_turn = self.highest_turn.max(visit.total);
        if visit.over_100 {
            self.over_100 += 1;
        }
        if visit.maximum {
            self.maximums += 1;
        }
        if visit.total >= BIG_FISH_THRESHOLD {
            self.big_fish += 1;
        }
    }

    pub fn record_checkout(&mut self, checkout: u16, bull_finish: bool, leg_darts: u32) {
        self.successful_checkouts += 1;
        self.legs_won_total += 1;
        self.highest_checkout = self.highest_checkout.max(checkout);
        self.fastest_checkout = Some(
            self.fastest_checkout
                .map_or(leg_darts, |fastest| fastest.min(leg_darts)),
        );
        if bull_finish {
            self.bull_finishes += 1;
        }
    }

    /// Average per visit (three-dart average when visits are complete).
    pub fn average(&self) -> f64 {
        ratio(self.total_score, self.total_turns)
    }

    pub fn checkout_percentage(&self) -> f64 {
        ratio(self.successful_checkouts, self.checkout_attempts) * 100.0
    }
}

/// Per-player figures inside a single leg.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LegPlayerStats {
    pub darts_thrown: u32,
    pub turns: u32,
    pub total_score: u32,
    pub highest_turn: u16,
    pub checkout_attempts: u32,
    pub checkout_success: bool,
    pub checkout_score: Option<u16>,
}

impl LegPlayerStats {
    pub fn record_visit(&mut self, visit: &TurnOutcome) {
        self.turns += 1;
        if visit.checkout_attempt {
            self.checkout_attempts += 1;
        }
        if !visit.busted {
            self.total_score += u32::from(visit.total);
            self.highest_turn = self.highest_turn.max(visit.total);
        }
        if visit.checkout {
            self.checkout_success = true;
            self.checkout_score = Some(visit.score_before);
        }
    }

    pub fn average(&self) -> f64 {
        ratio(self.total_score, self.turns)
    }
}

/// Per-player rollup of the legs of one set.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetPlayerStats {
    pub legs_won: u32,
    pub darts_thrown: u32,
    pub total_score: u32,
    pub turns: u32,
}

impl SetPlayerStats {
    pub fn absorb_leg(&mut self, leg: &LegPlayerStats) {
        self.darts_thrown += leg.darts_thrown;
        self.total_score += leg.total_score;
        self.turns += leg.turns;
        if leg.checkout_success {
            self.legs_won += 1;
        }
    }

    pub fn average(&self) -> f64 {
        ratio(self.total_score, self.turns)
    }
}

/// One player's line in a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    pub won: bool,
    pub legs_won: u32,
    pub legs_lost: u32,
    pub sets_won: u32,
    pub maximums: u32,
    pub big_fish: u32,
    pub bull_finishes: u32,
    pub average: f64,
    pub highest_turn: u16,
    pub highest_checkout: u16,
    pub darts_thrown: u32,
}

/// Cross-match statistics stored on the user record.
///
/// `average_score` is a running mean of per-match averages, so a short match
/// weighs as much as a long one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub games_played: u32,
    pub games_won: u32,
    pub average_score: f64,
    pub highest_score: u16,
    pub highest_checkout: u16,
    pub total_180s: u32,
    pub total_darts: u32,
}

impl LifetimeStats {
    pub fn fold_result(&mut self, result: &PlayerResult) {
        let previous = f64::from(self.games_played);
        self.games_played += 1;
        self.average_score =
            (self.average_score * previous + result.average) / f64::from(self.games_played);
        if result.won {
            self.games_won += 1;
        }
        self.highest_score = self.highest_score.max(result.highest_turn);
        self.highest_checkout = self.highest_checkout.max(result.highest_checkout);
        self.total_180s += result.maximums;
        self.total_darts += result.darts_thrown;
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.games_won, self.games_played) * 100.0
    }
}
