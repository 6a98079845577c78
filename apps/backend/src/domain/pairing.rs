//! Pairing generators for group (round-robin) and bracket (knockout) play.
//!
//! Everything works on roster indices; the tournament maps them to players.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::seed_derivation::{derive_bracket_seed, derive_home_seed};

/// Round-robin schedule using the circle method.
///
/// Index 0 stays fixed while the rest rotate one place per round. An odd
/// roster gets a synthetic bye; pairings against it are dropped. Yields
/// `n - 1` rounds for even `n` and `n` rounds for odd `n`.
pub fn round_robin_rounds(players: usize) -> Vec<Vec<(usize, usize)>> {
    if players < 2 {
        return Vec::new();
    }
    let mut circle: Vec<Option<usize>> = (0..players).map(Some).collect();
    if players % 2 == 1 {
        circle.push(None);
    }
    let size = circle.len();

    let mut rounds = Vec::with_capacity(size - 1);
    for _ in 0..size - 1 {
        let round = (0..size / 2)
            .filter_map(|i| match (circle[i], circle[size - 1 - i]) {
                (Some(a), Some(b)) => Some((a, b)),
                _ => None,
            })
            .collect();
        rounds.push(round);
        circle[1..].rotate_right(1);
    }
    rounds
}

/// Seeded shuffle of roster indices for the first bracket round.
pub fn shuffled_entrants(players: usize, tournament_seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..players).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(derive_bracket_seed(tournament_seed));
    order.shuffle(&mut rng);
    order
}

/// Number of slots in each bracket round, first round first.
///
/// Round 1 pairs entrants two by two; every later round has one slot per two
/// slots of the previous round, rounded up. A slot fed by a single winner is a
/// bye.
pub fn bracket_round_sizes(players: usize) -> Vec<usize> {
    if players < 2 {
        return Vec::new();
    }
    let mut sizes = vec![players.div_ceil(2)];
    while let Some(&last) = sizes.last() {
        if last <= 1 {
            break;
        }
        sizes.push(last.div_ceil(2));
    }
    sizes
}

/// Where the winner of 1-based `slot` plays next: slot `ceil(slot / 2)`, as
/// the home side when `slot` is odd.
pub fn next_slot(slot: u32) -> (u32, bool) {
    (slot.div_ceil(2), slot % 2 == 1)
}

/// Deterministic coin flip for whether the listed home player keeps the throw.
pub fn home_keeps_throw(tournament_seed: u64, round: u32, slot: u32) -> bool {
    let mut rng = ChaCha8Rng::seed_from_u64(derive_home_seed(tournament_seed, round, slot));
    rng.random_bool(0.5)
}
