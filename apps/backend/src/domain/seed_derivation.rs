//! RNG seed derivation for deterministic tournament draws.
//!
//! A tournament stores one base seed; every random decision derives its own
//! seed from it so reruns reproduce the same draw and home sides.

/// Seed for the first-round bracket shuffle.
pub fn derive_bracket_seed(tournament_seed: u64) -> u64 {
    tournament_seed.wrapping_mul(6364136223846793005).wrapping_add(1)
}

/// Seed for choosing who throws first in one pairing.
///
/// Unique per (tournament, round, slot).
pub fn derive_home_seed(tournament_seed: u64, round: u32, slot: u32) -> u64 {
    tournament_seed
        .wrapping_add(u64::from(round).wrapping_mul(1_000_000))
        .wrapping_add(u64::from(slot).wrapping_mul(1_000))
        .wrapping_add(2)
}
