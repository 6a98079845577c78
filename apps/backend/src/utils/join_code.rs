//! Join codes for matches and tournaments.
//!
//! Six characters from an alphabet without look-alikes (no 0/O, 1/I/L), so a
//! code read aloud across the oche survives.

use rand::Rng;

pub const JOIN_CODE_LEN: usize = 6;

const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}

/// Upper-cases and trims user input; `None` when it cannot be a join code.
pub fn normalize_join_code(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    let valid = code.len() == JOIN_CODE_LEN && code.bytes().all(|b| ALPHABET.contains(&b));
    valid.then_some(code)
}
