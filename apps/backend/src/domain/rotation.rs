//! Leg-starter rotation.
//!
//! The order is a permutation of roster indices fixed when the match starts.
//! Leg `l` (1-based) inside a set is opened by `order[(l - 1) % n]`. The
//! first leg of set `s` instead goes to `order[(s - 1) % n]`, so set openers
//! alternate even when every set is a single leg.

use crate::errors::domain::{DomainError, ValidationKind};

pub fn identity_order(players: usize) -> Vec<usize> {
    (0..players).collect()
}

/// Accepts only a permutation of `0..players`.
pub fn validate_order(order: &[usize], players: usize) -> Result<(), DomainError> {
    let mut seen = vec![false; players];
    if order.len() != players {
        return Err(invalid(format!(
            "starter order has {} entries for {players} players",
            order.len()
        )));
    }
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            Some(_) => return Err(invalid(format!("player {index} appears twice"))),
            None => return Err(invalid(format!("player {index} is not on the roster"))),
        }
    }
    Ok(())
}

pub fn leg_starter(order: &[usize], set_number: u16, leg_number: u16) -> usize {
    if order.is_empty() {
        return 0;
    }
    let position = if leg_number <= 1 { set_number } else { leg_number };
    order[usize::from(position.saturating_sub(1)) % order.len()]
}

fn invalid(detail: String) -> DomainError {
    DomainError::validation(ValidationKind::InvalidConfig, detail)
}
