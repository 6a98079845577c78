//! Transactional operations the HTTP adapter passes requests through to.

pub mod matches;
pub mod tournaments;
pub mod users;

pub use matches::{
    AbandonOutcome, CreateMatch, MatchMutation, MatchService, ThrowOutcome, TournamentSync,
};
pub use tournaments::{RoundStarted, TournamentService};
