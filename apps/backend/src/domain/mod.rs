//! Domain layer: pure scoring, match and tournament logic.

pub mod checkout;
pub mod match_state;
pub mod match_transition;
pub mod pairing;
pub mod roster;
pub mod rotation;
pub mod seed_derivation;
pub mod stats;
pub mod throws;
pub mod tournament;
pub mod turn;

#[cfg(test)]
mod tests_props_turn;
#[cfg(test)]
mod tests_tournament;

// Re-exports for ergonomics
pub use checkout::{is_bogey, suggest_checkout};
pub use match_state::{
    JoinOutcome, JoinRole, MatchConfig, MatchState, MatchStatus, MatchSummary, TurnRecord,
};
pub use match_transition::{derive_match_transitions, MatchLifecycleView, MatchTransition};
pub use roster::{PlayerId, PlayerStatsMap};
pub use stats::{LifetimeStats, PlayerResult, PlayerStats};
pub use throws::{DartThrow, Ring};
pub use tournament::{ResultOutcome, Tournament, TournamentConfig, TournamentMode, TournamentStatus};
pub use turn::{evaluate_turn, TurnOutcome};
