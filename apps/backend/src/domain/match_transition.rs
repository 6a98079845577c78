use serde::Serialize;

use crate::domain::match_state::{MatchState, MatchStatus};
use crate::domain::roster::PlayerId;

/// The slice of match state that lifecycle notifications are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLifecycleView {
    pub version: i32,
    pub status: MatchStatus,
    pub turn: Option<PlayerId>,
    pub legs_played: u32,
    pub sets_completed: u32,
    pub last_leg: Option<LegRef>,
    pub last_set: Option<(PlayerId, u16)>,
    pub winner: Option<PlayerId>,
    pub abandoned_by: Option<PlayerId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegRef {
    pub winner: PlayerId,
    pub set_number: u16,
    pub leg_number: u16,
}

impl MatchLifecycleView {
    pub fn of(state: &MatchState, version: i32) -> Self {
        let finished_sets = state.sets.iter().filter(|s| s.winner.is_some());
        let last_set = finished_sets
            .clone()
            .last()
            .and_then(|s| s.winner.clone().map(|w| (w, s.set_number)));
        let last_leg = state
            .sets
            .iter()
            .flat_map(|s| s.legs.iter())
            .filter_map(|leg| {
                leg.winner.clone().map(|winner| LegRef {
                    winner,
                    set_number: leg.set_number,
                    leg_number: leg.leg_number,
                })
            })
            .last();

        Self {
            version,
            status: state.status,
            turn: state.current_player_id().cloned(),
            legs_played: state.legs_played,
            sets_completed: finished_sets.count() as u32,
            last_leg,
            last_set,
            winner: state.winner.clone(),
            abandoned_by: state.abandoned_by.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchTransition {
    /// Edge-triggered: the throw passed to a specific player.
    TurnBecame { player_id: PlayerId },

    /// Edge-triggered: Waiting -> Playing
    MatchStarted,

    LegWon {
        player_id: PlayerId,
        set_number: u16,
        leg_number: u16,
    },

    SetWon { player_id: PlayerId, set_number: u16 },

    /// Edge-triggered: Playing -> Finished by checkout
    MatchFinished { winner: Option<PlayerId> },

    /// Edge-triggered: any -> Finished by abandonment
    MatchAbandoned { by: PlayerId },
}

/// Derive match transitions from before/after lifecycle views.
pub fn derive_match_transitions(
    before: &MatchLifecycleView,
    after: &MatchLifecycleView,
) -> Vec<MatchTransition> {
    let mut transitions = Vec::new();

    if before.status == MatchStatus::Waiting && after.status == MatchStatus::Playing {
        transitions.push(MatchTransition::MatchStarted);
    }

    if after.legs_played > before.legs_played {
        if let Some(leg) = &after.last_leg {
            transitions.push(MatchTransition::LegWon {
                player_id: leg.winner.clone(),
                set_number: leg.set_number,
                leg_number: leg.leg_number,
            });
        }
    }

    if after.sets_completed > before.sets_completed {
        if let Some((player_id, set_number)) = &after.last_set {
            transitions.push(MatchTransition::SetWon {
                player_id: player_id.clone(),
                set_number: *set_number,
            });
        }
    }

    if before.status != MatchStatus::Finished && after.status == MatchStatus::Finished {
        match &after.abandoned_by {
            Some(by) => transitions.push(MatchTransition::MatchAbandoned { by: by.clone() }),
            None => transitions.push(MatchTransition::MatchFinished {
                winner: after.winner.clone(),
            }),
        }
    }

    // Turn changes are reported last so subscribers see the leg result first.
    if let Some(player_id) = &after.turn {
        if before.turn.as_ref() != Some(player_id) {
            transitions.push(MatchTransition::TurnBecame {
                player_id: player_id.clone(),
            });
        }
    }

    transitions
}
