//! Match aggregate and its state machine.
//!
//! `Waiting -> Playing -> Finished`, never backwards. Every transition is a
//! synchronous method on [`MatchState`]; persistence wraps them in a
//! transaction and owns nothing else.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::checkout::suggest_checkout;
use crate::domain::roster::{PlayerId, PlayerStatsMap};
use crate::domain::rotation::{identity_order, leg_starter, validate_order};
use crate::domain::stats::{LegPlayerStats, PlayerResult, PlayerStats, SetPlayerStats};
use crate::domain::throws::DartThrow;
use crate::domain::turn::{evaluate_turn, ThrowTallies, MAX_DARTS_PER_TURN};
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

pub const DEFAULT_STARTING_SCORE: u16 = 501;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub starting_score: u16,
    pub legs_to_win: u8,
    pub sets_to_win: u8,
    pub max_players: u8,
    /// Explicit leg-starter order (roster indices). Roster order when absent.
    #[serde(default)]
    pub starter_order: Option<Vec<usize>>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_score: DEFAULT_STARTING_SCORE,
            legs_to_win: 3,
            sets_to_win: 1,
            max_players: 2,
            starter_order: None,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |detail: &str| {
            Err(DomainError::validation(
                ValidationKind::InvalidConfig,
                detail.to_string(),
            ))
        };
        if self.starting_score < 2 {
            return invalid("starting score must be at least 2");
        }
        if self.legs_to_win == 0 {
            return invalid("legs to win must be at least 1");
        }
        if self.sets_to_win == 0 {
            return invalid("sets to win must be at least 1");
        }
        if self.max_players < 2 {
            return invalid("a match needs room for at least 2 players");
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Waiting,
    Playing,
    Finished,
}

impl MatchStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Waiting => "waiting",
            MatchStatus::Playing => "playing",
            MatchStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(MatchStatus::Waiting),
            "playing" => Some(MatchStatus::Playing),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRole {
    Player,
    Spectator,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchPlayer {
    pub id: PlayerId,
    pub display_name: String,
    pub current_score: u16,
    /// Legs won in the current set.
    pub legs_won: u8,
    pub sets_won: u8,
}

/// Darts of the visit in progress, for partial-turn recording.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub player_index: usize,
    pub score_at_start: u16,
    pub darts: Vec<DartThrow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegRecord {
    pub set_number: u16,
    pub leg_number: u16,
    pub starter: PlayerId,
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub winner: Option<PlayerId>,
    pub players: PlayerStatsMap<LegPlayerStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub set_number: u16,
    pub winner: Option<PlayerId>,
    pub players: PlayerStatsMap<SetPlayerStats>,
    pub legs: Vec<LegRecord>,
}

/// One submission of darts, as appended to the turn history.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn_number: u32,
    pub player_id: PlayerId,
    pub set_number: u16,
    pub leg_number: u16,
    pub darts: Vec<DartThrow>,
    pub visit_total: u16,
    pub remaining: u16,
    pub busted: bool,
    pub checkout: bool,
    pub visit_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub winner: Option<PlayerId>,
    pub abandoned_by: Option<PlayerId>,
    pub results: Vec<PlayerResult>,
}

impl MatchSummary {
    pub fn result_for(&self, id: &PlayerId) -> Option<&PlayerResult> {
        self.results.iter().find(|r| &r.player_id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub config: MatchConfig,
    pub host: PlayerId,
    #[serde(default)]
    pub tournament_id: Option<String>,
    pub status: MatchStatus,
    pub players: Vec<MatchPlayer>,
    #[serde(default)]
    pub spectators: Vec<PlayerId>,
    #[serde(default)]
    pub starter_order: Vec<usize>,
    pub current_set: u16,
    pub current_leg: u16,
    pub legs_played: u32,
    pub current_player: usize,
    pub visit: Option<Visit>,
    pub turns_recorded: u32,
    pub stats: PlayerStatsMap<PlayerStats>,
    #[serde(default)]
    pub sets: Vec<SetRecord>,
    pub winner: Option<PlayerId>,
    pub abandoned_by: Option<PlayerId>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
}

fn corrupt(detail: &str) -> DomainError {
    DomainError::infra(InfraErrorKind::DataCorruption, detail.to_string())
}

impl MatchState {
    /// A new match in `Waiting` with the host as its first player.
    pub fn new(
        config: MatchConfig,
        host: PlayerId,
        host_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let starting_score = config.starting_score;
        Ok(Self {
            config,
            host: host.clone(),
            tournament_id: None,
            status: MatchStatus::Waiting,
            players: vec![MatchPlayer {
                id: host,
                display_name: host_name.into(),
                current_score: starting_score,
                legs_won: 0,
                sets_won: 0,
            }],
            spectators: Vec::new(),
            starter_order: Vec::new(),
            current_set: 0,
            current_leg: 0,
            legs_played: 0,
            current_player: 0,
            visit: None,
            turns_recorded: 0,
            stats: PlayerStatsMap::default(),
            sets: Vec::new(),
            winner: None,
            abandoned_by: None,
            started_at: None,
            finished_at: None,
        })
    }

    /// A match whose host arbitrates without playing, such as a tournament
    /// pairing. Players are seated in the given order.
    pub fn hosted(
        config: MatchConfig,
        host: PlayerId,
        players: Vec<(PlayerId, String)>,
    ) -> Result<Self, DomainError> {
        let mut iter = players.into_iter();
        let Some((first, first_name)) = iter.next() else {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                "a match needs at least one seated player",
            ));
        };
        let mut state = Self::new(config, first, first_name)?;
        state.host = host;
        for (id, name) in iter {
            if state.join(id.clone(), name, JoinRole::Player)? == JoinOutcome::AlreadyJoined {
                return Err(DomainError::validation(
                    ValidationKind::InvalidConfig,
                    format!("{id} is seated twice"),
                ));
            }
        }
        Ok(state)
    }

    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn is_player(&self, id: &PlayerId) -> bool {
        self.player_index(id).is_some()
    }

    pub fn is_host(&self, id: &PlayerId) -> bool {
        &self.host == id
    }

    /// The player expected to throw, while the match is being played.
    pub fn current_player_id(&self) -> Option<&PlayerId> {
        match self.status {
            MatchStatus::Playing => self.players.get(self.current_player).map(|p| &p.id),
            _ => None,
        }
    }

    /// Darts already thrown in the visit in progress (0..=2).
    pub fn current_turn_darts(&self) -> usize {
        self.visit.as_ref().map_or(0, |v| v.darts.len())
    }

    /// Suggested finish for the current player with the darts they have left.
    pub fn checkout_hint(&self) -> Vec<DartThrow> {
        let Some(player) = self
            .current_player_id()
            .and_then(|_| self.players.get(self.current_player))
        else {
            return Vec::new();
        };
        let darts_left = MAX_DARTS_PER_TURN - self.current_turn_darts();
        let path = suggest_checkout(player.current_score);
        if path.len() <= darts_left {
            path
        } else {
            Vec::new()
        }
    }

    pub fn join(
        &mut self,
        id: PlayerId,
        display_name: impl Into<String>,
        role: JoinRole,
    ) -> Result<JoinOutcome, DomainError> {
        if self.is_player(&id) || self.spectators.contains(&id) {
            return Ok(JoinOutcome::AlreadyJoined);
        }
        match role {
            JoinRole::Player => {
                if self.status != MatchStatus::Waiting {
                    return Err(DomainError::invalid_transition(
                        "players can only join before the match starts",
                    ));
                }
                if self.players.len() >= usize::from(self.config.max_players) {
                    return Err(DomainError::validation(
                        ValidationKind::RosterFull,
                        format!("match is full ({} players)", self.config.max_players),
                    ));
                }
                self.players.push(MatchPlayer {
                    id,
                    display_name: display_name.into(),
                    current_score: self.config.starting_score,
                    legs_won: 0,
                    sets_won: 0,
                });
            }
            JoinRole::Spectator => {
                if self.status == MatchStatus::Finished {
                    return Err(DomainError::invalid_transition("match is finished"));
                }
                self.spectators.push(id);
            }
        }
        Ok(JoinOutcome::Joined)
    }

    /// `Waiting -> Playing`. Fixes the starter rotation and opens set 1, leg 1.
    pub fn start(&mut self, actor: &PlayerId, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.status != MatchStatus::Waiting {
            return Err(DomainError::invalid_transition(format!(
                "cannot start a match that is {}",
                self.status.as_str()
            )));
        }
        if !self.is_host(actor) {
            return Err(DomainError::validation(
                ValidationKind::NotHost,
                "only the host can start the match",
            ));
        }
        if self.players.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                "a match needs at least 2 players",
            ));
        }

        let order = match &self.config.starter_order {
            Some(order) => {
                validate_order(order, self.players.len())?;
                order.clone()
            }
            None => identity_order(self.players.len()),
        };

        self.starter_order = order;
        self.status = MatchStatus::Playing;
        self.started_at = Some(now);
        self.current_set = 1;
        self.current_leg = 1;
        self.legs_played = 0;
        self.stats = PlayerStatsMap::for_roster(self.players.iter().map(|p| &p.id));
        self.sets = vec![self.open_set_record(1)];
        self.open_leg(now)
    }

    /// Applies darts for the player whose turn it is.
    ///
    /// The host may submit on behalf of the current player. Partial visits
    /// are accumulated until the visit busts, checks out or reaches 3 darts.
    pub fn apply_throws(
        &mut self,
        actor: &PlayerId,
        darts: &[DartThrow],
        now: OffsetDateTime,
    ) -> Result<TurnRecord, DomainError> {
        self.ensure_playing()?;

        let index = self.current_player;
        let player_id = self
            .players
            .get(index)
            .map(|p| p.id.clone())
            .ok_or_else(|| corrupt("current player index outside roster"))?;
        if actor != &player_id && !self.is_host(actor) {
            return Err(DomainError::validation(
                ValidationKind::NotYourTurn,
                format!("it is {player_id}'s turn"),
            ));
        }
        if darts.is_empty() {
            return Err(DomainError::invalid_throw("no darts submitted"));
        }

        let (score_at_start, mut combined) = match &self.visit {
            Some(visit) => (visit.score_at_start, visit.darts.clone()),
            None => (self.players[index].current_score, Vec::new()),
        };
        if combined.len() + darts.len() > MAX_DARTS_PER_TURN {
            return Err(DomainError::invalid_throw(format!(
                "visit already has {} darts, cannot add {}",
                combined.len(),
                darts.len()
            )));
        }
        combined.extend_from_slice(darts);
        let outcome = evaluate_turn(score_at_start, &combined)?;

        let submitted = darts.len() as u32;
        let tallies = ThrowTallies::of(darts);
        self.stats
            .get_mut(&player_id)?
            .record_darts(&tallies, submitted);
        self.current_leg_mut()?
            .players
            .get_mut(&player_id)?
            .darts_thrown += submitted;

        let visit_closed =
            outcome.busted || outcome.checkout || combined.len() == MAX_DARTS_PER_TURN;
        if visit_closed {
            self.stats.get_mut(&player_id)?.record_visit(&outcome);
            self.current_leg_mut()?
                .players
                .get_mut(&player_id)?
                .record_visit(&outcome);
            self.visit = None;
        } else {
            self.visit = Some(Visit {
                player_index: index,
                score_at_start,
                darts: combined.clone(),
            });
        }

        self.turns_recorded += 1;
        let record = TurnRecord {
            turn_number: self.turns_recorded,
            player_id: player_id.clone(),
            set_number: self.current_set,
            leg_number: self.current_leg,
            darts: darts.to_vec(),
            visit_total: outcome.total,
            remaining: outcome.new_score,
            busted: outcome.busted,
            checkout: outcome.checkout,
            visit_closed,
        };

        self.players[index].current_score = outcome.new_score;
        if outcome.checkout {
            let leg_darts = self
                .current_leg_mut()?
                .players
                .get(&player_id)?
                .darts_thrown;
            let bull_finish = combined.last().is_some_and(DartThrow::is_bull);
            self.stats
                .get_mut(&player_id)?
                .record_checkout(score_at_start, bull_finish, leg_darts);
            self.win_leg(index, now)?;
        } else if visit_closed {
            self.current_player = (index + 1) % self.players.len();
        }

        Ok(record)
    }

    /// Ends a match early. The first other player on the roster is the winner.
    ///
    /// Only rostered players may abandon; an arbiter who does not play has
    /// nobody to concede for and gets `NotAPlayer`.
    pub fn abandon(&mut self, actor: &PlayerId, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.status == MatchStatus::Finished {
            return Err(DomainError::invalid_transition("match is already finished"));
        }
        if !self.is_player(actor) {
            return Err(DomainError::validation(
                ValidationKind::NotAPlayer,
                format!("{actor} is not in this match"),
            ));
        }
        self.winner = self
            .players
            .iter()
            .find(|p| &p.id != actor)
            .map(|p| p.id.clone());
        self.abandoned_by = Some(actor.clone());
        self.status = MatchStatus::Finished;
        self.finished_at = Some(now);
        self.visit = None;
        if let Some(leg) = self.sets.last_mut().and_then(|s| s.legs.last_mut()) {
            if leg.ended_at.is_none() {
                leg.ended_at = Some(now);
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> MatchSummary {
        let legs_total: u32 = self
            .players
            .iter()
            .filter_map(|p| self.stats.get(&p.id).ok())
            .map(|s| s.legs_won_total)
            .sum();

        let results = self
            .players
            .iter()
            .map(|player| {
                let stats = self.stats.get(&player.id).cloned().unwrap_or_default();
                PlayerResult {
                    player_id: player.id.clone(),
                    won: self.winner.as_ref() == Some(&player.id),
                    legs_won: stats.legs_won_total,
                    legs_lost: legs_total - stats.legs_won_total,
                    sets_won: u32::from(player.sets_won),
                    maximums: stats.maximums,
                    big_fish: stats.big_fish,
                    bull_finishes: stats.bull_finishes,
                    average: stats.average(),
                    highest_turn: stats.highest_turn,
                    highest_checkout: stats.highest_checkout,
                    darts_thrown: stats.darts_thrown,
                }
            })
            .collect();

        MatchSummary {
            winner: self.winner.clone(),
            abandoned_by: self.abandoned_by.clone(),
            results,
        }
    }

    /// Structural checks for a document read back from storage.
    pub fn check_integrity(&self) -> Result<(), DomainError> {
        if self.players.is_empty() {
            return Err(corrupt("match has no players"));
        }
        if self.status == MatchStatus::Waiting {
            return Ok(());
        }
        self.stats.check_keys(self.players.iter().map(|p| &p.id))?;
        if self.current_player >= self.players.len() {
            return Err(corrupt("current player index outside roster"));
        }
        if self.status == MatchStatus::Playing && self.sets.is_empty() {
            return Err(corrupt("playing match has no open set"));
        }
        Ok(())
    }

    fn ensure_playing(&self) -> Result<(), DomainError> {
        match self.status {
            MatchStatus::Playing => Ok(()),
            MatchStatus::Waiting => Err(DomainError::invalid_transition(
                "match has not started",
            )),
            MatchStatus::Finished => Err(DomainError::invalid_transition("match is finished")),
        }
    }

    fn win_leg(&mut self, index: usize, now: OffsetDateTime) -> Result<(), DomainError> {
        let winner_id = self.players[index].id.clone();
        let leg_players = {
            let leg = self.current_leg_mut()?;
            leg.winner = Some(winner_id.clone());
            leg.ended_at = Some(now);
            leg.players.clone()
        };
        {
            let set = self.current_set_mut()?;
            for (id, leg_stats) in leg_players.iter() {
                set.players.get_mut(id)?.absorb_leg(leg_stats);
            }
        }
        self.legs_played += 1;
        self.players[index].legs_won += 1;

        if self.players[index].legs_won >= self.config.legs_to_win {
            self.players[index].sets_won += 1;
            self.current_set_mut()?.winner = Some(winner_id.clone());
            for player in &mut self.players {
                player.legs_won = 0;
            }

            if self.players[index].sets_won >= self.config.sets_to_win {
                self.status = MatchStatus::Finished;
                self.winner = Some(winner_id);
                self.finished_at = Some(now);
                self.visit = None;
                return Ok(());
            }

            self.current_set += 1;
            self.current_leg = 1;
            let set = self.open_set_record(self.current_set);
            self.sets.push(set);
        } else {
            self.current_leg += 1;
        }
        self.open_leg(now)
    }

    fn open_set_record(&self, set_number: u16) -> SetRecord {
        SetRecord {
            set_number,
            winner: None,
            players: PlayerStatsMap::for_roster(self.players.iter().map(|p| &p.id)),
            legs: Vec::new(),
        }
    }

    fn open_leg(&mut self, now: OffsetDateTime) -> Result<(), DomainError> {
        let starter = leg_starter(&self.starter_order, self.current_set, self.current_leg);
        let starter_id = self
            .players
            .get(starter)
            .map(|p| p.id.clone())
            .ok_or_else(|| corrupt("starter index outside roster"))?;
        for player in &mut self.players {
            player.current_score = self.config.starting_score;
        }
        self.current_player = starter;
        self.visit = None;

        let leg = LegRecord {
            set_number: self.current_set,
            leg_number: self.current_leg,
            starter: starter_id,
            started_at: now,
            ended_at: None,
            winner: None,
            players: PlayerStatsMap::for_roster(self.players.iter().map(|p| &p.id)),
        };
        self.current_set_mut()?.legs.push(leg);
        Ok(())
    }

    fn current_set_mut(&mut self) -> Result<&mut SetRecord, DomainError> {
        self.sets
            .last_mut()
            .ok_or_else(|| corrupt("no open set"))
    }

    fn current_leg_mut(&mut self) -> Result<&mut LegRecord, DomainError> {
        self.current_set_mut()?
            .legs
            .last_mut()
            .ok_or_else(|| corrupt("no open leg"))
    }
}
