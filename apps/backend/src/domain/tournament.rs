//! Tournament aggregate: roster, pairings per round, standings, progression.
//!
//! Matches are created by the service layer for the pairings this module
//! hands out; finished matches come back through [`Tournament::record_result`].

use serde::{Deserialize, Serialize};

use crate::domain::match_state::{MatchConfig, MatchSummary};
use crate::domain::pairing::{
    bracket_round_sizes, home_keeps_throw, next_slot, round_robin_rounds, shuffled_entrants,
};
use crate::domain::roster::{PlayerId, PlayerStatsMap};
use crate::domain::stats::PlayerResult;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

pub const ALLOWED_MAX_PLAYERS: [u8; 3] = [4, 8, 16];
pub const WIN_POINTS: u32 = 3;
pub const LOSS_WITH_LEG_POINTS: u32 = 1;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentMode {
    Bracket,
    Group,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Waiting,
    InProgress,
    Completed,
}

impl TournamentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Waiting => "waiting",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct BonusConfig {
    pub enable_180s: bool,
    pub enable_170s: bool,
    pub enable_bull_checkout: bool,
    pub points_180: u32,
    pub points_170: u32,
    pub points_bull_checkout: u32,
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            enable_180s: true,
            enable_170s: true,
            enable_bull_checkout: true,
            points_180: 2,
            points_170: 2,
            points_bull_checkout: 1,
        }
    }
}

impl BonusConfig {
    pub fn points_for(&self, result: &PlayerResult) -> u32 {
        let mut points = 0;
        if self.enable_180s {
            points += result.maximums * self.points_180;
        }
        if self.enable_170s {
            points += result.big_fish * self.points_170;
        }
        if self.enable_bull_checkout {
            points += result.bull_finishes * self.points_bull_checkout;
        }
        points
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub mode: TournamentMode,
    pub max_players: u8,
    pub starting_score: u16,
    pub legs_to_win: u8,
    pub sets_to_win: u8,
    #[serde(default)]
    pub bonus: BonusConfig,
    #[serde(default)]
    pub enable_third_place: bool,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !ALLOWED_MAX_PLAYERS.contains(&self.max_players) {
            return Err(DomainError::validation(
                ValidationKind::InvalidConfig,
                format!(
                    "max players must be one of {ALLOWED_MAX_PLAYERS:?}, got {}",
                    self.max_players
                ),
            ));
        }
        self.match_config().validate()
    }

    /// Configuration for every match the tournament creates.
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            starting_score: self.starting_score,
            legs_to_win: self.legs_to_win,
            sets_to_win: self.sets_to_win,
            max_players: 2,
            starter_order: None,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentPlayer {
    pub id: PlayerId,
    pub display_name: String,
    pub ready: bool,
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub points: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub legs_won: u32,
    pub legs_lost: u32,
    pub bonus_points: u32,
    pub maximums: u32,
    pub big_fish: u32,
    pub bull_finishes: u32,
}

impl Standing {
    pub fn leg_difference(&self) -> i64 {
        i64::from(self.legs_won) - i64::from(self.legs_lost)
    }

    fn fold(&mut self, result: &PlayerResult, won: bool, base: u32, bonus: u32) {
        self.points += base + bonus;
        if won {
            self.games_won += 1;
        } else {
            self.games_lost += 1;
        }
        self.legs_won += result.legs_won;
        self.legs_lost += result.legs_lost;
        self.bonus_points += bonus;
        self.maximums += result.maximums;
        self.big_fish += result.big_fish;
        self.bull_finishes += result.bull_finishes;
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingKind {
    Regular,
    ThirdPlace,
}

/// One slot of a round. `home` throws first in the match.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub round: u32,
    pub slot: u32,
    pub kind: PairingKind,
    pub home: Option<PlayerId>,
    pub away: Option<PlayerId>,
    pub match_id: Option<String>,
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub completed: bool,
}

impl Pairing {
    fn empty(round: u32, slot: u32, kind: PairingKind) -> Self {
        Self {
            round,
            slot,
            kind,
            home: None,
            away: None,
            match_id: None,
            winner: None,
            loser: None,
            completed: false,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.completed && self.match_id.is_none()
    }

    pub fn needs_match(&self) -> bool {
        !self.completed && self.match_id.is_none() && self.home.is_some() && self.away.is_some()
    }

    fn seat(&mut self, player: PlayerId, as_home: bool) {
        if as_home {
            self.home = Some(player);
        } else {
            self.away = Some(player);
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ResultOutcome {
    AlreadyRecorded,
    Recorded {
        round_completed: bool,
        tournament_completed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub host: PlayerId,
    pub config: TournamentConfig,
    pub status: TournamentStatus,
    pub seed: u64,
    pub players: Vec<TournamentPlayer>,
    pub current_round: u32,
    pub total_rounds: u32,
    pub pairings: Vec<Pairing>,
    pub standings: PlayerStatsMap<Standing>,
    pub active_matches: Vec<String>,
    pub completed_matches: Vec<String>,
    /// True while the current round is waiting for the host to start it.
    pub round_complete: bool,
    pub champion: Option<PlayerId>,
}

impl Tournament {
    pub fn new(
        host: PlayerId,
        host_name: impl Into<String>,
        config: TournamentConfig,
        seed: u64,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let standings = PlayerStatsMap::for_roster([&host]);
        Ok(Self {
            host: host.clone(),
            config,
            status: TournamentStatus::Waiting,
            seed,
            players: vec![TournamentPlayer {
                id: host,
                display_name: host_name.into(),
                ready: false,
            }],
            current_round: 0,
            total_rounds: 0,
            pairings: Vec::new(),
            standings,
            active_matches: Vec::new(),
            completed_matches: Vec::new(),
            round_complete: false,
            champion: None,
        })
    }

    pub fn is_player(&self, id: &PlayerId) -> bool {
        self.players.iter().any(|p| &p.id == id)
    }

    pub fn join(&mut self, id: PlayerId, display_name: impl Into<String>) -> Result<bool, DomainError> {
        if self.is_player(&id) {
            return Ok(false);
        }
        if self.status != TournamentStatus::Waiting {
            return Err(DomainError::invalid_transition(
                "players can only join before the tournament starts",
            ));
        }
        if self.players.len() >= usize::from(self.config.max_players) {
            return Err(DomainError::validation(
                ValidationKind::RosterFull,
                format!("tournament is full ({} players)", self.config.max_players),
            ));
        }
        self.standings.admit(&id);
        self.players.push(TournamentPlayer {
            id,
            display_name: display_name.into(),
            ready: false,
        });
        Ok(true)
    }

    pub fn set_ready(&mut self, id: &PlayerId, ready: bool) -> Result<(), DomainError> {
        if self.status == TournamentStatus::Completed {
            return Err(DomainError::invalid_transition("tournament is completed"));
        }
        let player = self
            .players
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::NotAPlayer,
                    format!("{id} is not in this tournament"),
                )
            })?;
        player.ready = ready;
        Ok(())
    }

    pub fn all_players_ready(&self) -> bool {
        self.players.iter().all(|p| p.ready)
    }

    /// `Waiting -> InProgress`: draws the pairings and opens round 1.
    pub fn start(&mut self, actor: &PlayerId) -> Result<Vec<Pairing>, DomainError> {
        self.ensure_host(actor)?;
        if self.status != TournamentStatus::Waiting {
            return Err(DomainError::invalid_transition(format!(
                "cannot start a tournament that is {}",
                self.status.as_str()
            )));
        }
        if self.players.len() < 2 {
            return Err(DomainError::validation(
                ValidationKind::NotEnoughPlayers,
                "a tournament needs at least 2 players",
            ));
        }
        if !self.all_players_ready() {
            return Err(DomainError::invalid_transition("not all players are ready"));
        }

        match self.config.mode {
            TournamentMode::Group => self.draw_group(),
            TournamentMode::Bracket => self.draw_bracket(),
        }
        self.status = TournamentStatus::InProgress;
        self.current_round = 1;
        self.prepare_round(1);
        self.settle_rounds();
        self.round_complete = false;
        Ok(self.pending_pairings())
    }

    /// Opens the next round once its players are ready.
    pub fn start_round(&mut self, actor: &PlayerId) -> Result<Vec<Pairing>, DomainError> {
        self.ensure_host(actor)?;
        if self.status != TournamentStatus::InProgress || !self.round_complete {
            return Err(DomainError::invalid_transition("no round is waiting to start"));
        }
        let pending = self.pending_pairings();
        let unready = pending
            .iter()
            .flat_map(|p| [&p.home, &p.away])
            .flatten()
            .any(|id| self.players.iter().any(|p| &p.id == id && !p.ready));
        if unready {
            return Err(DomainError::invalid_transition(
                "not all players in this round are ready",
            ));
        }
        self.round_complete = false;
        Ok(pending)
    }

    /// Pairings of the current round that still need a match.
    pub fn pending_pairings(&self) -> Vec<Pairing> {
        self.pairings
            .iter()
            .filter(|p| p.round == self.current_round && p.needs_match())
            .cloned()
            .collect()
    }

    pub fn attach_match(&mut self, round: u32, slot: u32, match_id: String) -> Result<(), DomainError> {
        let pairing = self
            .pairings
            .iter_mut()
            .find(|p| p.round == round && p.slot == slot)
            .ok_or_else(|| {
                DomainError::validation(
                    ValidationKind::Other("UnknownPairing".into()),
                    format!("no pairing at round {round} slot {slot}"),
                )
            })?;
        if !pairing.needs_match() {
            return Err(DomainError::invalid_transition(format!(
                "pairing at round {round} slot {slot} does not need a match"
            )));
        }
        pairing.match_id = Some(match_id.clone());
        self.active_matches.push(match_id);
        Ok(())
    }

    /// Folds a finished match into standings and advances the bracket or round.
    pub fn record_result(
        &mut self,
        match_id: &str,
        summary: &MatchSummary,
    ) -> Result<ResultOutcome, DomainError> {
        if self.completed_matches.iter().any(|m| m == match_id) {
            return Ok(ResultOutcome::AlreadyRecorded);
        }
        if self.status != TournamentStatus::InProgress {
            return Err(DomainError::invalid_transition(format!(
                "tournament is {}",
                self.status.as_str()
            )));
        }

        let index = self
            .pairings
            .iter()
            .position(|p| p.match_id.as_deref() == Some(match_id))
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Match,
                    format!("match {match_id} is not part of this tournament"),
                )
            })?;

        let (home, away) = match (&self.pairings[index].home, &self.pairings[index].away) {
            (Some(home), Some(away)) => (home.clone(), away.clone()),
            _ => return Err(DomainError::invalid_transition("pairing is missing a player")),
        };
        let winner = summary
            .winner
            .clone()
            .filter(|w| w == &home || w == &away)
            .ok_or_else(|| DomainError::invalid_transition("match has no winner from this pairing"))?;
        let loser = if winner == home { away } else { home };

        let empty_result = |id: &PlayerId| PlayerResult {
            player_id: id.clone(),
            won: false,
            legs_won: 0,
            legs_lost: 0,
            sets_won: 0,
            maximums: 0,
            big_fish: 0,
            bull_finishes: 0,
            average: 0.0,
            highest_turn: 0,
            highest_checkout: 0,
            darts_thrown: 0,
        };
        let winner_result = summary
            .result_for(&winner)
            .cloned()
            .unwrap_or_else(|| empty_result(&winner));
        let loser_result = summary
            .result_for(&loser)
            .cloned()
            .unwrap_or_else(|| empty_result(&loser));

        let winner_bonus = self.config.bonus.points_for(&winner_result);
        let loser_bonus = self.config.bonus.points_for(&loser_result);
        let loser_base = if loser_result.legs_won > 0 {
            LOSS_WITH_LEG_POINTS
        } else {
            0
        };
        self.standings
            .get_mut(&winner)?
            .fold(&winner_result, true, WIN_POINTS, winner_bonus);
        self.standings
            .get_mut(&loser)?
            .fold(&loser_result, false, loser_base, loser_bonus);

        let pairing = &mut self.pairings[index];
        pairing.winner = Some(winner.clone());
        pairing.loser = Some(loser.clone());
        pairing.completed = true;
        let (round, slot, kind) = (pairing.round, pairing.slot, pairing.kind);

        self.active_matches.retain(|m| m != match_id);
        self.completed_matches.push(match_id.to_string());

        if self.config.mode == TournamentMode::Bracket && kind == PairingKind::Regular {
            self.advance_bracket(round, slot, winner, Some(loser));
        }

        let before = self.current_round;
        self.settle_rounds();
        Ok(ResultOutcome::Recorded {
            round_completed: self.current_round != before
                || self.status == TournamentStatus::Completed,
            tournament_completed: self.status == TournamentStatus::Completed,
        })
    }

    /// Players ordered by points, then leg difference, then bonus points.
    pub fn ranked_standings(&self) -> Vec<(PlayerId, Standing)> {
        let mut ranked: Vec<(PlayerId, Standing)> = self
            .standings
            .iter()
            .map(|(id, s)| (id.clone(), s.clone()))
            .collect();
        ranked.sort_by(|(a_id, a), (b_id, b)| {
            b.points
                .cmp(&a.points)
                .then(b.leg_difference().cmp(&a.leg_difference()))
                .then(b.bonus_points.cmp(&a.bonus_points))
                .then(a_id.cmp(b_id))
        });
        ranked
    }

    pub fn check_integrity(&self) -> Result<(), DomainError> {
        self.standings.check_keys(self.players.iter().map(|p| &p.id))
    }

    fn ensure_host(&self, actor: &PlayerId) -> Result<(), DomainError> {
        if &self.host == actor {
            Ok(())
        } else {
            Err(DomainError::validation(
                ValidationKind::NotHost,
                "only the tournament host can do that",
            ))
        }
    }

    fn draw_group(&mut self) {
        let rounds = round_robin_rounds(self.players.len());
        self.total_rounds = rounds.len() as u32;
        self.pairings = rounds
            .iter()
            .enumerate()
            .flat_map(|(r, pairs)| {
                pairs.iter().enumerate().map(move |(s, &(a, b))| (r, s, a, b))
            })
            .map(|(r, s, a, b)| {
                let mut pairing = Pairing::empty(r as u32 + 1, s as u32 + 1, PairingKind::Regular);
                pairing.home = Some(self.players[a].id.clone());
                pairing.away = Some(self.players[b].id.clone());
                pairing
            })
            .collect();
    }

    fn draw_bracket(&mut self) {
        let sizes = bracket_round_sizes(self.players.len());
        self.total_rounds = sizes.len() as u32;
        let mut pairings: Vec<Pairing> = sizes
            .iter()
            .enumerate()
            .flat_map(|(r, &size)| {
                (1..=size as u32).map(move |slot| Pairing::empty(r as u32 + 1, slot, PairingKind::Regular))
            })
            .collect();

        let entrants = shuffled_entrants(self.players.len(), self.seed);
        for (i, chunk) in entrants.chunks(2).enumerate() {
            let pairing = &mut pairings[i];
            pairing.home = chunk.first().map(|&p| self.players[p].id.clone());
            pairing.away = chunk.get(1).map(|&p| self.players[p].id.clone());
        }

        if self.config.enable_third_place && self.total_rounds >= 2 {
            pairings.push(Pairing::empty(self.total_rounds, 2, PairingKind::ThirdPlace));
        }
        self.pairings = pairings;
    }

    /// Flips home sides by seed, and settles byes and empty slots.
    fn prepare_round(&mut self, round: u32) {
        let seed = self.seed;
        let mut byes = Vec::new();
        for pairing in self.pairings.iter_mut().filter(|p| p.round == round && !p.completed) {
            if pairing.home.is_some() && pairing.away.is_some() {
                if !home_keeps_throw(seed, round, pairing.slot) {
                    std::mem::swap(&mut pairing.home, &mut pairing.away);
                }
                continue;
            }
            pairing.completed = true;
            if let Some(only) = pairing.home.clone().or_else(|| pairing.away.clone()) {
                pairing.winner = Some(only.clone());
                byes.push((pairing.slot, pairing.kind, only));
            }
        }
        if self.config.mode == TournamentMode::Bracket {
            for (slot, kind, winner) in byes {
                if kind == PairingKind::Regular {
                    self.advance_bracket(round, slot, winner, None);
                }
            }
        }
    }

    fn advance_bracket(&mut self, round: u32, slot: u32, winner: PlayerId, loser: Option<PlayerId>) {
        let total = self.total_rounds;
        if round >= total {
            return;
        }
        let (next, as_home) = next_slot(slot);
        if let Some(target) = self
            .pairings
            .iter_mut()
            .find(|p| p.round == round + 1 && p.slot == next && p.kind == PairingKind::Regular)
        {
            target.seat(winner, as_home);
        }

        let is_semi_final = round + 1 == total;
        if let (true, Some(loser)) = (is_semi_final, loser) {
            if let Some(third) = self
                .pairings
                .iter_mut()
                .find(|p| p.round == total && p.kind == PairingKind::ThirdPlace)
            {
                third.seat(loser, as_home);
            }
        }
    }

    fn round_finished(&self, round: u32) -> bool {
        self.pairings
            .iter()
            .filter(|p| p.round == round)
            .all(|p| p.completed)
    }

    fn settle_rounds(&mut self) {
        while self.status == TournamentStatus::InProgress && self.round_finished(self.current_round) {
            if self.current_round >= self.total_rounds {
                self.status = TournamentStatus::Completed;
                self.round_complete = true;
                self.champion = self.decide_champion();
                return;
            }
            self.current_round += 1;
            for player in &mut self.players {
                player.ready = false;
            }
            self.round_complete = true;
            self.prepare_round(self.current_round);
        }
    }

    fn decide_champion(&self) -> Option<PlayerId> {
        match self.config.mode {
            TournamentMode::Bracket => self
                .pairings
                .iter()
                .find(|p| {
                    p.round == self.total_rounds && p.slot == 1 && p.kind == PairingKind::Regular
                })
                .and_then(|p| p.winner.clone()),
            TournamentMode::Group => self.ranked_standings().into_iter().next().map(|(id, _)| id),
        }
    }
}
