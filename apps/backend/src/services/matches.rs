//! Transactional match operations.
//!
//! Every mutation runs load -> pure transition -> version-checked save inside
//! one transaction, retried on optimistic-lock conflicts. Subscribers hear
//! about a change only after it has committed.

use std::sync::Arc;

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::engine::GAME_TYPES;
use crate::db::txn::{with_txn, with_txn_retry};
use crate::domain::match_state::{
    JoinOutcome, JoinRole, MatchConfig, MatchState, MatchStatus, TurnRecord,
};
use crate::domain::match_transition::{
    derive_match_transitions, MatchLifecycleView, MatchTransition,
};
use crate::domain::roster::PlayerId;
use crate::domain::throws::DartThrow;
use crate::domain::tournament::ResultOutcome;
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;
use crate::realtime::{MatchSubscription, MatchUpdate};
use crate::repos::matches::{self as matches_repo, StoredMatch};
use crate::repos::turns as turns_repo;
use crate::services::tournaments::TournamentService;
use crate::services::users;
use crate::state::app_state::AppState;
use crate::utils::join_code::{generate_join_code, normalize_join_code};

const JOIN_CODE_ATTEMPTS: u32 = 5;

/// Parameters for a new casual match.
#[derive(Debug, Clone)]
pub struct CreateMatch {
    pub host: PlayerId,
    pub host_name: String,
    /// Engine default when absent.
    pub starting_score: Option<u16>,
    pub legs_to_win: u8,
    pub sets_to_win: u8,
    /// Engine default when absent.
    pub max_players: Option<u8>,
    pub starter_order: Option<Vec<usize>>,
}

impl CreateMatch {
    pub fn new(host: PlayerId, host_name: impl Into<String>) -> Self {
        let defaults = MatchConfig::default();
        Self {
            host,
            host_name: host_name.into(),
            starting_score: None,
            legs_to_win: defaults.legs_to_win,
            sets_to_win: defaults.sets_to_win,
            max_players: None,
            starter_order: None,
        }
    }

    pub fn with_starting_score(mut self, starting_score: u16) -> Self {
        self.starting_score = Some(starting_score);
        self
    }

    pub fn with_legs(mut self, legs_to_win: u8, sets_to_win: u8) -> Self {
        self.legs_to_win = legs_to_win;
        self.sets_to_win = sets_to_win;
        self
    }

    pub fn with_max_players(mut self, max_players: u8) -> Self {
        self.max_players = Some(max_players);
        self
    }

    pub fn with_starter_order(mut self, order: Vec<usize>) -> Self {
        self.starter_order = Some(order);
        self
    }
}

/// A committed match mutation.
#[derive(Debug, Clone)]
pub struct MatchMutation<T> {
    pub stored: StoredMatch,
    pub old_version: i32,
    pub transitions: Vec<MatchTransition>,
    pub turn: Option<TurnRecord>,
    pub output: T,
}

/// What happened to the tournament projection after a tournament match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TournamentSync {
    Recorded(ResultOutcome),
    /// The match stays finished; the host has to retry the projection.
    Failed { code: ErrorCode, detail: String },
}

#[derive(Debug, Clone)]
pub struct ThrowOutcome {
    pub stored: StoredMatch,
    pub turn: TurnRecord,
    pub transitions: Vec<MatchTransition>,
    /// Suggested finish for whoever throws next.
    pub checkout_hint: Vec<DartThrow>,
    pub tournament_sync: Option<TournamentSync>,
}

#[derive(Debug, Clone)]
pub struct AbandonOutcome {
    pub stored: StoredMatch,
    pub transitions: Vec<MatchTransition>,
    pub tournament_sync: Option<TournamentSync>,
}

/// Match operations over the shared application state.
pub struct MatchService<'a> {
    state: &'a AppState,
}

impl<'a> MatchService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn create_match(&self, request: CreateMatch) -> Result<StoredMatch, AppError> {
        let engine = &self.state.engine;
        let starting_score = request
            .starting_score
            .unwrap_or(engine.default_starting_score);
        ensure_game_type(starting_score)?;

        let max_players = request.max_players.unwrap_or(engine.max_players_per_match);
        if max_players > engine.max_players_per_match {
            return Err(AppError::invalid(
                ErrorCode::InvalidConfig,
                format!(
                    "at most {} players per match",
                    engine.max_players_per_match
                ),
            ));
        }

        let config = MatchConfig {
            starting_score,
            legs_to_win: request.legs_to_win,
            sets_to_win: request.sets_to_win,
            max_players,
            starter_order: request.starter_order,
        };
        let state = MatchState::new(config, request.host.clone(), request.host_name)?;
        let stored = self.insert_with_fresh_code(state).await?;

        info!(
            match_id = %stored.id,
            host = %request.host,
            starting_score,
            "match created"
        );
        Ok(stored)
    }

    pub async fn join_match(
        &self,
        match_id: &str,
        player: PlayerId,
        display_name: impl Into<String>,
        role: JoinRole,
    ) -> Result<MatchMutation<JoinOutcome>, AppError> {
        let display_name = display_name.into();
        let joined = player.clone();
        let mutation = self
            .mutate("join_match", match_id, move |state, _now| {
                let outcome = state.join(player.clone(), display_name.clone(), role)?;
                Ok((outcome, None))
            })
            .await?;
        if mutation.output == JoinOutcome::Joined {
            info!(match_id, player_id = %joined, ?role, "joined match");
        }
        Ok(mutation)
    }

    pub async fn join_match_by_code(
        &self,
        code: &str,
        player: PlayerId,
        display_name: impl Into<String>,
        role: JoinRole,
    ) -> Result<MatchMutation<JoinOutcome>, AppError> {
        let code = normalize_join_code(code).ok_or_else(|| {
            AppError::not_found(ErrorCode::MatchNotFound, format!("no match with join code {code}"))
        })?;
        let stored = matches_repo::require_by_join_code(self.state.db(), &code).await?;
        self.join_match(&stored.id, player, display_name, role).await
    }

    pub async fn start_match(
        &self,
        match_id: &str,
        actor: PlayerId,
    ) -> Result<MatchMutation<()>, AppError> {
        let mutation = self
            .mutate("start_match", match_id, move |state, now| {
                state.start(&actor, now)?;
                Ok(((), None))
            })
            .await?;
        info!(
            match_id,
            players = mutation.stored.state.players.len(),
            "match started"
        );
        Ok(mutation)
    }

    /// Applies darts for the current player (or the host on their behalf).
    ///
    /// Submissions for one match are ordered by their commit; a stale read
    /// loses the version check and is replayed against the newer document.
    pub async fn record_throws(
        &self,
        match_id: &str,
        actor: PlayerId,
        darts: Vec<DartThrow>,
    ) -> Result<ThrowOutcome, AppError> {
        let mutation = self
            .mutate("record_throws", match_id, move |state, now| {
                let turn = state.apply_throws(&actor, &darts, now)?;
                Ok(((), Some(turn)))
            })
            .await?;

        let MatchMutation {
            stored,
            transitions,
            turn,
            ..
        } = mutation;
        let turn = turn.ok_or_else(|| {
            AppError::internal(ErrorCode::Internal, "throw produced no turn record")
        })?;
        debug!(
            match_id,
            turn_number = turn.turn_number,
            player_id = %turn.player_id,
            visit_total = turn.visit_total,
            remaining = turn.remaining,
            busted = turn.busted,
            "turn recorded"
        );

        let tournament_sync = self.after_commit_finish(&stored).await;
        Ok(ThrowOutcome {
            checkout_hint: stored.state.checkout_hint(),
            stored,
            turn,
            transitions,
            tournament_sync,
        })
    }

    /// Ends the match early; terminal, nothing is rolled back.
    pub async fn abandon_match(
        &self,
        match_id: &str,
        actor: PlayerId,
    ) -> Result<AbandonOutcome, AppError> {
        let abandoned_by = actor.clone();
        let mutation = self
            .mutate("abandon_match", match_id, move |state, now| {
                state.abandon(&actor, now)?;
                Ok(((), None))
            })
            .await?;
        info!(match_id, abandoned_by = %abandoned_by, "match abandoned");

        let tournament_sync = self.after_commit_finish(&mutation.stored).await;
        Ok(AbandonOutcome {
            stored: mutation.stored,
            transitions: mutation.transitions,
            tournament_sync,
        })
    }

    pub async fn get_match(&self, match_id: &str) -> Result<StoredMatch, AppError> {
        Ok(matches_repo::require_match(self.state.db(), match_id).await?)
    }

    /// Turn history in commit order.
    pub async fn list_turns(&self, match_id: &str) -> Result<Vec<TurnRecord>, AppError> {
        let db = self.state.db();
        matches_repo::require_match(db, match_id).await?;
        Ok(turns_repo::list_turns(db, match_id).await?)
    }

    /// Change notifications for one match; dropping the subscription ends it.
    pub async fn subscribe(&self, match_id: &str) -> Result<MatchSubscription, AppError> {
        matches_repo::require_match(self.state.db(), match_id).await?;
        Ok(self.state.hub.subscribe(match_id))
    }

    /// Runs one pure transition against the stored document.
    ///
    /// `apply` is replayed from scratch on every attempt, so it must only
    /// capture owned data.
    async fn mutate<T, F>(
        &self,
        operation: &'static str,
        match_id: &str,
        apply: F,
    ) -> Result<MatchMutation<T>, AppError>
    where
        T: Send + 'static,
        F: Fn(&mut MatchState, OffsetDateTime) -> Result<(T, Option<TurnRecord>), DomainError>
            + Send
            + Sync
            + 'static,
    {
        let apply = Arc::new(apply);
        let id = match_id.to_owned();
        let mutation = with_txn_retry(
            self.state.db(),
            self.state.retry_policy(),
            operation,
            move |txn| {
                let apply = Arc::clone(&apply);
                let match_id = id.clone();
                Box::pin(async move {
                    let current = matches_repo::require_match(txn, &match_id).await?;
                    let before = MatchLifecycleView::of(&current.state, current.version);

                    let mut next = current.state.clone();
                    let (output, turn) = apply(&mut next, OffsetDateTime::now_utc())?;

                    let stored =
                        matches_repo::save_match(txn, &match_id, current.version, &next).await?;
                    if let Some(turn) = &turn {
                        turns_repo::append_turn(txn, &match_id, turn).await?;
                    }

                    let after = MatchLifecycleView::of(&stored.state, stored.version);
                    Ok(MatchMutation {
                        transitions: derive_match_transitions(&before, &after),
                        old_version: current.version,
                        stored,
                        turn,
                        output,
                    })
                })
            },
        )
        .await?;

        self.publish(&mutation);
        Ok(mutation)
    }

    fn publish<T>(&self, mutation: &MatchMutation<T>) {
        let delivered = self.state.hub.publish(MatchUpdate {
            match_id: mutation.stored.id.clone(),
            version: mutation.stored.version,
            status: mutation.stored.state.status,
            transitions: mutation.transitions.clone(),
            turn: mutation.turn.clone(),
        });
        debug!(
            match_id = %mutation.stored.id,
            version = mutation.stored.version,
            delivered,
            "match update published"
        );
    }

    /// Follow-up work once a finished match has committed. Neither step can
    /// undo the finish.
    async fn after_commit_finish(&self, stored: &StoredMatch) -> Option<TournamentSync> {
        if stored.state.status != MatchStatus::Finished {
            return None;
        }
        info!(
            match_id = %stored.id,
            winner = ?stored.state.winner.as_ref().map(PlayerId::as_str),
            "match finished"
        );

        users::record_match_stats(self.state, &stored.state).await;

        let tournament_id = stored.tournament_id.as_deref()?;
        let summary = stored.state.summary();
        let sync = match TournamentService::new(self.state)
            .on_match_finished(tournament_id, &stored.id, &summary)
            .await
        {
            Ok(outcome) => TournamentSync::Recorded(outcome),
            Err(err) => {
                warn!(
                    match_id = %stored.id,
                    tournament_id,
                    error = %err,
                    "tournament result sync failed"
                );
                TournamentSync::Failed {
                    code: err.code(),
                    detail: err.detail().to_owned(),
                }
            }
        };
        Some(sync)
    }

    async fn insert_with_fresh_code(&self, state: MatchState) -> Result<StoredMatch, AppError> {
        let mut attempt = 1;
        loop {
            let match_id = Ulid::new().to_string();
            let code = generate_join_code();
            let document = state.clone();
            let result = with_txn(self.state.db(), move |txn| {
                Box::pin(async move {
                    Ok(matches_repo::create_match(txn, &match_id, &code, &document).await?)
                })
            })
            .await;
            match result {
                Err(err)
                    if err.code() == ErrorCode::JoinCodeConflict && attempt < JOIN_CODE_ATTEMPTS =>
                {
                    debug!(attempt, "join code collision, drawing another");
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

pub(crate) fn ensure_game_type(starting_score: u16) -> Result<(), AppError> {
    if GAME_TYPES.contains(&starting_score) {
        Ok(())
    } else {
        Err(AppError::invalid(
            ErrorCode::InvalidConfig,
            format!("starting score must be one of {GAME_TYPES:?}, got {starting_score}"),
        ))
    }
}

/// Inserts a tournament pairing's match inside the caller's transaction and
/// starts it with the tournament host as arbiter.
pub(crate) async fn create_tournament_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
    config: MatchConfig,
    host: &PlayerId,
    seats: Vec<(PlayerId, String)>,
) -> Result<StoredMatch, AppError> {
    let mut state = MatchState::hosted(config, host.clone(), seats)?;
    state.tournament_id = Some(tournament_id.to_owned());
    state.start(host, OffsetDateTime::now_utc())?;

    let match_id = Ulid::new().to_string();
    let stored = matches_repo::create_match(conn, &match_id, &generate_join_code(), &state).await?;
    info!(match_id = %stored.id, tournament_id, "tournament match created");
    Ok(stored)
}
