//! Tournament operations. Match truth is authoritative: the tournament
//! document is a projection updated after each tournament match finishes.

use tracing::{info, warn};
use ulid::Ulid;

use crate::db::txn::{with_txn, with_txn_retry};
use crate::domain::match_state::MatchSummary;
use crate::domain::roster::PlayerId;
use crate::domain::tournament::{Pairing, ResultOutcome, Tournament, TournamentConfig};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::errors::ErrorCode;
use crate::repos::matches::{self as matches_repo, StoredMatch};
use crate::repos::tournaments::{self as tournaments_repo, StoredTournament};
use crate::services::matches::{create_tournament_match, ensure_game_type};
use crate::state::app_state::AppState;
use crate::utils::join_code::{generate_join_code, normalize_join_code};

const CODE_ATTEMPTS: u32 = 5;

/// A tournament after a round opened, with the matches created for it.
#[derive(Debug, Clone)]
pub struct RoundStarted {
    pub stored: StoredTournament,
    pub matches: Vec<StoredMatch>,
}

pub struct TournamentService<'a> {
    state: &'a AppState,
}

impl<'a> TournamentService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Creates a tournament with a fresh random pairing seed.
    pub async fn create_tournament(
        &self,
        host: PlayerId,
        host_name: impl Into<String>,
        config: TournamentConfig,
    ) -> Result<StoredTournament, AppError> {
        self.create_seeded(host, host_name, config, rand::random())
            .await
    }

    /// Creates a tournament with a caller-chosen seed, so draws can be
    /// replayed when auditing a result.
    pub async fn create_seeded(
        &self,
        host: PlayerId,
        host_name: impl Into<String>,
        config: TournamentConfig,
        seed: u64,
    ) -> Result<StoredTournament, AppError> {
        ensure_game_type(config.starting_score)?;
        let tournament = Tournament::new(host.clone(), host_name, config, seed)?;

        let mut attempt = 1;
        loop {
            let tournament_id = Ulid::new().to_string();
            let code = generate_join_code();
            let document = tournament.clone();
            let result = with_txn(self.state.db(), move |txn| {
                Box::pin(async move {
                    Ok(
                        tournaments_repo::create_tournament(txn, &tournament_id, &code, &document)
                            .await?,
                    )
                })
            })
            .await;
            match result {
                Ok(stored) => {
                    info!(
                        tournament_id = %stored.id,
                        host = %host,
                        mode = ?stored.tournament.config.mode,
                        "tournament created"
                    );
                    return Ok(stored);
                }
                Err(err)
                    if err.code() == ErrorCode::JoinCodeConflict && attempt < CODE_ATTEMPTS =>
                {
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    pub async fn join_tournament(
        &self,
        code: &str,
        player: PlayerId,
        display_name: impl Into<String>,
    ) -> Result<StoredTournament, AppError> {
        let code = normalize_join_code(code).ok_or_else(|| {
            AppError::not_found(
                ErrorCode::TournamentNotFound,
                format!("no tournament with code {code}"),
            )
        })?;
        let tournament_id = tournaments_repo::require_by_code(self.state.db(), &code)
            .await?
            .id;
        let display_name = display_name.into();
        let joined = player.clone();

        let (stored, added) = self
            .mutate("join_tournament", &tournament_id, move |tournament| {
                tournament.join(player.clone(), display_name.clone())
            })
            .await?;
        if added {
            info!(tournament_id = %stored.id, player_id = %joined, "joined tournament");
        }
        Ok(stored)
    }

    pub async fn set_ready(
        &self,
        tournament_id: &str,
        player: PlayerId,
        ready: bool,
    ) -> Result<StoredTournament, AppError> {
        let (stored, ()) = self
            .mutate("set_ready", tournament_id, move |tournament| {
                tournament.set_ready(&player, ready)
            })
            .await?;
        Ok(stored)
    }

    /// Draws the pairings and creates round 1's matches in one transaction.
    pub async fn start_tournament(
        &self,
        tournament_id: &str,
        actor: PlayerId,
    ) -> Result<RoundStarted, AppError> {
        let started = self
            .open_round("start_tournament", tournament_id, actor, Tournament::start)
            .await?;
        info!(
            tournament_id,
            players = started.stored.tournament.players.len(),
            matches = started.matches.len(),
            "tournament started"
        );
        Ok(started)
    }

    /// Opens the round the previous results advanced to.
    pub async fn start_round(
        &self,
        tournament_id: &str,
        actor: PlayerId,
    ) -> Result<RoundStarted, AppError> {
        let started = self
            .open_round("start_round", tournament_id, actor, Tournament::start_round)
            .await?;
        info!(
            tournament_id,
            round = started.stored.tournament.current_round,
            matches = started.matches.len(),
            "round started"
        );
        Ok(started)
    }

    /// Folds a finished match into standings. Recording the same match twice
    /// is a no-op.
    pub async fn on_match_finished(
        &self,
        tournament_id: &str,
        match_id: &str,
        summary: &MatchSummary,
    ) -> Result<ResultOutcome, AppError> {
        let finished = match_id.to_owned();
        let summary = summary.clone();
        let (stored, outcome) = self
            .mutate("record_tournament_result", tournament_id, move |tournament| {
                tournament.record_result(&finished, &summary)
            })
            .await?;

        match outcome {
            ResultOutcome::Recorded {
                tournament_completed: true,
                ..
            } => info!(
                tournament_id,
                champion = ?stored.tournament.champion.as_ref().map(PlayerId::as_str),
                "tournament completed"
            ),
            ResultOutcome::Recorded {
                round_completed: true,
                ..
            } => info!(
                tournament_id,
                next_round = stored.tournament.current_round,
                "round completed"
            ),
            ResultOutcome::AlreadyRecorded => {
                warn!(tournament_id, match_id, "match result already recorded")
            }
            ResultOutcome::Recorded { .. } => {}
        }
        Ok(outcome)
    }

    pub async fn get_tournament(&self, tournament_id: &str) -> Result<StoredTournament, AppError> {
        Ok(tournaments_repo::require_tournament(self.state.db(), tournament_id).await?)
    }

    pub async fn list_matches(&self, tournament_id: &str) -> Result<Vec<StoredMatch>, AppError> {
        let db = self.state.db();
        tournaments_repo::require_tournament(db, tournament_id).await?;
        Ok(matches_repo::list_for_tournament(db, tournament_id).await?)
    }

    async fn open_round(
        &self,
        operation: &'static str,
        tournament_id: &str,
        actor: PlayerId,
        open: fn(&mut Tournament, &PlayerId) -> Result<Vec<Pairing>, DomainError>,
    ) -> Result<RoundStarted, AppError> {
        let id = tournament_id.to_owned();
        with_txn_retry(
            self.state.db(),
            self.state.retry_policy(),
            operation,
            move |txn| {
                let tournament_id = id.clone();
                let actor = actor.clone();
                Box::pin(async move {
                    let current = tournaments_repo::require_tournament(txn, &tournament_id).await?;
                    let mut tournament = current.tournament.clone();
                    let pending = open(&mut tournament, &actor)?;

                    let match_config = tournament.config.match_config();
                    let mut matches = Vec::with_capacity(pending.len());
                    for pairing in pending {
                        let seats = seats_for(&tournament, &pairing)?;
                        let stored = create_tournament_match(
                            txn,
                            &tournament_id,
                            match_config.clone(),
                            &tournament.host,
                            seats,
                        )
                        .await?;
                        tournament.attach_match(pairing.round, pairing.slot, stored.id.clone())?;
                        matches.push(stored);
                    }

                    let stored = tournaments_repo::save_tournament(
                        txn,
                        &tournament_id,
                        current.version,
                        &tournament,
                    )
                    .await?;
                    Ok(RoundStarted { stored, matches })
                })
            },
        )
        .await
    }

    async fn mutate<T, F>(
        &self,
        operation: &'static str,
        tournament_id: &str,
        apply: F,
    ) -> Result<(StoredTournament, T), AppError>
    where
        T: Send + 'static,
        F: Fn(&mut Tournament) -> Result<T, DomainError> + Send + Sync + Clone + 'static,
    {
        let id = tournament_id.to_owned();
        with_txn_retry(
            self.state.db(),
            self.state.retry_policy(),
            operation,
            move |txn| {
                let tournament_id = id.clone();
                let apply = apply.clone();
                Box::pin(async move {
                    let current = tournaments_repo::require_tournament(txn, &tournament_id).await?;
                    let mut tournament = current.tournament.clone();
                    let output = apply(&mut tournament)?;
                    let stored = tournaments_repo::save_tournament(
                        txn,
                        &tournament_id,
                        current.version,
                        &tournament,
                    )
                    .await?;
                    Ok((stored, output))
                })
            },
        )
        .await
    }
}

/// Home throws first, so the home player takes the first seat.
fn seats_for(
    tournament: &Tournament,
    pairing: &Pairing,
) -> Result<Vec<(PlayerId, String)>, DomainError> {
    [&pairing.home, &pairing.away]
        .into_iter()
        .map(|seat| {
            let id = seat.as_ref().ok_or_else(|| {
                DomainError::invalid_transition(format!(
                    "pairing at round {} slot {} is missing a player",
                    pairing.round, pairing.slot
                ))
            })?;
            let name = tournament
                .players
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.display_name.clone())
                .unwrap_or_else(|| id.as_str().to_owned());
            Ok((id.clone(), name))
        })
        .collect()
}
