//! Match repository functions for the domain layer.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::matches_sea as matches_adapter;
use crate::domain::match_state::{MatchState, MatchStatus};
use crate::entities::matches;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

/// A match document together with its row metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatch {
    pub id: String,
    pub join_code: String,
    pub tournament_id: Option<String>,
    pub version: i32,
    pub state: MatchState,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<matches::Model> for StoredMatch {
    type Error = DomainError;

    fn try_from(model: matches::Model) -> Result<Self, Self::Error> {
        let state: MatchState = serde_json::from_str(&model.document)?;
        if MatchStatus::parse(&model.status) != Some(state.status) {
            return Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!(
                    "match {} status column '{}' disagrees with document '{}'",
                    model.id,
                    model.status,
                    state.status.as_str()
                ),
            ));
        }
        state.check_integrity()?;
        Ok(Self {
            id: model.id,
            join_code: model.join_code,
            tournament_id: model.tournament_id,
            version: model.version,
            state,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

fn match_not_found(match_id: &str) -> DomainError {
    DomainError::not_found(NotFoundKind::Match, format!("match {match_id} not found"))
}

pub async fn find_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
) -> Result<Option<StoredMatch>, DomainError> {
    matches_adapter::find_by_id(conn, match_id)
        .await?
        .map(StoredMatch::try_from)
        .transpose()
}

/// Loads and decodes a match, or `NotFound(Match)`.
pub async fn require_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
) -> Result<StoredMatch, DomainError> {
    find_match(conn, match_id)
        .await?
        .ok_or_else(|| match_not_found(match_id))
}

pub async fn require_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<StoredMatch, DomainError> {
    matches_adapter::find_by_join_code(conn, join_code)
        .await?
        .map(StoredMatch::try_from)
        .transpose()?
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Match,
                format!("no match with join code {join_code}"),
            )
        })
}

pub async fn list_for_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
) -> Result<Vec<StoredMatch>, DomainError> {
    matches_adapter::list_by_tournament(conn, tournament_id)
        .await?
        .into_iter()
        .map(StoredMatch::try_from)
        .collect()
}

pub async fn create_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
    join_code: &str,
    state: &MatchState,
) -> Result<StoredMatch, DomainError> {
    let dto = matches_adapter::MatchCreate {
        id: match_id.to_owned(),
        join_code: join_code.to_owned(),
        tournament_id: state.tournament_id.clone(),
        status: state.status.as_str().to_owned(),
        document: serde_json::to_string(state)?,
    };
    let model = matches_adapter::create_match(conn, dto).await?;
    StoredMatch::try_from(model)
}

/// Writes `state` over the version that was read. Fails with an optimistic
/// lock conflict when another writer got there first.
pub async fn save_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
    expected_version: i32,
    state: &MatchState,
) -> Result<StoredMatch, DomainError> {
    let dto = matches_adapter::MatchUpdate {
        id: match_id.to_owned(),
        expected_version,
        status: state.status.as_str().to_owned(),
        document: serde_json::to_string(state)?,
    };
    let model = matches_adapter::update_match(conn, dto).await?;
    StoredMatch::try_from(model)
}
