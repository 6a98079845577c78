//! Tournament repository functions.

use sea_orm::ConnectionTrait;

use crate::adapters::tournaments_sea as tournaments_adapter;
use crate::domain::tournament::Tournament;
use crate::entities::tournaments;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredTournament {
    pub id: String,
    pub code: String,
    pub version: i32,
    pub tournament: Tournament,
}

impl TryFrom<tournaments::Model> for StoredTournament {
    type Error = DomainError;

    fn try_from(model: tournaments::Model) -> Result<Self, Self::Error> {
        let tournament: Tournament = serde_json::from_str(&model.document)?;
        tournament.check_integrity()?;
        Ok(Self {
            id: model.id,
            code: model.code,
            version: model.version,
            tournament,
        })
    }
}

pub async fn require_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
) -> Result<StoredTournament, DomainError> {
    tournaments_adapter::find_by_id(conn, tournament_id)
        .await?
        .map(StoredTournament::try_from)
        .transpose()?
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Tournament,
                format!("tournament {tournament_id} not found"),
            )
        })
}

pub async fn require_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<StoredTournament, DomainError> {
    tournaments_adapter::find_by_code(conn, code)
        .await?
        .map(StoredTournament::try_from)
        .transpose()?
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Tournament,
                format!("no tournament with code {code}"),
            )
        })
}

pub async fn create_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
    code: &str,
    tournament: &Tournament,
) -> Result<StoredTournament, DomainError> {
    let model = tournaments_adapter::create_tournament(
        conn,
        tournaments_adapter::TournamentCreate {
            id: tournament_id.to_owned(),
            code: code.to_owned(),
            status: tournament.status.as_str().to_owned(),
            document: serde_json::to_string(tournament)?,
        },
    )
    .await?;
    StoredTournament::try_from(model)
}

pub async fn save_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
    expected_version: i32,
    tournament: &Tournament,
) -> Result<StoredTournament, DomainError> {
    let model = tournaments_adapter::update_tournament(
        conn,
        tournaments_adapter::TournamentUpdate {
            id: tournament_id.to_owned(),
            expected_version,
            status: tournament.status.as_str().to_owned(),
            document: serde_json::to_string(tournament)?,
        },
    )
    .await?;
    StoredTournament::try_from(model)
}
