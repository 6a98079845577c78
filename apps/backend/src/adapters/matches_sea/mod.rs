//! SeaORM adapter for match documents - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::matches;

pub mod dto;

pub use dto::{MatchCreate, MatchUpdate};

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
) -> Result<Option<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find_by_id(match_id.to_owned()).one(conn).await
}

pub async fn find_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Option<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find()
        .filter(matches::Column::JoinCode.eq(join_code))
        .one(conn)
        .await
}

pub async fn list_by_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
) -> Result<Vec<matches::Model>, sea_orm::DbErr> {
    matches::Entity::find()
        .filter(matches::Column::TournamentId.eq(tournament_id))
        .order_by_asc(matches::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn create_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MatchCreate,
) -> Result<matches::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    matches::ActiveModel {
        id: Set(dto.id),
        join_code: Set(dto.join_code),
        tournament_id: Set(dto.tournament_id),
        status: Set(dto.status),
        document: Set(dto.document),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Replaces the document if the stored version still equals `expected_version`.
///
/// Zero affected rows means either the match is gone (`RecordNotFound`) or
/// somebody else committed first (optimistic lock payload).
pub async fn update_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MatchUpdate,
) -> Result<matches::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = matches::Entity::update_many()
        .col_expr(matches::Column::Status, Expr::value(dto.status))
        .col_expr(matches::Column::Document, Expr::value(dto.document))
        .col_expr(matches::Column::UpdatedAt, Expr::value(now))
        .col_expr(
            matches::Column::Version,
            Expr::col(matches::Column::Version).add(1),
        )
        .filter(matches::Column::Id.eq(dto.id.as_str()))
        .filter(matches::Column::Version.eq(dto.expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, &dto.id).await? {
            Some(current) => Err(super::lock_conflict(dto.expected_version, current.version)),
            None => Err(sea_orm::DbErr::RecordNotFound(format!(
                "match {} not found",
                dto.id
            ))),
        };
    }

    find_by_id(conn, &dto.id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("match {} not found", dto.id)))
}
