//! SeaORM adapter for tournament documents.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::tournaments;

#[derive(Debug, Clone)]
pub struct TournamentCreate {
    pub id: String,
    pub code: String,
    pub status: String,
    pub document: String,
}

#[derive(Debug, Clone)]
pub struct TournamentUpdate {
    pub id: String,
    pub expected_version: i32,
    pub status: String,
    pub document: String,
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    tournament_id: &str,
) -> Result<Option<tournaments::Model>, sea_orm::DbErr> {
    tournaments::Entity::find_by_id(tournament_id.to_owned())
        .one(conn)
        .await
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<tournaments::Model>, sea_orm::DbErr> {
    tournaments::Entity::find()
        .filter(tournaments::Column::Code.eq(code))
        .one(conn)
        .await
}

pub async fn create_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TournamentCreate,
) -> Result<tournaments::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    tournaments::ActiveModel {
        id: Set(dto.id),
        code: Set(dto.code),
        status: Set(dto.status),
        document: Set(dto.document),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn update_tournament<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TournamentUpdate,
) -> Result<tournaments::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = tournaments::Entity::update_many()
        .col_expr(tournaments::Column::Status, Expr::value(dto.status))
        .col_expr(tournaments::Column::Document, Expr::value(dto.document))
        .col_expr(tournaments::Column::UpdatedAt, Expr::value(now))
        .col_expr(
            tournaments::Column::Version,
            Expr::col(tournaments::Column::Version).add(1),
        )
        .filter(tournaments::Column::Id.eq(dto.id.as_str()))
        .filter(tournaments::Column::Version.eq(dto.expected_version))
        .exec(conn)
        .await?;

    let current = find_by_id(conn, &dto.id).await?;
    match current {
        Some(model) if result.rows_affected > 0 => Ok(model),
        Some(model) => Err(super::lock_conflict(dto.expected_version, model.version)),
        None => Err(sea_orm::DbErr::RecordNotFound(format!(
            "tournament {} not found",
            dto.id
        ))),
    }
}
