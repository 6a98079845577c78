//! SeaORM adapter for user records (display name + lifetime statistics).

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::entities::users;

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id.to_owned()).one(conn).await
}

/// Creates the user if missing; an existing row is left untouched.
pub async fn ensure_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    display_name: &str,
    empty_stats: String,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let user_active = users::ActiveModel {
        id: Set(user_id.to_owned()),
        display_name: Set(display_name.to_owned()),
        stats: Set(empty_stats),
        version: Set(1),
        created_at: Set(now),
        updated_at: Set(now),
    };

    users::Entity::insert(user_active)
        .on_conflict(OnConflict::column(users::Column::Id).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await?;

    find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("user {user_id} not found")))
}

/// Writes new stats if the row is still at `expected_version`.
pub async fn update_stats<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
    expected_version: i32,
    stats: String,
) -> Result<users::Model, sea_orm::DbErr> {
    let result = users::Entity::update_many()
        .col_expr(users::Column::Stats, Expr::value(stats))
        .col_expr(
            users::Column::UpdatedAt,
            Expr::value(time::OffsetDateTime::now_utc()),
        )
        .col_expr(
            users::Column::Version,
            Expr::col(users::Column::Version).add(1),
        )
        .filter(users::Column::Id.eq(user_id))
        .filter(users::Column::Version.eq(expected_version))
        .exec(conn)
        .await?;

    let current = find_by_id(conn, user_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound(format!("user {user_id} not found")))?;
    if result.rows_affected == 0 {
        return Err(super::lock_conflict(expected_version, current.version));
    }
    Ok(current)
}
