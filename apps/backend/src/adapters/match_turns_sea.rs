//! SeaORM adapter for the append-only turn history.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};

use crate::entities::match_turns;

#[derive(Debug, Clone)]
pub struct TurnInsert {
    pub match_id: String,
    pub turn_number: i32,
    pub player_id: String,
    pub payload: String,
}

/// Inserts one turn. A repeated `(match_id, turn_number)` violates the unique
/// index and surfaces as a duplicate-turn conflict.
pub async fn insert_turn<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: TurnInsert,
) -> Result<match_turns::Model, sea_orm::DbErr> {
    match_turns::ActiveModel {
        id: NotSet,
        match_id: Set(dto.match_id),
        turn_number: Set(dto.turn_number),
        player_id: Set(dto.player_id),
        payload: Set(dto.payload),
        created_at: Set(time::OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

pub async fn list_by_match<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
) -> Result<Vec<match_turns::Model>, sea_orm::DbErr> {
    match_turns::Entity::find()
        .filter(match_turns::Column::MatchId.eq(match_id))
        .order_by_asc(match_turns::Column::TurnNumber)
        .all(conn)
        .await
}
