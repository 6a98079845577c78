use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "join_code", unique)]
    pub join_code: String,
    #[sea_orm(column_name = "tournament_id")]
    pub tournament_id: Option<String>,
    /// Mirrors the document's status for filtering without decoding it.
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub document: String,
    pub version: i32,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::match_turns::Entity")]
    MatchTurns,
    #[sea_orm(
        belongs_to = "super::tournaments::Entity",
        from = "Column::TournamentId",
        to = "super::tournaments::Column::Id"
    )]
    Tournament,
}

impl Related<super::match_turns::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MatchTurns.def()
    }
}

impl Related<super::tournaments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tournament.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
