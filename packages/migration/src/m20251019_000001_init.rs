use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    DisplayName,
    Stats,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tournaments {
    Table,
    Id,
    Code,
    Status,
    Document,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Matches {
    Table,
    Id,
    JoinCode,
    TournamentId,
    Status,
    Document,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum MatchTurns {
    Table,
    Id,
    MatchId,
    TurnNumber,
    PlayerId,
    Payload,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::Stats).text().not_null())
                    .col(
                        ColumnDef::new(Users::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // tournaments
        manager
            .create_table(
                Table::create()
                    .table(Tournaments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tournaments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tournaments::Code).string().not_null())
                    .col(ColumnDef::new(Tournaments::Status).string().not_null())
                    .col(ColumnDef::new(Tournaments::Document).text().not_null())
                    .col(
                        ColumnDef::new(Tournaments::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Tournaments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tournaments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("tournaments_code_key")
                    .table(Tournaments::Table)
                    .col(Tournaments::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // matches
        manager
            .create_table(
                Table::create()
                    .table(Matches::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Matches::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Matches::JoinCode).string().not_null())
                    .col(ColumnDef::new(Matches::TournamentId).string().null())
                    .col(ColumnDef::new(Matches::Status).string().not_null())
                    .col(ColumnDef::new(Matches::Document).text().not_null())
                    .col(
                        ColumnDef::new(Matches::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Matches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Matches::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_matches_tournament")
                            .from(Matches::Table, Matches::TournamentId)
                            .to(Tournaments::Table, Tournaments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("matches_join_code_key")
                    .table(Matches::Table)
                    .col(Matches::JoinCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_matches_tournament")
                    .table(Matches::Table)
                    .col(Matches::TournamentId)
                    .to_owned(),
            )
            .await?;

        // match_turns (append-only)
        manager
            .create_table(
                Table::create()
                    .table(MatchTurns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MatchTurns::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(MatchTurns::MatchId).string().not_null())
                    .col(ColumnDef::new(MatchTurns::TurnNumber).integer().not_null())
                    .col(ColumnDef::new(MatchTurns::PlayerId).string().not_null())
                    .col(ColumnDef::new(MatchTurns::Payload).text().not_null())
                    .col(
                        ColumnDef::new(MatchTurns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_turns_match")
                            .from(MatchTurns::Table, MatchTurns::MatchId)
                            .to(Matches::Table, Matches::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("match_turns_match_turn_key")
                    .table(MatchTurns::Table)
                    .col(MatchTurns::MatchId)
                    .col(MatchTurns::TurnNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MatchTurns::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matches::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tournaments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
