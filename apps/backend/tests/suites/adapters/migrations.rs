// Schema bootstrap through the migration crate.

use darts_backend::config::db::DbProfile;
use darts_backend::connect_db;
use darts_backend::services::{CreateMatch, MatchService};
use darts_backend::AppError;
use migration::{count_applied_migrations, migrate, MigrationCommand};

use crate::common::{player, test_state};

#[tokio::test]
async fn state_builder_applies_every_migration() -> Result<(), AppError> {
    let state = test_state().await?;
    assert_eq!(count_applied_migrations(state.db()).await?, 1);

    // Running up again is a no-op
    migrate(state.db(), MigrationCommand::Up).await?;
    assert_eq!(count_applied_migrations(state.db()).await?, 1);
    Ok(())
}

#[tokio::test]
async fn down_and_up_rebuild_an_empty_schema() -> Result<(), AppError> {
    let state = test_state().await?;
    MatchService::new(&state)
        .create_match(CreateMatch::new(player("ann"), "Ann"))
        .await?;

    migrate(state.db(), MigrationCommand::Down).await?;
    assert_eq!(count_applied_migrations(state.db()).await?, 0);

    migrate(state.db(), MigrationCommand::Up).await?;
    let created = MatchService::new(&state)
        .create_match(CreateMatch::new(player("bob"), "Bob"))
        .await?;
    assert_eq!(created.version, 1);
    Ok(())
}

#[tokio::test]
async fn fresh_connection_starts_unmigrated() -> Result<(), AppError> {
    let db = connect_db(DbProfile::InMemory).await?;
    assert_eq!(count_applied_migrations(&db).await?, 0);
    migrate(&db, MigrationCommand::Status).await?;
    Ok(())
}
