use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;

/// Opens a pooled connection for `profile`. Runs no migrations.
pub async fn connect_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let url = db_url(profile)?;
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5));
    if profile.is_sqlite() {
        // Every pooled connection to `sqlite::memory:` would be its own database.
        opts.max_connections(1).min_connections(1);
    } else {
        opts.max_connections(16);
    }

    let conn = Database::connect(opts).await?;
    info!(?profile, "database connected");
    Ok(conn)
}

/// Connects and brings the schema up to date.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(profile).await?;
    migrate(&conn, MigrationCommand::Up).await?;
    Ok(conn)
}
