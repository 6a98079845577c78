use std::process::ExitCode;

use darts_backend::config::db::DbProfile;
use darts_backend::infra::state::build_state;
use darts_backend::telemetry;
use tracing::{error, info};

/// Connects to the production database, applies pending migrations and
/// validates the engine configuration. The HTTP adapter embeds the library
/// and runs the same bootstrap on startup.
#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (POSTGRES_*, PROD_DB, APP_DB_*, DARTS_*).
    match build_state().with_db(DbProfile::Prod).build().await {
        Ok(state) => {
            info!(
                txn_max_attempts = state.engine.txn_max_attempts,
                max_players_per_match = state.engine.max_players_per_match,
                default_starting_score = state.engine.default_starting_score,
                "database migrated, engine ready"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "failed to build application state");
            ExitCode::FAILURE
        }
    }
}
