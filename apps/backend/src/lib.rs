#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod realtime;
pub mod repos;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;


// Re-exports for public API
pub use config::db::{db_url, DbProfile};
pub use config::engine::EngineConfig;
pub use error::AppError;
pub use errors::ErrorCode;
pub use infra::db::connect_db;
pub use infra::state::build_state;
pub use realtime::{MatchHub, MatchSubscription, MatchUpdate};
pub use services::{MatchService, TournamentService};
pub use state::app_state::AppState;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
