use sea_orm::DatabaseConnection;

use crate::config::engine::EngineConfig;
use crate::db::txn::RetryPolicy;
use crate::realtime::MatchHub;

/// Application state containing shared resources
#[derive(Debug, Clone)]
pub struct AppState {
    db: DatabaseConnection,
    pub engine: EngineConfig,
    pub hub: MatchHub,
}

impl AppState {
    pub fn new(db: DatabaseConnection, engine: EngineConfig) -> Self {
        Self {
            db,
            engine,
            hub: MatchHub::default(),
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.engine)
    }
}
