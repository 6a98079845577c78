use crate::config::db::DbProfile;
use crate::config::engine::EngineConfig;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    engine: Option<EngineConfig>,
    db_profile: DbProfile,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            engine: None,
            db_profile: DbProfile::InMemory,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = profile;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Connects, migrates and assembles the state. The engine config comes
    /// from the environment unless one was supplied.
    pub async fn build(self) -> Result<AppState, AppError> {
        let engine = match self.engine {
            Some(engine) => {
                engine.validate()?;
                engine
            }
            None => EngineConfig::from_env()?,
        };
        let db = bootstrap_db(self.db_profile).await?;
        Ok(AppState::new(db, engine))
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
