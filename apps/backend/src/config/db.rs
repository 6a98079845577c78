use std::env;

use crate::error::AppError;

/// Database profile enum for different environments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProfile {
    /// Production Postgres
    Prod,
    /// Test Postgres - enforces safety rules
    Test,
    /// Private SQLite database living as long as the connection
    InMemory,
}

impl DbProfile {
    pub fn is_sqlite(self) -> bool {
        matches!(self, DbProfile::InMemory)
    }
}

/// Builds a database URL from environment variables based on profile.
///
/// `DATABASE_URL` wins for the Postgres profiles when set.
pub fn db_url(profile: DbProfile) -> Result<String, AppError> {
    if profile == DbProfile::InMemory {
        return Ok("sqlite::memory:".to_string());
    }
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }

    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let db_name = db_name(profile)?;
    let username = must_var("APP_DB_USER")?;
    let password = must_var("APP_DB_PASSWORD")?;

    Ok(format!(
        "postgresql://{username}:{password}@{host}:{port}/{db_name}"
    ))
}

fn db_name(profile: DbProfile) -> Result<String, AppError> {
    match profile {
        DbProfile::Prod => must_var("PROD_DB"),
        DbProfile::Test => {
            let db_name = must_var("TEST_DB")?;
            if !db_name.ends_with("_test") {
                return Err(AppError::config(format!(
                    "Test profile requires database name to end with '_test', but got: '{db_name}'"
                )));
            }
            Ok(db_name)
        }
        DbProfile::InMemory => Ok(String::new()),
    }
}

fn must_var(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::config(format!("Required environment variable '{name}' is not set")))
}
