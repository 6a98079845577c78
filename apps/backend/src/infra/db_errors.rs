//! SeaORM -> DomainError translation helpers.
//!
//! Adapters surface storage failures as `sea_orm::DbErr`; this module turns
//! them into `DomainError` so services never match on driver strings.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

/// Prefix adapters put on `DbErr::Custom` when a versioned update loses the race.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Extract `table.column` from SQLite "UNIQUE constraint failed: table.column" messages.
fn extract_sqlite_table_column(error_msg: &str) -> Option<&str> {
    let marker = "UNIQUE constraint failed: ";
    let start = error_msg.find(marker)? + marker.len();
    error_msg[start..]
        .split(|c: char| c.is_whitespace() || c == '"' || c == ',')
        .next()
}

fn unique_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    let sqlite = extract_sqlite_table_column(error_msg);
    let is = |table_column: &str, pg_constraint: &str| {
        sqlite == Some(table_column) || error_msg.contains(pg_constraint)
    };

    if is("matches.join_code", "matches_join_code_key") {
        return Some((ConflictKind::JoinCodeConflict, "Join code already exists"));
    }
    if is("tournaments.code", "tournaments_code_key") {
        return Some((ConflictKind::JoinCodeConflict, "Tournament code already exists"));
    }
    if sqlite == Some("match_turns.match_id") || error_msg.contains("match_turns_match_turn_key")
    {
        return Some((ConflictKind::DuplicateTurn, "Turn already recorded"));
    }
    None
}

fn parse_lock_conflict(msg: &str) -> DomainError {
    #[derive(serde::Deserialize)]
    struct LockInfo {
        expected: i32,
        actual: i32,
    }

    let info = msg
        .strip_prefix(OPTIMISTIC_LOCK_PREFIX)
        .and_then(|json| serde_json::from_str::<LockInfo>(json).ok());

    match info {
        Some(info) => {
            warn!(
                expected = info.expected,
                actual = info.actual,
                "Optimistic lock conflict detected"
            );
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Resource was modified concurrently (expected version {}, actual version {})",
                    info.expected, info.actual
                ),
            )
        }
        None => {
            warn!("Optimistic lock conflict detected (version info unavailable)");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Resource was modified by another transaction",
            )
        }
    }
}

/// Translate a `DbErr` into a `DomainError`.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), what.clone());
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            return parse_lock_conflict(msg);
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        sea_orm::DbErr::Json(_) | sea_orm::DbErr::Type(_) => {
            error!(raw_error = %error_msg, "Stored value could not be decoded");
            return DomainError::infra(
                InfraErrorKind::DataCorruption,
                "Stored value could not be decoded",
            );
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");
        if let Some((kind, detail)) = unique_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "40001") || error_msg.contains("database is locked") {
        // Serialization failures behave like a lost version race.
        warn!(raw_error = %error_msg, "Serialization failure");
        return DomainError::conflict(
            ConflictKind::OptimisticLock,
            "Concurrent transaction won the race",
        );
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(raw_error = %error_msg, "Database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}
