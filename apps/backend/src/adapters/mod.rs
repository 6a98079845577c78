//! SeaORM adapters. Functions return `DbErr`; the repos layer maps to
//! `DomainError` via `From<DbErr>`.

pub mod match_turns_sea;
pub mod matches_sea;
pub mod tournaments_sea;
pub mod users_sea;

use crate::infra::db_errors::OPTIMISTIC_LOCK_PREFIX;

/// Version mismatch payload, decoded again by `infra::db_errors::map_db_err`.
pub(crate) fn lock_conflict(expected: i32, actual: i32) -> sea_orm::DbErr {
    sea_orm::DbErr::Custom(format!(
        "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{expected},\"actual\":{actual}}}"
    ))
}
