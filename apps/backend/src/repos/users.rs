//! User records and lifetime statistics.

use sea_orm::ConnectionTrait;

use crate::adapters::users_sea;
use crate::domain::stats::{LifetimeStats, PlayerResult};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub stats: LifetimeStats,
}

pub async fn require_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: &str,
) -> Result<UserProfile, DomainError> {
    let user = users_sea::find_by_id(conn, user_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::User, format!("user {user_id} not found"))
    })?;
    Ok(UserProfile {
        stats: serde_json::from_str(&user.stats)?,
        id: user.id,
        display_name: user.display_name,
    })
}

/// Folds one finished match into the player's lifetime record, creating the
/// record on first sight. A concurrent fold surfaces as an optimistic lock
/// conflict.
pub async fn fold_match_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    display_name: &str,
    result: &PlayerResult,
) -> Result<LifetimeStats, DomainError> {
    let empty = serde_json::to_string(&LifetimeStats::default())?;
    let user = users_sea::ensure_user(conn, result.player_id.as_str(), display_name, empty).await?;
    let mut stats: LifetimeStats = serde_json::from_str(&user.stats)?;
    stats.fold_result(result);
    let encoded = serde_json::to_string(&stats)?;
    users_sea::update_stats(conn, &user.id, user.version, encoded).await?;
    Ok(stats)
}
