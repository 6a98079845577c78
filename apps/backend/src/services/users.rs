//! Lifetime statistics on user records.

use tracing::{debug, warn};

use crate::db::txn::with_txn_retry;
use crate::domain::match_state::MatchState;
use crate::error::AppError;
use crate::repos::users::{self as users_repo, UserProfile};
use crate::state::app_state::AppState;

/// Folds a finished match into every player's lifetime record.
///
/// Best-effort: each player gets an independent transaction, retried on a
/// concurrent fold, and a failure is logged and skipped. Returns how many records were updated.
pub async fn record_match_stats(state: &AppState, finished: &MatchState) -> usize {
    let summary = finished.summary();
    let mut updated = 0;
    for result in summary.results {
        let display_name = finished
            .players
            .iter()
            .find(|p| p.id == result.player_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| result.player_id.as_str().to_owned());
        let player_id = result.player_id.clone();

        let folded = with_txn_retry(
            state.db(),
            state.retry_policy(),
            "record_match_stats",
            move |txn| {
                let display_name = display_name.clone();
                let result = result.clone();
                Box::pin(async move {
                    Ok(users_repo::fold_match_result(txn, &display_name, &result).await?)
                })
            },
        )
        .await;
        match folded {
            Ok(stats) => {
                updated += 1;
                debug!(
                    player_id = %player_id,
                    games_played = stats.games_played,
                    "lifetime stats updated"
                );
            }
            Err(err) => warn!(
                player_id = %player_id,
                error = %err,
                "lifetime stats update failed"
            ),
        }
    }
    updated
}

pub async fn get_user(state: &AppState, user_id: &str) -> Result<UserProfile, AppError> {
    Ok(users_repo::require_user(state.db(), user_id).await?)
}
