// Optimistic locking and bounded retry around match writes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use darts_backend::db::{with_txn, with_txn_retry, RetryPolicy};
use darts_backend::domain::MatchStatus;
use darts_backend::repos::matches as matches_repo;
use darts_backend::services::MatchService;
use darts_backend::{AppError, ErrorCode};

use crate::common::{maximum, player, single, started_301, test_state};

#[tokio::test]
async fn stale_version_write_is_an_optimistic_lock() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let stale = service.get_match(&match_id).await?;
    service.record_throws(&match_id, ann.clone(), maximum()).await?;

    let id = match_id.clone();
    let err = with_txn(state.db(), move |txn| {
        Box::pin(async move {
            matches_repo::save_match(txn, &id, stale.version, &stale.state).await?;
            Ok(())
        })
    })
    .await
    .unwrap_err();
    assert!(err.is_optimistic_lock(), "expected OPTIMISTIC_LOCK, got {err:?}");
    assert!(err.detail().contains("expected"), "detail: {}", err.detail());

    // The winning write is untouched
    let current = service.get_match(&match_id).await?;
    assert_eq!(current.state.turns_recorded, 1);
    assert_eq!(current.version, 4);
    Ok(())
}

#[tokio::test]
async fn retry_exhaustion_surfaces_concurrent_modification() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let stale = service.get_match(&match_id).await?;
    service.record_throws(&match_id, ann.clone(), maximum()).await?;

    let attempts = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&attempts);
    let policy = RetryPolicy::new(3, Duration::from_millis(1));
    let err = with_txn_retry(state.db(), policy, "stale_writer", move |txn| {
        counter.fetch_add(1, Ordering::SeqCst);
        let id = match_id.clone();
        let stale = stale.clone();
        Box::pin(async move {
            matches_repo::save_match(txn, &id, stale.version, &stale.state).await?;
            Ok(())
        })
    })
    .await
    .unwrap_err();

    assert_eq!(err.code(), ErrorCode::ConcurrentModification);
    assert_eq!(err.status(), 409);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn simultaneous_submissions_apply_in_commit_order() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let (first, second) = tokio::join!(
        service.record_throws(&match_id, ann.clone(), vec![single(20)]),
        service.record_throws(&match_id, ann.clone(), vec![single(19)]),
    );
    let (first, second) = (first?, second?);

    let mut numbers = [first.turn.turn_number, second.turn.turn_number];
    numbers.sort_unstable();
    assert_eq!(numbers, [1, 2]);

    let current = service.get_match(&match_id).await?;
    assert_eq!(current.state.status, MatchStatus::Playing);
    assert_eq!(current.state.current_turn_darts(), 2);
    assert_eq!(current.state.players[0].current_score, 301 - 39);
    assert_eq!(current.version, 5);

    let turns = service.list_turns(&match_id).await?;
    assert_eq!(
        turns.iter().map(|t| t.turn_number).collect::<Vec<_>>(),
        vec![1, 2]
    );
    Ok(())
}
