// Change notifications published after commit.

use std::time::Duration;

use darts_backend::domain::{MatchStatus, MatchTransition};
use darts_backend::services::MatchService;
use darts_backend::{AppError, ErrorCode};

use crate::common::{maximum, player, started_301, test_state};

#[tokio::test]
async fn subscriber_receives_the_committed_turn() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let mut subscription = service.subscribe(&match_id).await?;
    let outcome = service.record_throws(&match_id, ann.clone(), maximum()).await?;

    let update = tokio::time::timeout(Duration::from_secs(1), subscription.recv())
        .await
        .expect("update within a second")
        .expect("channel open");
    assert_eq!(update.match_id, match_id);
    assert_eq!(update.version, outcome.stored.version);
    assert_eq!(update.status, MatchStatus::Playing);
    assert_eq!(update.turn.as_ref(), Some(&outcome.turn));
    assert!(update
        .transitions
        .contains(&MatchTransition::TurnBecame { player_id: bob.clone() }));
    assert!(subscription.try_recv().is_none());
    Ok(())
}

#[tokio::test]
async fn rejected_throws_publish_nothing() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let mut subscription = service.subscribe(&match_id).await?;
    let err = service
        .record_throws(&match_id, bob.clone(), maximum())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotYourTurn);
    assert!(subscription.try_recv().is_none());
    Ok(())
}

#[tokio::test]
async fn dropping_the_subscription_unsubscribes() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let first = service.subscribe(&match_id).await?;
    let second = service.subscribe(&match_id).await?;
    assert_eq!(state.hub.subscriber_count(&match_id), 2);

    drop(first);
    assert_eq!(state.hub.subscriber_count(&match_id), 1);
    drop(second);
    assert_eq!(state.hub.subscriber_count(&match_id), 0);

    // Publishing with nobody listening is fine
    service.record_throws(&match_id, ann, maximum()).await?;
    Ok(())
}

#[tokio::test]
async fn subscribing_to_an_unknown_match_fails() -> Result<(), AppError> {
    let state = test_state().await?;
    let err = MatchService::new(&state)
        .subscribe("no-such-match")
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::MatchNotFound);
    Ok(())
}
