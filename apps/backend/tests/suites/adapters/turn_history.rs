// Append-only turn history.

use darts_backend::db::with_txn;
use darts_backend::repos::turns as turns_repo;
use darts_backend::services::MatchService;
use darts_backend::{AppError, ErrorCode};

use crate::common::{maximum, player, started_301, test_state, three_misses};

#[tokio::test]
async fn turns_are_listed_in_commit_order() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    service.record_throws(&match_id, ann.clone(), maximum()).await?;
    service.record_throws(&match_id, bob.clone(), three_misses()).await?;
    service.record_throws(&match_id, ann.clone(), maximum()).await?;

    let turns = turns_repo::list_turns(state.db(), &match_id).await?;
    let order: Vec<_> = turns
        .iter()
        .map(|t| (t.turn_number, t.player_id.clone()))
        .collect();
    assert_eq!(order, vec![(1, ann.clone()), (2, bob), (3, ann)]);
    assert_eq!(turns[2].remaining, 121);
    assert!(turns[2].busted);
    Ok(())
}

#[tokio::test]
async fn a_turn_number_is_recorded_once() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;
    let outcome = service.record_throws(&match_id, ann, maximum()).await?;

    let turn = outcome.turn.clone();
    let id = match_id.clone();
    let err = with_txn(state.db(), move |txn| {
        Box::pin(async move {
            turns_repo::append_turn(txn, &id, &turn).await?;
            Ok(())
        })
    })
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateTurn);

    assert_eq!(service.list_turns(&match_id).await?.len(), 1);
    Ok(())
}
