// Repository-level tests for versioned document writes.
//
// These tests verify that:
// 1. Updating a match that does not exist -> NotFound
// 2. Updating with a stale version -> OptimisticLock carrying both versions
// 3. A document whose status column disagrees with its body -> DataCorruption
// 4. A lifetime stats write from a stale read -> OptimisticLock

use darts_backend::adapters::matches_sea::{self, MatchUpdate};
use darts_backend::adapters::users_sea;
use darts_backend::db::with_txn;
use darts_backend::entities::matches;
use darts_backend::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use darts_backend::repos::matches as matches_repo;
use darts_backend::services::users::get_user;
use darts_backend::services::{CreateMatch, MatchService};
use darts_backend::{AppError, ErrorCode};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::common::{player, started_301, test_state, win_301_leg};

#[tokio::test]
async fn update_of_missing_match_is_not_found() -> Result<(), AppError> {
    let state = test_state().await?;

    let result = matches_sea::update_match(
        state.db(),
        MatchUpdate {
            id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_owned(),
            expected_version: 1,
            status: "waiting".to_owned(),
            document: "{}".to_owned(),
        },
    )
    .await;

    match result.map_err(DomainError::from) {
        Err(DomainError::NotFound(_, detail)) => {
            assert!(detail.contains("not found"), "detail: {detail}")
        }
        other => panic!("expected NotFound, got: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn stale_version_reports_expected_and_actual() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let created = service
        .create_match(CreateMatch::new(player("ann"), "Ann"))
        .await?;
    service
        .join_match(
            &created.id,
            player("bob"),
            "Bob",
            darts_backend::domain::JoinRole::Player,
        )
        .await?;

    let result = matches_sea::update_match(
        state.db(),
        MatchUpdate {
            id: created.id.clone(),
            expected_version: created.version,
            status: "waiting".to_owned(),
            document: serde_json::to_string(&created.state).expect("serialize"),
        },
    )
    .await;

    match result.map_err(DomainError::from) {
        Err(DomainError::Conflict(ConflictKind::OptimisticLock, detail)) => {
            assert!(detail.contains("expected version 1"), "detail: {detail}");
            assert!(detail.contains("actual version 2"), "detail: {detail}");
        }
        other => panic!("expected OptimisticLock, got: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn version_advances_by_one_per_write() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let created = service
        .create_match(CreateMatch::new(player("ann"), "Ann"))
        .await?;

    let id = created.id.clone();
    let saved = with_txn(state.db(), move |txn| {
        Box::pin(async move {
            Ok(matches_repo::save_match(txn, &id, created.version, &created.state).await?)
        })
    })
    .await?;
    assert_eq!(saved.version, 2);
    assert!(saved.updated_at >= saved.created_at);
    Ok(())
}

#[tokio::test]
async fn status_column_must_agree_with_document() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let created = service
        .create_match(CreateMatch::new(player("ann"), "Ann"))
        .await?;

    let row = matches::Entity::find_by_id(created.id.clone())
        .one(state.db())
        .await?
        .expect("match row");
    let mut active: matches::ActiveModel = row.into();
    active.status = Set("finished".to_owned());
    active.update(state.db()).await?;

    match matches_repo::require_match(state.db(), &created.id).await {
        Err(DomainError::Infra(InfraErrorKind::DataCorruption, detail)) => {
            assert!(detail.contains("disagrees"), "detail: {detail}")
        }
        other => panic!("expected DataCorruption, got: {other:?}"),
    }

    let err = service.get_match(&created.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DataCorruption);
    assert_eq!(err.status(), 500);
    Ok(())
}

#[tokio::test]
async fn stale_stats_write_loses_to_the_first_fold() -> Result<(), AppError> {
    let state = test_state().await?;
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;
    win_301_leg(&state, &match_id, &ann).await?;

    // Created at version 1, folded once.
    let row = users_sea::find_by_id(state.db(), ann.as_str())
        .await?
        .expect("user row");
    assert_eq!(row.version, 2);

    let result = users_sea::update_stats(state.db(), ann.as_str(), 1, "{}".to_owned()).await;
    match result.map_err(DomainError::from) {
        Err(DomainError::Conflict(ConflictKind::OptimisticLock, detail)) => {
            assert!(detail.contains("expected version 1"), "detail: {detail}");
            assert!(detail.contains("actual version 2"), "detail: {detail}");
        }
        other => panic!("expected OptimisticLock, got: {other:?}"),
    }

    let profile = get_user(&state, ann.as_str()).await?;
    assert_eq!(profile.stats.games_played, 1);
    assert_eq!(profile.stats.games_won, 1);
    Ok(())
}
