// Match lifecycle through MatchService: create, join, start, throw, finish.

use darts_backend::domain::{JoinOutcome, JoinRole, MatchStatus, MatchTransition};
use darts_backend::services::{CreateMatch, MatchService};
use darts_backend::{AppError, ErrorCode};

use crate::common::{
    double, finish_121, maximum, player, single, started_301, test_state, three_misses, treble,
    win_301_leg,
};

#[tokio::test]
async fn create_join_by_code_and_start() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));

    let created = service
        .create_match(CreateMatch::new(ann.clone(), "Ann"))
        .await?;
    assert_eq!(created.state.status, MatchStatus::Waiting);
    assert_eq!(created.state.config.starting_score, 501);
    assert_eq!(created.version, 1);

    let joined = service
        .join_match_by_code(
            &created.join_code.to_lowercase(),
            bob.clone(),
            "Bob",
            JoinRole::Player,
        )
        .await?;
    assert_eq!(joined.output, JoinOutcome::Joined);
    assert_eq!(joined.stored.version, 2);

    let again = service
        .join_match(&created.id, bob.clone(), "Bob", JoinRole::Player)
        .await?;
    assert_eq!(again.output, JoinOutcome::AlreadyJoined);

    let started = service.start_match(&created.id, ann.clone()).await?;
    assert_eq!(started.stored.state.status, MatchStatus::Playing);
    assert!(started.transitions.contains(&MatchTransition::MatchStarted));
    assert_eq!(started.stored.state.current_player_id(), Some(&ann));
    Ok(())
}

#[tokio::test]
async fn maximum_is_recorded_and_passes_the_throw() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let outcome = service.record_throws(&match_id, ann.clone(), maximum()).await?;
    assert_eq!(outcome.turn.visit_total, 180);
    assert_eq!(outcome.turn.remaining, 121);
    assert!(outcome.turn.visit_closed);
    assert!(outcome
        .transitions
        .contains(&MatchTransition::TurnBecame { player_id: bob.clone() }));
    assert_eq!(outcome.stored.state.current_player_id(), Some(&bob));
    assert!(outcome.tournament_sync.is_none());

    let turns = service.list_turns(&match_id).await?;
    assert_eq!(turns.len(), 1);
    assert_eq!(turns[0], outcome.turn);
    Ok(())
}

#[tokio::test]
async fn checkout_on_a_double_finishes_the_match() -> Result<(), AppError> {
    let state = test_state().await?;
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let outcome = win_301_leg(&state, &match_id, &ann).await?;
    assert!(outcome.turn.checkout);
    assert_eq!(outcome.stored.state.status, MatchStatus::Finished);
    assert_eq!(outcome.stored.state.winner.as_ref(), Some(&ann));
    assert!(outcome.checkout_hint.is_empty());
    assert!(outcome.transitions.iter().any(|t| matches!(
        t,
        MatchTransition::MatchFinished { winner: Some(w) } if w == &ann
    )));
    assert!(outcome
        .transitions
        .iter()
        .any(|t| matches!(t, MatchTransition::LegWon { player_id, .. } if player_id == &ann)));
    Ok(())
}

#[tokio::test]
async fn bust_leaves_the_score_alone() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    service.record_throws(&match_id, ann.clone(), maximum()).await?;
    service.record_throws(&match_id, bob.clone(), three_misses()).await?;

    // 121 left: 60 + 60 + 3 overshoots
    let bust = service
        .record_throws(&match_id, ann.clone(), vec![treble(20), treble(20), single(3)])
        .await?;
    assert!(bust.turn.busted);
    assert_eq!(bust.turn.remaining, 121);
    assert_eq!(bust.stored.state.current_player_id(), Some(&bob));
    Ok(())
}

#[tokio::test]
async fn partial_visit_keeps_the_throw_and_hints_a_finish() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    service.record_throws(&match_id, ann.clone(), maximum()).await?;
    service.record_throws(&match_id, bob.clone(), three_misses()).await?;

    let first = service
        .record_throws(&match_id, ann.clone(), vec![treble(20)])
        .await?;
    assert!(!first.turn.visit_closed);
    assert_eq!(first.stored.state.current_player_id(), Some(&ann));
    assert_eq!(first.stored.state.current_turn_darts(), 1);
    // 61 left with two darts
    assert_eq!(first.checkout_hint.len(), 2);

    let rest = service
        .record_throws(&match_id, ann.clone(), vec![treble(11), double(14)])
        .await?;
    assert!(rest.turn.checkout);
    assert_eq!(rest.stored.state.status, MatchStatus::Finished);
    assert_eq!(service.list_turns(&match_id).await?.len(), 4);
    Ok(())
}

#[tokio::test]
async fn throwing_out_of_turn_is_rejected() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let err = service
        .record_throws(&match_id, bob.clone(), maximum())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotYourTurn);
    assert_eq!(err.status(), 403);

    let stranger = service
        .record_throws(&match_id, player("eve"), maximum())
        .await
        .unwrap_err();
    assert_eq!(stranger.code(), ErrorCode::NotYourTurn);

    // Nothing was written
    assert!(service.list_turns(&match_id).await?.is_empty());
    assert_eq!(service.get_match(&match_id).await?.version, 3);
    Ok(())
}

#[tokio::test]
async fn malformed_darts_are_invalid_throws() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;

    let too_many = service
        .record_throws(
            &match_id,
            ann.clone(),
            vec![single(1), single(1), single(1), single(1)],
        )
        .await
        .unwrap_err();
    assert_eq!(too_many.code(), ErrorCode::InvalidThrow);
    assert_eq!(too_many.status(), 400);

    let none = service
        .record_throws(&match_id, ann.clone(), Vec::new())
        .await
        .unwrap_err();
    assert_eq!(none.code(), ErrorCode::InvalidThrow);
    Ok(())
}

#[tokio::test]
async fn finished_match_rejects_further_throws() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;
    win_301_leg(&state, &match_id, &ann).await?;

    let err = service
        .record_throws(&match_id, bob.clone(), maximum())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidStateTransition);
    assert_eq!(err.status(), 409);
    Ok(())
}

#[tokio::test]
async fn abandon_hands_the_match_to_the_opponent() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob) = (player("ann"), player("bob"));
    let match_id = started_301(&state, &ann, &bob).await?;
    service.record_throws(&match_id, ann.clone(), maximum()).await?;

    let outcome = service.abandon_match(&match_id, bob.clone()).await?;
    assert_eq!(outcome.stored.state.status, MatchStatus::Finished);
    assert_eq!(outcome.stored.state.winner.as_ref(), Some(&ann));
    assert_eq!(outcome.stored.state.abandoned_by.as_ref(), Some(&bob));
    assert!(outcome
        .transitions
        .contains(&MatchTransition::MatchAbandoned { by: bob.clone() }));

    let again = service
        .abandon_match(&match_id, ann.clone())
        .await
        .unwrap_err();
    assert_eq!(again.code(), ErrorCode::InvalidStateTransition);

    let outsider = player("eve");
    let other = service.create_match(CreateMatch::new(ann.clone(), "Ann")).await?;
    let err = service
        .abandon_match(&other.id, outsider)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAPlayer);
    Ok(())
}

#[tokio::test]
async fn lobby_rules_are_enforced() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let (ann, bob, cy) = (player("ann"), player("bob"), player("cy"));

    let created = service
        .create_match(CreateMatch::new(ann.clone(), "Ann"))
        .await?;

    let err = service.start_match(&created.id, ann.clone()).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotEnoughPlayers);

    service
        .join_match(&created.id, bob.clone(), "Bob", JoinRole::Player)
        .await?;
    let full = service
        .join_match(&created.id, cy.clone(), "Cy", JoinRole::Player)
        .await
        .unwrap_err();
    assert_eq!(full.code(), ErrorCode::RosterFull);

    let not_host = service.start_match(&created.id, bob.clone()).await.unwrap_err();
    assert_eq!(not_host.code(), ErrorCode::NotHost);

    service.start_match(&created.id, ann.clone()).await?;
    let spectator = service
        .join_match(&created.id, cy.clone(), "Cy", JoinRole::Spectator)
        .await?;
    assert_eq!(spectator.output, JoinOutcome::Joined);
    assert!(spectator.stored.state.spectators.contains(&cy));
    Ok(())
}

#[tokio::test]
async fn creation_validates_game_type_and_roster_size() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);
    let ann = player("ann");

    let odd_score = service
        .create_match(CreateMatch::new(ann.clone(), "Ann").with_starting_score(250))
        .await
        .unwrap_err();
    assert_eq!(odd_score.code(), ErrorCode::InvalidConfig);

    let crowded = service
        .create_match(CreateMatch::new(ann.clone(), "Ann").with_max_players(6))
        .await
        .unwrap_err();
    assert_eq!(crowded.code(), ErrorCode::InvalidConfig);

    let seven_oh_one = service
        .create_match(CreateMatch::new(ann, "Ann").with_starting_score(701))
        .await?;
    assert_eq!(seven_oh_one.state.players[0].current_score, 701);
    Ok(())
}

#[tokio::test]
async fn unknown_matches_are_not_found() -> Result<(), AppError> {
    let state = test_state().await?;
    let service = MatchService::new(&state);

    let err = service.get_match("01ARZ3NDEKTSV4RRFFQ69G5FAV").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::MatchNotFound);
    assert_eq!(err.status(), 404);

    let by_code = service
        .join_match_by_code("??", player("ann"), "Ann", JoinRole::Player)
        .await
        .unwrap_err();
    assert_eq!(by_code.code(), ErrorCode::MatchNotFound);

    let throw = service
        .record_throws("missing", player("ann"), finish_121())
        .await
        .unwrap_err();
    assert_eq!(throw.code(), ErrorCode::MatchNotFound);
    Ok(())
}
