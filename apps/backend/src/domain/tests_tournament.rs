//! Tournament orchestration scenarios (pure domain, no DB).

use crate::domain::match_state::MatchSummary;
use crate::domain::roster::PlayerId;
use crate::domain::stats::PlayerResult;
use crate::domain::tournament::{
    BonusConfig, PairingKind, ResultOutcome, Tournament, TournamentConfig, TournamentMode,
    TournamentStatus,
};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

const NAMES: [&str; 5] = ["ann", "bob", "cy", "dee", "eve"];

fn pid(name: &str) -> PlayerId {
    PlayerId::from(name)
}

fn config(mode: TournamentMode) -> TournamentConfig {
    TournamentConfig {
        mode,
        max_players: 4,
        starting_score: 301,
        legs_to_win: 2,
        sets_to_win: 1,
        bonus: BonusConfig::default(),
        enable_third_place: false,
    }
}

fn lobby(config: TournamentConfig, players: usize) -> Tournament {
    let mut tournament = Tournament::new(pid(NAMES[0]), "Ann", config, 7).unwrap();
    for name in &NAMES[1..players] {
        tournament.join(pid(name), *name).unwrap();
    }
    for name in &NAMES[..players] {
        tournament.set_ready(&pid(name), true).unwrap();
    }
    tournament
}

fn result(id: &PlayerId, won: bool, legs_won: u32, legs_lost: u32) -> PlayerResult {
    PlayerResult {
        player_id: id.clone(),
        won,
        legs_won,
        legs_lost,
        sets_won: u32::from(won),
        maximums: 0,
        big_fish: 0,
        bull_finishes: 0,
        average: 45.0,
        highest_turn: 100,
        highest_checkout: if won { 40 } else { 0 },
        darts_thrown: 30,
    }
}

fn summary(winner: &PlayerId, loser: &PlayerId, loser_legs: u32) -> MatchSummary {
    MatchSummary {
        winner: Some(winner.clone()),
        abandoned_by: None,
        results: vec![result(winner, true, 2, loser_legs), result(loser, false, loser_legs, 2)],
    }
}

/// Attaches a match id to every pending pairing and returns `(match_id, home, away)`.
fn attach_round(tournament: &mut Tournament) -> Vec<(String, PlayerId, PlayerId)> {
    tournament
        .pending_pairings()
        .into_iter()
        .map(|p| {
            let match_id = format!("m-{}-{}", p.round, p.slot);
            tournament
                .attach_match(p.round, p.slot, match_id.clone())
                .unwrap();
            (match_id, p.home.unwrap(), p.away.unwrap())
        })
        .collect()
}

fn ready_everyone(tournament: &mut Tournament) {
    let ids: Vec<PlayerId> = tournament.players.iter().map(|p| p.id.clone()).collect();
    for id in ids {
        tournament.set_ready(&id, true).unwrap();
    }
}

fn assert_validation<T: std::fmt::Debug>(result: Result<T, DomainError>, kind: ValidationKind) {
    match result {
        Err(DomainError::Validation(actual, _)) => assert_eq!(actual, kind),
        other => panic!("expected {kind:?}, got {other:?}"),
    }
}

#[test]
fn group_round_robin_runs_to_completion() {
    let mut tournament = lobby(config(TournamentMode::Group), 4);
    tournament.start(&pid("ann")).unwrap();
    assert_eq!(tournament.status, TournamentStatus::InProgress);
    assert_eq!(tournament.total_rounds, 3);
    assert_eq!(tournament.pairings.len(), 6);

    for round in 1..=3 {
        assert_eq!(tournament.current_round, round);
        let matches = attach_round(&mut tournament);
        assert_eq!(matches.len(), 2);
        assert_eq!(tournament.active_matches.len(), 2);

        for (i, (match_id, home, away)) in matches.iter().enumerate() {
            // Ann wins every match she plays; otherwise home wins.
            let (winner, loser) = if away == &pid("ann") {
                (away, home)
            } else {
                (home, away)
            };
            let outcome = tournament
                .record_result(match_id, &summary(winner, loser, 1))
                .unwrap();
            let last = i == matches.len() - 1;
            assert_eq!(
                outcome,
                ResultOutcome::Recorded {
                    round_completed: last,
                    tournament_completed: last && round == 3,
                }
            );
        }

        if round < 3 {
            assert!(tournament.round_complete);
            assert!(tournament.players.iter().all(|p| !p.ready));
            assert!(tournament.start_round(&pid("ann")).is_err());
            ready_everyone(&mut tournament);
            assert_eq!(tournament.start_round(&pid("ann")).unwrap().len(), 2);
        }
    }

    assert_eq!(tournament.status, TournamentStatus::Completed);
    assert_eq!(tournament.champion, Some(pid("ann")));
    assert!(tournament.active_matches.is_empty());
    assert_eq!(tournament.completed_matches.len(), 6);

    let ann = tournament.standings.get(&pid("ann")).unwrap();
    assert_eq!(ann.points, 9);
    assert_eq!(ann.games_won, 3);
    assert_eq!(ann.legs_won, 6);
    assert_eq!(ann.legs_lost, 3);
    let games: u32 = tournament
        .standings
        .iter()
        .map(|(_, s)| s.games_won + s.games_lost)
        .sum();
    assert_eq!(games, 12);
}

#[test]
fn bracket_with_third_place() {
    let mut cfg = config(TournamentMode::Bracket);
    cfg.enable_third_place = true;
    let mut tournament = lobby(cfg, 4);
    let first = tournament.start(&pid("ann")).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(tournament.total_rounds, 2);

    let semis = attach_round(&mut tournament);
    let mut semi_winners = Vec::new();
    let mut semi_losers = Vec::new();
    for (match_id, home, away) in &semis {
        tournament
            .record_result(match_id, &summary(home, away, 0))
            .unwrap();
        semi_winners.push(home.clone());
        semi_losers.push(away.clone());
    }
    assert_eq!(tournament.current_round, 2);

    ready_everyone(&mut tournament);
    let finals = tournament.start_round(&pid("ann")).unwrap();
    assert_eq!(finals.len(), 2);
    let final_pairing = finals
        .iter()
        .find(|p| p.kind == PairingKind::Regular)
        .unwrap();
    let third_pairing = finals
        .iter()
        .find(|p| p.kind == PairingKind::ThirdPlace)
        .unwrap();
    let mut finalists = vec![
        final_pairing.home.clone().unwrap(),
        final_pairing.away.clone().unwrap(),
    ];
    finalists.sort();
    semi_winners.sort();
    assert_eq!(finalists, semi_winners);
    let mut third = vec![
        third_pairing.home.clone().unwrap(),
        third_pairing.away.clone().unwrap(),
    ];
    third.sort();
    semi_losers.sort();
    assert_eq!(third, semi_losers);

    let matches = attach_round(&mut tournament);
    let mut champion = None;
    for (match_id, home, away) in &matches {
        tournament
            .record_result(match_id, &summary(home, away, 1))
            .unwrap();
        if match_id == "m-2-1" {
            champion = Some(home.clone());
        }
    }
    assert_eq!(tournament.status, TournamentStatus::Completed);
    assert_eq!(tournament.champion, champion);
}

#[test]
fn odd_bracket_gives_a_bye() {
    let mut tournament = lobby(config(TournamentMode::Bracket), 3);
    let pending = tournament.start(&pid("ann")).unwrap();
    assert_eq!(pending.len(), 1);

    let bye = tournament
        .pairings
        .iter()
        .find(|p| p.round == 1 && p.is_bye())
        .cloned()
        .unwrap();
    let lucky = bye.winner.clone().unwrap();
    let final_pairing = tournament
        .pairings
        .iter()
        .find(|p| p.round == 2)
        .unwrap();
    assert!(final_pairing.home.as_ref() == Some(&lucky) || final_pairing.away.as_ref() == Some(&lucky));

    let matches = attach_round(&mut tournament);
    let (match_id, home, away) = &matches[0];
    tournament
        .record_result(match_id, &summary(home, away, 0))
        .unwrap();

    ready_everyone(&mut tournament);
    let finals = tournament.start_round(&pid("ann")).unwrap();
    assert_eq!(finals.len(), 1);
    let players = [finals[0].home.clone().unwrap(), finals[0].away.clone().unwrap()];
    assert!(players.contains(&lucky));
    assert!(players.contains(home));
}

#[test]
fn bonus_points_follow_the_config() {
    let mut tournament = lobby(config(TournamentMode::Group), 2);
    tournament.start(&pid("ann")).unwrap();
    let (match_id, home, away) = attach_round(&mut tournament).remove(0);

    let mut report = summary(&home, &away, 1);
    report.results[0].maximums = 2;
    report.results[0].big_fish = 1;
    report.results[0].bull_finishes = 1;
    report.results[1].maximums = 1;
    tournament.record_result(&match_id, &report).unwrap();

    let winner = tournament.standings.get(&home).unwrap();
    assert_eq!(winner.bonus_points, 2 * 2 + 2 + 1);
    assert_eq!(winner.points, 3 + 7);
    let loser = tournament.standings.get(&away).unwrap();
    assert_eq!(loser.bonus_points, 2);
    assert_eq!(loser.points, 1 + 2);
}

#[test]
fn disabled_bonus_is_not_awarded() {
    let mut cfg = config(TournamentMode::Group);
    cfg.bonus.enable_180s = false;
    let mut tournament = lobby(cfg, 2);
    tournament.start(&pid("ann")).unwrap();
    let (match_id, home, away) = attach_round(&mut tournament).remove(0);

    let mut report = summary(&home, &away, 0);
    report.results[0].maximums = 3;
    report.results[0].bull_finishes = 1;
    tournament.record_result(&match_id, &report).unwrap();

    assert_eq!(tournament.standings.get(&home).unwrap().points, 3 + 1);
}

#[test]
fn loser_without_a_leg_scores_nothing() {
    let mut tournament = lobby(config(TournamentMode::Group), 2);
    tournament.start(&pid("ann")).unwrap();
    let (match_id, home, away) = attach_round(&mut tournament).remove(0);
    tournament
        .record_result(&match_id, &summary(&home, &away, 0))
        .unwrap();

    let loser = tournament.standings.get(&away).unwrap();
    assert_eq!(loser.points, 0);
    assert_eq!(loser.games_lost, 1);
    assert_eq!(tournament.status, TournamentStatus::Completed);
    assert_eq!(tournament.champion, Some(home));
}

#[test]
fn recording_twice_is_a_no_op() {
    let mut tournament = lobby(config(TournamentMode::Group), 4);
    tournament.start(&pid("ann")).unwrap();
    let (match_id, home, away) = attach_round(&mut tournament).remove(0);
    let report = summary(&home, &away, 1);

    tournament.record_result(&match_id, &report).unwrap();
    let before = tournament.clone();
    assert_eq!(
        tournament.record_result(&match_id, &report).unwrap(),
        ResultOutcome::AlreadyRecorded
    );
    assert_eq!(tournament, before);
}

#[test]
fn unknown_match_is_not_found() {
    let mut tournament = lobby(config(TournamentMode::Group), 2);
    tournament.start(&pid("ann")).unwrap();
    match tournament.record_result("nope", &summary(&pid("ann"), &pid("bob"), 0)) {
        Err(DomainError::NotFound(NotFoundKind::Match, _)) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn winner_must_come_from_the_pairing() {
    let mut tournament = lobby(config(TournamentMode::Group), 4);
    tournament.start(&pid("ann")).unwrap();
    let (match_id, home, _) = attach_round(&mut tournament).remove(0);
    let stranger = pid("zed");
    assert_validation(
        tournament.record_result(&match_id, &summary(&stranger, &home, 0)),
        ValidationKind::InvalidStateTransition,
    );
}

#[test]
fn max_players_must_be_allowed() {
    let mut cfg = config(TournamentMode::Bracket);
    cfg.max_players = 5;
    assert_validation(
        Tournament::new(pid("ann"), "Ann", cfg, 1),
        ValidationKind::InvalidConfig,
    );
}

#[test]
fn start_guards() {
    let mut tournament = Tournament::new(pid("ann"), "Ann", config(TournamentMode::Group), 1).unwrap();
    tournament.set_ready(&pid("ann"), true).unwrap();
    assert_validation(tournament.start(&pid("ann")), ValidationKind::NotEnoughPlayers);

    assert!(tournament.join(pid("bob"), "Bob").unwrap());
    assert!(!tournament.join(pid("bob"), "Bob").unwrap());
    assert_validation(tournament.start(&pid("bob")), ValidationKind::NotHost);
    assert_validation(
        tournament.start(&pid("ann")),
        ValidationKind::InvalidStateTransition,
    );
    assert_validation(
        tournament.set_ready(&pid("zed"), true),
        ValidationKind::NotAPlayer,
    );

    tournament.join(pid("cy"), "Cy").unwrap();
    tournament.join(pid("dee"), "Dee").unwrap();
    assert_validation(tournament.join(pid("eve"), "Eve"), ValidationKind::RosterFull);

    ready_everyone(&mut tournament);
    tournament.start(&pid("ann")).unwrap();
    assert_validation(
        tournament.join(pid("eve"), "Eve"),
        ValidationKind::InvalidStateTransition,
    );
}

#[test]
fn standings_rank_by_points_then_leg_difference() {
    let mut tournament = lobby(config(TournamentMode::Group), 4);
    tournament.start(&pid("ann")).unwrap();
    let matches = attach_round(&mut tournament);
    // Both winners get 3 points; the 2-0 winner has the better leg difference.
    let (first_id, first_home, first_away) = &matches[0];
    let (second_id, second_home, second_away) = &matches[1];
    tournament
        .record_result(first_id, &summary(first_home, first_away, 1))
        .unwrap();
    tournament
        .record_result(second_id, &summary(second_home, second_away, 0))
        .unwrap();

    let ranked = tournament.ranked_standings();
    assert_eq!(&ranked[0].0, second_home);
    assert_eq!(&ranked[1].0, first_home);
    assert_eq!(&ranked[2].0, first_away);
    assert_eq!(&ranked[3].0, second_away);
}

#[test]
fn document_round_trips_through_json() {
    let mut tournament = lobby(config(TournamentMode::Bracket), 4);
    tournament.start(&pid("ann")).unwrap();
    attach_round(&mut tournament);
    let json = serde_json::to_string(&tournament).unwrap();
    let back: Tournament = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tournament);
    assert!(back.check_integrity().is_ok());
}
