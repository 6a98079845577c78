#![allow(dead_code)]

// tests/common/mod.rs
use backend_test_support::unique_helpers::unique_player;
use darts_backend::domain::{DartThrow, PlayerId, Ring};
use darts_backend::services::{CreateMatch, MatchService, ThrowOutcome};
use darts_backend::{build_state, AppError, AppState, EngineConfig};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Fresh in-memory database, migrated, with default engine settings.
pub async fn test_state() -> Result<AppState, AppError> {
    build_state()
        .with_engine(EngineConfig::default())
        .build()
        .await
}

pub fn player(name: &str) -> PlayerId {
    PlayerId::new(unique_player(name))
}

pub fn single(segment: u8) -> DartThrow {
    DartThrow::new(segment, Ring::Single).expect("valid single")
}

pub fn double(segment: u8) -> DartThrow {
    DartThrow::new(segment, Ring::Double).expect("valid double")
}

pub fn treble(segment: u8) -> DartThrow {
    DartThrow::new(segment, Ring::Triple).expect("valid triple")
}

pub fn maximum() -> Vec<DartThrow> {
    vec![treble(20), treble(20), treble(20)]
}

pub fn three_misses() -> Vec<DartThrow> {
    vec![DartThrow::miss(), DartThrow::miss(), DartThrow::miss()]
}

/// 60 + 33 + 28 after a maximum closes out 301.
pub fn finish_121() -> Vec<DartThrow> {
    vec![treble(20), treble(11), double(14)]
}

/// A started single-leg 301 match between `host` and `guest`.
pub async fn started_301(
    state: &AppState,
    host: &PlayerId,
    guest: &PlayerId,
) -> Result<String, AppError> {
    let service = MatchService::new(state);
    let created = service
        .create_match(CreateMatch::new(host.clone(), "Host").with_starting_score(301).with_legs(1, 1))
        .await?;
    service
        .join_match(&created.id, guest.clone(), "Guest", darts_backend::domain::JoinRole::Player)
        .await?;
    service.start_match(&created.id, host.clone()).await?;
    Ok(created.id)
}

/// Plays out a 301 leg the first thrower wins in three visits: maximum,
/// opponent misses, 121 checkout. `actor` submits every visit.
pub async fn win_301_leg(
    state: &AppState,
    match_id: &str,
    actor: &PlayerId,
) -> Result<ThrowOutcome, AppError> {
    let service = MatchService::new(state);
    service
        .record_throws(match_id, actor.clone(), maximum())
        .await?;
    service
        .record_throws(match_id, actor.clone(), three_misses())
        .await?;
    service
        .record_throws(match_id, actor.clone(), finish_121())
        .await
}
