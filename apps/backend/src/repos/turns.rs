//! Append-only turn history.

use sea_orm::ConnectionTrait;

use crate::adapters::match_turns_sea::{self as turns_adapter, TurnInsert};
use crate::domain::match_state::TurnRecord;
use crate::errors::domain::{DomainError, InfraErrorKind};

pub async fn append_turn<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
    turn: &TurnRecord,
) -> Result<(), DomainError> {
    let turn_number = i32::try_from(turn.turn_number).map_err(|_| {
        DomainError::infra(
            InfraErrorKind::Other("TurnNumber".into()),
            format!("turn number {} out of range", turn.turn_number),
        )
    })?;
    turns_adapter::insert_turn(
        conn,
        TurnInsert {
            match_id: match_id.to_owned(),
            turn_number,
            player_id: turn.player_id.as_str().to_owned(),
            payload: serde_json::to_string(turn)?,
        },
    )
    .await?;
    Ok(())
}

/// The match's turns in commit order.
pub async fn list_turns<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    match_id: &str,
) -> Result<Vec<TurnRecord>, DomainError> {
    turns_adapter::list_by_match(conn, match_id)
        .await?
        .into_iter()
        .map(|row| {
            let turn: TurnRecord = serde_json::from_str(&row.payload)?;
            if i64::from(turn.turn_number) != i64::from(row.turn_number) {
                return Err(DomainError::infra(
                    InfraErrorKind::DataCorruption,
                    format!(
                        "turn row {} of match {match_id} carries payload for turn {}",
                        row.turn_number, turn.turn_number
                    ),
                ));
            }
            Ok(turn)
        })
        .collect()
}
