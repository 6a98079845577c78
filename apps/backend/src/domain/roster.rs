//! Player identity and roster-keyed maps.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};

/// Opaque identity supplied by the caller's identity provider.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Map from player to a fixed-shape record, keyed by exactly the roster.
///
/// Built from the roster, so lookups for anyone outside it fail instead of
/// silently creating an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerStatsMap<T>(BTreeMap<PlayerId, T>);

impl<T> Default for PlayerStatsMap<T> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<T: Default> PlayerStatsMap<T> {
    pub fn for_roster<'a>(roster: impl IntoIterator<Item = &'a PlayerId>) -> Self {
        Self(
            roster
                .into_iter()
                .map(|id| (id.clone(), T::default()))
                .collect(),
        )
    }

    /// Adds a default entry for a new roster member; existing entries are kept.
    pub fn admit(&mut self, id: &PlayerId) {
        self.0.entry(id.clone()).or_default();
    }
}

impl<T> PlayerStatsMap<T> {
    pub fn get(&self, id: &PlayerId) -> Result<&T, DomainError> {
        self.0.get(id).ok_or_else(|| unknown(id))
    }

    pub fn get_mut(&mut self, id: &PlayerId) -> Result<&mut T, DomainError> {
        self.0.get_mut(id).ok_or_else(|| unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &T)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Checks that the keys are exactly `roster`. Used on decoded documents.
    pub fn check_keys<'a>(
        &self,
        roster: impl IntoIterator<Item = &'a PlayerId>,
    ) -> Result<(), DomainError> {
        let roster: Vec<&PlayerId> = roster.into_iter().collect();
        let matches = roster.len() == self.0.len() && roster.iter().all(|id| self.0.contains_key(id));
        if matches {
            Ok(())
        } else {
            Err(DomainError::infra(
                InfraErrorKind::DataCorruption,
                "player map keys do not match the roster",
            ))
        }
    }
}

fn unknown(id: &PlayerId) -> DomainError {
    DomainError::validation(
        ValidationKind::NotAPlayer,
        format!("{id} is not on the roster"),
    )
}
