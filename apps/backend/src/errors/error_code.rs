//! Error codes for the darts backend.
//!
//! This module defines all error codes surfaced to callers of the service
//! layer. Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! the HTTP adapter puts into its responses.

use core::fmt;

/// Centralized error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Actor is not the player whose turn it is (and not the arbiter)
    NotYourTurn,
    /// Actor is not a member of the match or tournament
    NotAPlayer,
    /// Operation is reserved to the host
    NotHost,

    // Request Validation
    /// Malformed dart data or too many darts in a turn
    InvalidThrow,
    /// Operation not allowed in the current status
    InvalidStateTransition,
    /// Fewer players than the operation needs
    NotEnoughPlayers,
    /// Roster is at capacity
    RosterFull,
    /// Invalid match or tournament configuration
    InvalidConfig,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Match not found
    MatchNotFound,
    /// Tournament not found
    TournamentNotFound,
    /// User not found
    UserNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Version mismatch on a single attempt (retryable)
    OptimisticLock,
    /// Concurrent writers kept winning until the retry budget ran out
    ConcurrentModification,
    /// Join code already exists
    JoinCodeConflict,
    /// Turn number already recorded for this match
    DuplicateTurn,
    /// Generic conflict (fallback for unmatched conflicts)
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Database timeout
    DbTimeout,
    /// Internal error
    Internal,
    /// Configuration error
    ConfigError,
    /// Stored document could not be decoded
    DataCorruption,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::NotAPlayer => "NOT_A_PLAYER",
            Self::NotHost => "NOT_HOST",

            Self::InvalidThrow => "INVALID_THROW",
            Self::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            Self::NotEnoughPlayers => "NOT_ENOUGH_PLAYERS",
            Self::RosterFull => "ROSTER_FULL",
            Self::InvalidConfig => "INVALID_CONFIG",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::MatchNotFound => "MATCH_NOT_FOUND",
            Self::TournamentNotFound => "TOURNAMENT_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            Self::DuplicateTurn => "DUPLICATE_TURN",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
            Self::DataCorruption => "DATA_CORRUPTION",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
