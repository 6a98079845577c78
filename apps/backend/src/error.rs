use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{ConflictKind, InfraErrorKind, NotFoundKind, ValidationKind};
use crate::errors::{DomainError, ErrorCode};

/// Problem-details payload the HTTP adapter returns for a failed call.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        detail: String,
        status: u16,
    },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Database error: {detail}")]
    Db { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Db { code, .. }
            | AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::Validation { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::Db { detail, .. }
            | AppError::Internal { detail, .. }
            | AppError::Config { detail } => detail,
        }
    }

    /// HTTP-equivalent status for the pass-through adapter.
    pub fn status(&self) -> u16 {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Db { code, .. } if *code == ErrorCode::DbTimeout => 504,
            AppError::Db { code, .. } if *code == ErrorCode::DbUnavailable => 503,
            AppError::Db { .. } => 500,
            AppError::Internal { .. } => 500,
            AppError::Config { .. } => 500,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            status: 400,
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn db(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Db {
            code,
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn concurrent_modification(detail: impl Into<String>) -> Self {
        Self::conflict(ErrorCode::ConcurrentModification, detail)
    }

    pub fn is_optimistic_lock(&self) -> bool {
        self.code() == ErrorCode::OptimisticLock
    }

    pub fn to_problem_details(&self) -> ProblemDetails {
        let code = self.code().as_str();
        ProblemDetails {
            type_: format!("https://darts.invalid/errors/{code}"),
            title: Self::humanize_code(code),
            status: self.status(),
            detail: self.detail().to_string(),
            code: code.to_string(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let lower = word.to_lowercase();
                let mut chars = lower.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(kind, detail) => match kind {
                ValidationKind::InvalidThrow => AppError::invalid(ErrorCode::InvalidThrow, detail),
                ValidationKind::NotYourTurn => {
                    AppError::forbidden(ErrorCode::NotYourTurn, detail)
                }
                ValidationKind::NotAPlayer => AppError::forbidden(ErrorCode::NotAPlayer, detail),
                ValidationKind::NotHost => AppError::forbidden(ErrorCode::NotHost, detail),
                ValidationKind::InvalidStateTransition => {
                    AppError::conflict(ErrorCode::InvalidStateTransition, detail)
                }
                ValidationKind::NotEnoughPlayers => {
                    AppError::invalid(ErrorCode::NotEnoughPlayers, detail)
                }
                ValidationKind::RosterFull => AppError::invalid(ErrorCode::RosterFull, detail),
                ValidationKind::InvalidConfig => {
                    AppError::invalid(ErrorCode::InvalidConfig, detail)
                }
                ValidationKind::Other(tag) => AppError::invalid(
                    ErrorCode::ValidationError,
                    format!("{tag}: {detail}"),
                ),
            },
            DomainError::Conflict(kind, detail) => match kind {
                ConflictKind::OptimisticLock => {
                    AppError::conflict(ErrorCode::OptimisticLock, detail)
                }
                ConflictKind::JoinCodeConflict => {
                    AppError::conflict(ErrorCode::JoinCodeConflict, detail)
                }
                ConflictKind::DuplicateTurn => {
                    AppError::conflict(ErrorCode::DuplicateTurn, detail)
                }
                ConflictKind::Other(_) => AppError::conflict(ErrorCode::Conflict, detail),
            },
            DomainError::NotFound(kind, detail) => match kind {
                NotFoundKind::Match => AppError::not_found(ErrorCode::MatchNotFound, detail),
                NotFoundKind::Tournament => {
                    AppError::not_found(ErrorCode::TournamentNotFound, detail)
                }
                NotFoundKind::User => AppError::not_found(ErrorCode::UserNotFound, detail),
                NotFoundKind::Other(_) => AppError::not_found(ErrorCode::NotFound, detail),
            },
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::db(ErrorCode::DbTimeout, detail),
                InfraErrorKind::DbUnavailable => AppError::db(ErrorCode::DbUnavailable, detail),
                InfraErrorKind::DataCorruption => {
                    AppError::internal(ErrorCode::DataCorruption, detail)
                }
                InfraErrorKind::Other(_) => AppError::db(ErrorCode::DbError, detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::from(DomainError::from(e))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}
