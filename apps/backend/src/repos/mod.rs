//! Domain-facing persistence functions. Everything here returns `DomainError`.

pub mod matches;
pub mod tournaments;
pub mod turns;
pub mod users;
