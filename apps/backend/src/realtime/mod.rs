//! In-process change notification for match documents.

pub mod hub;

pub use hub::{MatchHub, MatchSubscription, MatchUpdate};
