//! Shared helpers for the backend's integration tests.

pub mod logging;
pub mod unique_helpers;
