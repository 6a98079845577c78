//! DTOs for the matches_sea adapter.

/// Row for a freshly created match. Version starts at 1.
#[derive(Debug, Clone)]
pub struct MatchCreate {
    pub id: String,
    pub join_code: String,
    pub tournament_id: Option<String>,
    pub status: String,
    pub document: String,
}

/// Whole-document replacement guarded by `expected_version`.
#[derive(Debug, Clone)]
pub struct MatchUpdate {
    pub id: String,
    pub expected_version: i32,
    pub status: String,
    pub document: String,
}
