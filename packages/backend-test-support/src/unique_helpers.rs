//! Unique identifiers so tests sharing a database never collide.

use ulid::Ulid;

/// `{prefix}-{ulid}`
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// A player id the way the identity provider would hand it over.
pub fn unique_player(name: &str) -> String {
    unique_str(&format!("player-{name}"))
}
