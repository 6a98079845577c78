pub mod match_turns;
pub mod matches;
pub mod tournaments;
pub mod users;

pub use match_turns::Entity as MatchTurns;
pub use match_turns::Model as MatchTurn;
pub use matches::Entity as Matches;
pub use matches::Model as Match;
pub use tournaments::Entity as Tournaments;
pub use tournaments::Model as Tournament;
pub use users::Entity as Users;
pub use users::Model as User;
