//! Game service models

pub mod history;
pub mod user;

// Re-export for convenience
pub use history::{HistoryEntry, NewHistory, RankingEntry};
pub use user::{NewUser, User, UserSummary};
