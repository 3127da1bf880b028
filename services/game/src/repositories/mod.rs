//! Repositories for database operations

pub mod history;
pub mod user;

pub use history::HistoryRepository;
pub use user::UserRepository;
