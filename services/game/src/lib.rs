//! Backend for the browser puzzle game
//!
//! Authenticates players with server-side sessions, records finished games
//! and serves the leaderboard and each player's own history as JSON under
//! `/api`. The client bundle is served from a static directory.

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{GameError, GameResult};
pub use state::AppState;
