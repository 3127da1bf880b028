//! Application state shared across handlers

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::SqlitePool;

use crate::{
    repositories::{HistoryRepository, UserRepository},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub history_repository: HistoryRepository,
    pub sessions: SessionManager,
}

impl AppState {
    /// Build the state around an already migrated pool
    pub fn new(db_pool: SqlitePool, sessions: SessionManager) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            history_repository: HistoryRepository::new(db_pool.clone()),
            db_pool,
            sessions,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.key().clone()
    }
}
