//! In-process session store

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{SessionError, SessionId, SessionState, SessionStore};

#[derive(Debug)]
struct MemoryEntry {
    state: SessionState,
    expires_at: Instant,
}

/// Session store keeping state in a process-local map
///
/// Sessions are lost on restart and are not shared between processes.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    entries: Arc<Mutex<HashMap<SessionId, MemoryEntry>>>,
}

impl MemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions that have not expired yet
    pub async fn active_sessions(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
        let mut entries = self.entries.lock().await;

        match entries.get(id) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.state.clone())),
            Some(_) => {
                entries.remove(id);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        id: &SessionId,
        state: &SessionState,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        let now = Instant::now();
        let entry = MemoryEntry {
            state: state.clone(),
            expires_at: now + ttl,
        };

        let mut entries = self.entries.lock().await;
        // expired sessions are reclaimed on write, also those never loaded again
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(*id, entry);
        Ok(())
    }

    async fn clear(&self, id: &SessionId) -> Result<(), SessionError> {
        self.entries.lock().await.remove(id);
        Ok(())
    }
}
