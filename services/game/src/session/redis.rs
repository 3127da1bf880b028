//! Redis-backed session store, shared by every instance of the service

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use common::cache::RedisPool;

use super::{SessionError, SessionId, SessionState, SessionStore};

/// Session store keeping state in Redis under `<prefix>:session:<id>` with a TTL
#[derive(Clone)]
pub struct RedisSessionStore {
    redis_pool: Arc<RedisPool>,
}

impl RedisSessionStore {
    /// Create a new Redis session store
    pub fn new(redis_pool: Arc<RedisPool>) -> Self {
        Self { redis_pool }
    }

    fn session_key(id: &SessionId) -> String {
        format!("session:{}", id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError> {
        Ok(self.redis_pool.get_json(&Self::session_key(id)).await?)
    }

    async fn save(
        &self,
        id: &SessionId,
        state: &SessionState,
        ttl: Duration,
    ) -> Result<(), SessionError> {
        self.redis_pool
            .set_json(&Self::session_key(id), state, ttl)
            .await?;
        Ok(())
    }

    async fn clear(&self, id: &SessionId) -> Result<(), SessionError> {
        self.redis_pool.delete(&Self::session_key(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::cache::RedisConfig;

    #[test]
    fn test_session_key_format() {
        let id = SessionId::parse("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap();
        assert_eq!(
            RedisSessionStore::session_key(&id),
            "session:67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[tokio::test]
    #[ignore = "requires a running Redis instance"]
    async fn test_save_load_clear() {
        let pool = RedisPool::new(&RedisConfig::default()).await.unwrap();
        let store = RedisSessionStore::new(Arc::new(pool));
        let id = SessionId::generate();
        let state = SessionState { user_id: Some(11) };

        store.save(&id, &state, Duration::from_secs(30)).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), Some(state));

        store.clear(&id).await.unwrap();
        assert_eq!(store.load(&id).await.unwrap(), None);
    }
}
