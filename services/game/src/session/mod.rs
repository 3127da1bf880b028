//! Server-side sessions
//!
//! A session is identified by a random id carried in a signed cookie. The
//! state itself lives in a [`SessionStore`]; [`SessionManager`] ties the
//! cookie policy and the store together and implements the login/logout
//! lifecycle.

mod memory;
mod redis;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ConfigError, MIN_SECRET_LEN, SessionConfig};

pub use memory::MemorySessionStore;
pub use redis::RedisSessionStore;

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an id from a cookie value
    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Data kept for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub user_id: Option<i64>,
}

/// Pluggable storage for session state
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load the state of a live session
    async fn load(&self, id: &SessionId) -> Result<Option<SessionState>, SessionError>;

    /// Store the state of a session, replacing any previous value
    async fn save(
        &self,
        id: &SessionId,
        state: &SessionState,
        ttl: Duration,
    ) -> Result<(), SessionError>;

    /// Forget a session. Clearing an unknown id is not an error.
    async fn clear(&self, id: &SessionId) -> Result<(), SessionError>;
}

/// Derive the cookie signing key from the configured secret
///
/// Without a secret a random key is generated, so sessions do not survive a
/// restart. Secrets shorter than [`MIN_SECRET_LEN`] bytes are rejected.
pub fn signing_key(secret: Option<&str>) -> Result<Key, ConfigError> {
    match secret {
        Some(secret) if secret.len() < MIN_SECRET_LEN => Err(ConfigError::SecretTooShort),
        Some(secret) => Ok(Key::derive_from(secret.as_bytes())),
        None => {
            warn!("No session secret configured; using a random signing key");
            Ok(Key::generate())
        }
    }
}

/// Session lifecycle on top of a [`SessionStore`]
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    key: Key,
    cookie_name: String,
    lifetime: Duration,
    secure: bool,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(store: Arc<dyn SessionStore>, key: Key, config: &SessionConfig) -> Self {
        Self {
            store,
            key,
            cookie_name: config.cookie_name.clone(),
            lifetime: Duration::from_secs(config.lifetime_secs()),
            secure: config.secure,
        }
    }

    /// Key used to sign session cookies
    pub fn key(&self) -> &Key {
        &self.key
    }

    fn session_id(&self, jar: &SignedCookieJar) -> Option<SessionId> {
        jar.get(&self.cookie_name)
            .and_then(|cookie| SessionId::parse(cookie.value()))
    }

    /// Load the session referenced by the request's cookie, if any
    pub async fn current(
        &self,
        jar: &SignedCookieJar,
    ) -> Result<Option<(SessionId, SessionState)>, SessionError> {
        let Some(id) = self.session_id(jar) else {
            return Ok(None);
        };

        Ok(self.store.load(&id).await?.map(|state| (id, state)))
    }

    /// Id of the authenticated user, if the request carries a live session
    pub async fn user_id(&self, jar: &SignedCookieJar) -> Result<Option<i64>, SessionError> {
        Ok(self
            .current(jar)
            .await?
            .and_then(|(_, state)| state.user_id))
    }

    /// Start an authenticated session for `user_id`
    ///
    /// Any session the client already holds is discarded first and a new id
    /// is issued, so an id obtained before login is never authenticated.
    pub async fn establish(
        &self,
        jar: SignedCookieJar,
        user_id: i64,
    ) -> Result<SignedCookieJar, SessionError> {
        if let Some(old) = self.session_id(&jar) {
            self.store.clear(&old).await?;
        }

        let id = SessionId::generate();
        let state = SessionState {
            user_id: Some(user_id),
        };
        self.store.save(&id, &state, self.lifetime).await?;
        info!("Session established for user: {}", user_id);

        Ok(jar.add(self.session_cookie(&id)))
    }

    /// End the current session, if any, and expire the cookie
    pub async fn destroy(&self, jar: SignedCookieJar) -> Result<SignedCookieJar, SessionError> {
        if let Some(id) = self.session_id(&jar) {
            self.store.clear(&id).await?;
        }

        Ok(jar.remove(self.removal_cookie()))
    }

    fn session_cookie(&self, id: &SessionId) -> Cookie<'static> {
        let max_age =
            time::Duration::seconds(i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX));

        Cookie::build(Cookie::new(self.cookie_name.clone(), id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }

    fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(Cookie::new(self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }
}
