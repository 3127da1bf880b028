//! Service configuration
//!
//! Values come from built-in defaults, then an optional `game.toml` in the
//! working directory, then `GAME_`-prefixed environment variables using `__`
//! to separate nested keys (`GAME_DATABASE__URL`, `GAME_SESSION__BACKEND`).

use common::{cache::RedisConfig, database::DatabaseConfig};
use serde::Deserialize;
use thiserror::Error;

/// Minimum length of the secret the cookie signing key is derived from
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Session secret must be at least {MIN_SECRET_LEN} bytes long")]
    SecretTooShort,
}

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub redis: RedisConfig,
    /// Default log filter, used when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            session: SessionConfig::default(),
            redis: RedisConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the listener binds to
    pub bind_addr: String,
    /// Directory holding the single-page client bundle
    pub static_dir: String,
    /// The one origin allowed to make credentialed cross-origin requests
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            static_dir: "static".to_string(),
            cors_origin: "http://localhost:5000".to_string(),
        }
    }
}

/// Where session state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Memory,
    Redis,
}

/// Session cookie and store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub cookie_name: String,
    /// Secret the cookie signing key is derived from. A random key is used
    /// when unset, which invalidates every session on restart.
    pub secret: Option<String>,
    /// Lifetime of a persistent session in days
    pub lifetime_days: u32,
    /// Mark the cookie `Secure`. Off by default so plain HTTP works in development.
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            cookie_name: "session".to_string(),
            secret: None,
            lifetime_days: 31,
            secure: false,
        }
    }
}

impl SessionConfig {
    /// Session lifetime in seconds
    pub fn lifetime_secs(&self) -> u64 {
        u64::from(self.lifetime_days) * 24 * 60 * 60
    }
}

impl AppConfig {
    /// Load configuration from `game.toml` (optional) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("game").required(false))
            .add_source(
                config::Environment::with_prefix("GAME")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: AppConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match &self.session.secret {
            Some(secret) if secret.len() < MIN_SECRET_LEN => Err(ConfigError::SecretTooShort),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_config_defaults() {
        let cfg = AppConfig::load().unwrap();
        assert_eq!(cfg.server.bind_addr, "127.0.0.1:5000");
        assert_eq!(cfg.server.cors_origin, "http://localhost:5000");
        assert_eq!(cfg.database.url, "sqlite://game.db");
        assert_eq!(cfg.session.backend, SessionBackend::Memory);
        assert_eq!(cfg.session.cookie_name, "session");
        assert_eq!(cfg.session.lifetime_days, 31);
        assert!(!cfg.session.secure);
        assert!(cfg.session.secret.is_none());
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    #[serial]
    fn test_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("GAME_SERVER__BIND_ADDR", "0.0.0.0:8080");
            std::env::set_var("GAME_DATABASE__URL", "sqlite::memory:");
            std::env::set_var("GAME_DATABASE__MAX_CONNECTIONS", "20");
            std::env::set_var("GAME_SESSION__BACKEND", "redis");
            std::env::set_var("GAME_SESSION__LIFETIME_DAYS", "7");
        }

        let cfg = AppConfig::load();

        unsafe {
            std::env::remove_var("GAME_SERVER__BIND_ADDR");
            std::env::remove_var("GAME_DATABASE__URL");
            std::env::remove_var("GAME_DATABASE__MAX_CONNECTIONS");
            std::env::remove_var("GAME_SESSION__BACKEND");
            std::env::remove_var("GAME_SESSION__LIFETIME_DAYS");
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(cfg.database.url, "sqlite::memory:");
        assert_eq!(cfg.database.max_connections, 20);
        assert_eq!(cfg.session.backend, SessionBackend::Redis);
        assert_eq!(cfg.session.lifetime_secs(), 7 * 24 * 60 * 60);
    }

    #[test]
    #[serial]
    fn test_short_secret_is_rejected() {
        unsafe {
            std::env::set_var("GAME_SESSION__SECRET", "your-secret-key");
        }

        let result = AppConfig::load();

        unsafe {
            std::env::remove_var("GAME_SESSION__SECRET");
        }

        assert!(matches!(result, Err(ConfigError::SecretTooShort)));
    }
}
