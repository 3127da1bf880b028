use std::sync::Arc;

use anyhow::Result;
use common::{
    cache::RedisPool,
    database::{health_check, init_pool, run_migrations},
};
use game::{
    config::{AppConfig, SessionBackend},
    routes,
    session::{MemorySessionStore, RedisSessionStore, SessionManager, SessionStore, signing_key},
    state::AppState,
};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting game service");

    // Initialize database connection pool and bring the schema up to date
    let pool = init_pool(&config.database).await?;
    run_migrations(&pool).await?;
    health_check(&pool).await?;
    info!("Database connection successful");

    let store: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Memory => {
            info!("Using in-memory session store");
            Arc::new(MemorySessionStore::new())
        }
        SessionBackend::Redis => {
            let redis_pool = RedisPool::new(&config.redis).await?;
            if !redis_pool.health_check().await? {
                anyhow::bail!("Failed to connect to Redis");
            }
            info!("Using Redis session store");
            Arc::new(RedisSessionStore::new(Arc::new(redis_pool)))
        }
    };
    let sessions = SessionManager::new(
        store,
        signing_key(config.session.secret.as_deref())?,
        &config.session,
    );

    let app = routes::create_router(AppState::new(pool, sessions), &config.server)?;

    let listener = TcpListener::bind(&config.server.bind_addr).await?;
    info!("Game service listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Game service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
