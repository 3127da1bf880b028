//! Game service routes

pub mod auth;
pub mod game;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, header::CONTENT_TYPE, header::InvalidHeaderValue},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{config::ServerConfig, error::GameResult, state::AppState};

/// Create the router for the game service
///
/// API routes live under `/api`; everything unmatched is served from the
/// static directory.
pub fn create_router(
    state: AppState,
    config: &ServerConfig,
) -> Result<Router, InvalidHeaderValue> {
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_str(&config.cors_origin)?)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/check_login", get(auth::check_login))
        .route("/logout", post(auth::logout))
        .route("/game", post(game::save_game))
        .route("/ranking", get(game::ranking))
        .route("/history", get(game::history));

    let router = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .nest("/api", api)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

/// Entry point of the client bundle
pub async fn index() -> Redirect {
    Redirect::temporary("/index.html")
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> GameResult<impl IntoResponse> {
    common::database::health_check(&state.db_pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "service": "game-service"
    })))
}
