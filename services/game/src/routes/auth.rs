//! Registration, login and session routes

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::SignedCookieJar;
use common::error::DatabaseError;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::{GameError, GameResult},
    extract::JsonBody,
    models::{NewUser, UserSummary, user::MAX_USERNAME_LEN},
    password::{hash_password, verify_credentials},
    state::AppState,
};

/// Request body of register and login
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialsRequest {
    /// Both fields, provided they are present and non-empty
    fn require(self) -> GameResult<(String, String)> {
        match (self.username, self.password) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            }
            _ => Err(GameError::Validation(
                "Username and password are required".to_string(),
            )),
        }
    }
}

fn invalid_credentials() -> GameError {
    GameError::Authentication("Invalid username or password".to_string())
}

fn blocking_failed(e: tokio::task::JoinError) -> GameError {
    error!("Password hashing task failed: {}", e);
    GameError::Internal("Internal server error".to_string())
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> GameResult<impl IntoResponse> {
    let (username, password) = payload.require()?;

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(GameError::Validation(format!(
            "Username must be at most {} characters",
            MAX_USERNAME_LEN
        )));
    }

    if state
        .user_repository
        .find_by_username(&username)
        .await?
        .is_some()
    {
        return Err(GameError::Conflict("Username already exists".to_string()));
    }

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(blocking_failed)??;

    let new_user = NewUser {
        username,
        password_hash,
    };

    match state.user_repository.create(&new_user).await {
        Ok(user) => {
            info!("Registered user {} ({})", user.username, user.id);
            Ok((
                StatusCode::CREATED,
                Json(json!({"message": "Registration successful, please log in"})),
            ))
        }
        Err(DatabaseError::UniqueViolation(_)) => {
            Err(GameError::Conflict("Username already exists".to_string()))
        }
        Err(e) => {
            error!("Failed to create user: {}", e);
            Err(GameError::Internal(
                "Registration failed, please try again".to_string(),
            ))
        }
    }
}

/// User login endpoint
///
/// Unknown usernames and wrong passwords fail with the same error after the
/// same password verification work.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> GameResult<impl IntoResponse> {
    let (username, password) = payload.require()?;
    info!("Login attempt for user: {}", username);

    let user = state.user_repository.find_by_username(&username).await?;

    let stored_hash = user.as_ref().map(|user| user.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || {
        verify_credentials(&password, stored_hash.as_deref())
    })
    .await
    .map_err(blocking_failed)??;

    let Some(user) = user.filter(|_| verified) else {
        info!("Rejected login for user: {}", username);
        return Err(invalid_credentials());
    };

    let jar = state.sessions.establish(jar, user.id).await?;

    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": UserSummary::from(&user),
        })),
    ))
}

/// Report whether the request belongs to a logged-in user
pub async fn check_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> GameResult<Response> {
    if let Some(user_id) = state.sessions.user_id(&jar).await? {
        if let Some(user) = state.user_repository.find_by_id(user_id).await? {
            return Ok(Json(json!({
                "message": "Logged in",
                "user": UserSummary::from(&user),
            }))
            .into_response());
        }
    }

    Ok((
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Not logged in"})),
    )
        .into_response())
}

/// Logout endpoint, succeeds whether or not a session exists
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> GameResult<impl IntoResponse> {
    let jar = state.sessions.destroy(jar).await?;

    Ok((jar, Json(json!({"message": "Logged out"}))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: Option<&str>, password: Option<&str>) -> CredentialsRequest {
        CredentialsRequest {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_require_accepts_both_fields() {
        let (u, p) = request(Some("a"), Some("p")).require().unwrap();
        assert_eq!((u.as_str(), p.as_str()), ("a", "p"));
    }

    #[test]
    fn test_require_rejects_missing_or_empty() {
        for req in [
            request(None, Some("p")),
            request(Some("a"), None),
            request(Some(""), Some("p")),
            request(Some("a"), Some("")),
        ] {
            assert!(matches!(req.require(), Err(GameError::Validation(_))));
        }
    }
}
