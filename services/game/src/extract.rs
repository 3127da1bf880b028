//! Request extractors shared by the handlers

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::request::Parts,
};
use axum_extra::extract::SignedCookieJar;
use tracing::debug;

use crate::{error::GameError, state::AppState};

/// JSON body whose rejections are reported as [`GameError`]
///
/// A missing or wrong `Content-Type` becomes `UnsupportedMediaType`, any
/// other problem with the body (syntax, wrong field types) a validation error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = GameError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(GameError::UnsupportedMediaType),
            Err(rejection) => {
                debug!("Rejected request body: {}", rejection.body_text());
                Err(GameError::Validation("Invalid request body".to_string()))
            }
        }
    }
}

/// The authenticated user of the current request
///
/// Rejects with `Authentication` when the request has no live session or the
/// session is not logged in.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = GameError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = match SignedCookieJar::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        match state.sessions.user_id(&jar).await? {
            Some(user_id) => Ok(Self { user_id }),
            None => Err(GameError::Authentication("Not logged in".to_string())),
        }
    }
}
