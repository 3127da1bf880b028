//! Game record, leaderboard and history routes

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::{
    error::{GameError, GameResult},
    extract::{AuthUser, JsonBody},
    models::{NewHistory, history::MAX_TIME_LEN},
    repositories::history::RANKING_LIMIT,
    state::AppState,
};

/// Request body of a finished game
///
/// Fields are taken as raw JSON so that type mistakes (`10.5`, `"10"`,
/// `true`) are reported like any other invalid game data.
#[derive(Debug, Deserialize)]
pub struct GameRecordRequest {
    pub score: Option<Value>,
    pub moves: Option<Value>,
    pub time: Option<Value>,
}

impl GameRecordRequest {
    fn into_new_history(self, user_id: i64) -> GameResult<NewHistory> {
        let invalid = || GameError::Validation("Invalid game data".to_string());

        let score = self
            .score
            .as_ref()
            .and_then(Value::as_i64)
            .ok_or_else(invalid)?;
        let moves = self
            .moves
            .as_ref()
            .and_then(Value::as_i64)
            .ok_or_else(invalid)?;
        let time = match self.time {
            Some(Value::String(time))
                if !time.is_empty() && time.chars().count() <= MAX_TIME_LEN =>
            {
                time
            }
            _ => return Err(invalid()),
        };

        Ok(NewHistory {
            user_id,
            score,
            moves,
            time,
        })
    }
}

/// Save a finished game for the logged-in user
pub async fn save_game(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(payload): JsonBody<GameRecordRequest>,
) -> GameResult<impl IntoResponse> {
    let record = payload.into_new_history(auth.user_id)?;

    state
        .history_repository
        .record(&record)
        .await
        .map_err(|e| {
            error!("Failed to save game for user {}: {}", auth.user_id, e);
            GameError::Internal("Failed to save record, please try again".to_string())
        })?;

    Ok(Json(json!({"message": "Game record saved"})))
}

/// Leaderboard of the best scores
pub async fn ranking(State(state): State<AppState>) -> GameResult<impl IntoResponse> {
    let entries = state
        .history_repository
        .top_scores(RANKING_LIMIT)
        .await
        .map_err(|e| {
            error!("Failed to load ranking: {}", e);
            GameError::Internal("Failed to load ranking".to_string())
        })?;

    Ok(Json(entries))
}

/// Every game of the logged-in user, most recent first
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> GameResult<impl IntoResponse> {
    let entries = state
        .history_repository
        .list_for_user(auth.user_id)
        .await
        .map_err(|e| {
            error!("Failed to load history for user {}: {}", auth.user_id, e);
            GameError::Internal("Failed to load history".to_string())
        })?;

    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: Value) -> GameResult<NewHistory> {
        serde_json::from_value::<GameRecordRequest>(body)
            .unwrap()
            .into_new_history(1)
    }

    #[test]
    fn test_valid_record() {
        let record = parse(json!({"score": 10, "moves": 5, "time": "01:23"})).unwrap();
        assert_eq!(record.user_id, 1);
        assert_eq!(record.score, 10);
        assert_eq!(record.moves, 5);
        assert_eq!(record.time, "01:23");
    }

    #[test]
    fn test_negative_scores_are_integers_too() {
        let record = parse(json!({"score": -3, "moves": 0, "time": "x"})).unwrap();
        assert_eq!(record.score, -3);
    }

    #[test]
    fn test_invalid_records() {
        for body in [
            json!({"score": 10.5, "moves": 5, "time": "01:23"}),
            json!({"score": "10", "moves": 5, "time": "01:23"}),
            json!({"score": true, "moves": 5, "time": "01:23"}),
            json!({"score": 10, "moves": null, "time": "01:23"}),
            json!({"score": 10, "moves": 5}),
            json!({"score": 10, "moves": 5, "time": ""}),
            json!({"score": 10, "moves": 5, "time": 83}),
            json!({"score": 10, "moves": 5, "time": "x".repeat(MAX_TIME_LEN + 1)}),
        ] {
            assert!(matches!(parse(body), Err(GameError::Validation(_))));
        }
    }
}
