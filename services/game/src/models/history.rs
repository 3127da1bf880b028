//! Game history model and related functionality

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use sqlx::FromRow;

/// Maximum length of the free-form `time` field, in characters
pub const MAX_TIME_LEN: usize = 20;

/// Format used for every timestamp returned to clients
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

/// New game record payload
#[derive(Debug, Clone)]
pub struct NewHistory {
    pub user_id: i64,
    pub score: i64,
    pub moves: i64,
    pub time: String,
}

/// One leaderboard row
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RankingEntry {
    pub username: String,
    pub score: i64,
    pub moves: i64,
    pub time: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// One row of a user's own history
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryEntry {
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
    pub score: i64,
    pub moves: i64,
    pub time: String,
}
