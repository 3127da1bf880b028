//! Game history repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;

use crate::models::{HistoryEntry, NewHistory, RankingEntry};

/// Number of entries on the leaderboard
pub const RANKING_LIMIT: i64 = 10;

/// Game history repository
#[derive(Clone)]
pub struct HistoryRepository {
    pool: SqlitePool,
}

impl HistoryRepository {
    /// Create a new history repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a finished game, stamped with the current server time.
    /// Returns the row id.
    pub async fn record(&self, entry: &NewHistory) -> DatabaseResult<i64> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO history (user_id, score, moves, time, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.score)
        .bind(entry.moves)
        .bind(&entry.time)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_write)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(id)
    }

    /// Highest scores across all users, best first. Equal scores keep
    /// insertion order.
    pub async fn top_scores(&self, limit: i64) -> DatabaseResult<Vec<RankingEntry>> {
        sqlx::query_as::<_, RankingEntry>(
            r#"
            SELECT u.username, h.score, h.moves, h.time, h.created_at
            FROM history h
            JOIN users u ON u.id = h.user_id
            ORDER BY h.score DESC, h.id ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Every game of one user, most recent first
    pub async fn list_for_user(&self, user_id: i64) -> DatabaseResult<Vec<HistoryEntry>> {
        sqlx::query_as::<_, HistoryEntry>(
            r#"
            SELECT created_at, score, moves, time
            FROM history
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::NewUser, repositories::UserRepository};
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn setup() -> (UserRepository, HistoryRepository) {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        (
            UserRepository::new(pool.clone()),
            HistoryRepository::new(pool),
        )
    }

    async fn user(users: &UserRepository, name: &str) -> i64 {
        users
            .create(&NewUser {
                username: name.to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    fn game(user_id: i64, score: i64) -> NewHistory {
        NewHistory {
            user_id,
            score,
            moves: score * 2,
            time: format!("00:{:02}", score % 60),
        }
    }

    #[tokio::test]
    async fn test_list_for_user_is_most_recent_first() {
        let (users, history) = setup().await;
        let alice = user(&users, "alice").await;
        let bob = user(&users, "bob").await;

        for score in [3, 1, 2] {
            history.record(&game(alice, score)).await.unwrap();
        }
        history.record(&game(bob, 100)).await.unwrap();

        let entries = history.list_for_user(alice).await.unwrap();
        let scores: Vec<i64> = entries.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![2, 1, 3]);
        assert!(entries.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_top_scores_is_limited_and_ordered() {
        let (users, history) = setup().await;
        let alice = user(&users, "alice").await;
        let bob = user(&users, "bob").await;

        for score in 0..8 {
            history.record(&game(alice, score)).await.unwrap();
            history.record(&game(bob, score * 3)).await.unwrap();
        }

        let top = history.top_scores(RANKING_LIMIT).await.unwrap();
        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(top[0].username, "bob");
        assert_eq!(top[0].score, 21);
    }

    #[tokio::test]
    async fn test_record_for_unknown_user_fails() {
        let (_, history) = setup().await;
        assert!(history.record(&game(404, 1)).await.is_err());
    }
}
