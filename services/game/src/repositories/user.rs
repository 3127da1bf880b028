//! User repository for database operations

use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{NewUser, User};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user
    ///
    /// A duplicate username is reported as [`DatabaseError::UniqueViolation`],
    /// including when a concurrent registration wins the race.
    pub async fn create(&self, new_user: &NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let mut tx = self.pool.begin().await.map_err(DatabaseError::Query)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from_write)?;

        tx.commit().await.map_err(DatabaseError::Query)?;

        Ok(user)
    }

    /// Find a user by exact username
    pub async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn repository() -> UserRepository {
        let pool = init_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        UserRepository::new(pool)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = repository().await;

        let created = repo.create(&new_user("alice")).await.unwrap();
        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();

        assert_eq!(by_name.id, created.id);
        assert_eq!(by_id.username, "alice");
        assert!(repo.find_by_username("Alice").await.unwrap().is_none());
        assert!(repo.find_by_id(created.id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_a_unique_violation() {
        let repo = repository().await;

        repo.create(&new_user("bob")).await.unwrap();
        let err = repo.create(&new_user("bob")).await.unwrap_err();

        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }
}
