use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Persists a new user, assigning a fresh id.
    /// A duplicate username surfaces as `AppError::Conflict`.
    async fn create_user(&self, username: &str, password_hash: &str)
        -> Result<UserModel, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
///
/// Data is stored in memory and lost when the application restarts. The
/// username is the uniqueness key, matching the database unique constraint.
pub struct InMemoryUserRepository {
    inner: Mutex<UserTable>,
}

struct UserTable {
    next_id: i64,
    users: HashMap<String, UserModel>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(UserTable {
                next_id: 1,
                users: HashMap::new(),
            }),
        }
    }

    /// Returns the current number of users in the repository
    pub fn user_count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserModel, AppError> {
        debug!(username = %username, "creating user in memory");

        let mut table = self.inner.lock().unwrap();
        if table.users.contains_key(username) {
            warn!(username = %username, "username already taken");
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let user = UserModel {
            id: table.next_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        table.next_id += 1;
        table.users.insert(username.to_string(), user.clone());

        debug!(user_id = user.id, "user created in memory");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let table = self.inner.lock().unwrap();
        let user = table.users.get(username).cloned();

        match &user {
            Some(u) => debug!(user_id = u.id, "user found in memory"),
            None => debug!(username = %username, "user not found in memory"),
        }

        Ok(user)
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, password_hash))]
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<UserModel, AppError> {
        debug!(username = %username, "creating user in database");

        let row = sqlx::query(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The unique constraint on username surfaces as a domain conflict
            if e.as_database_error()
                .is_some_and(|db| db.is_unique_violation())
            {
                warn!(username = %username, "username already taken");
                AppError::Conflict("Username already taken".to_string())
            } else {
                warn!(error = %e, "failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        let user = UserModel {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        };

        debug!(user_id = user.id, "user created in database");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, username = %username, "failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|row| UserModel {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create_user("alice", "hash-a").await.unwrap();
        assert_eq!(created.username, "alice");
        assert_eq!(created.password_hash, "hash-a");

        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "alice");
    }

    #[tokio::test]
    async fn test_find_nonexistent_user() {
        let repo = InMemoryUserRepository::new();

        let result = repo.find_by_username("nobody").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create_user("alice", "hash-a").await.unwrap();

        let result = repo.create_user("alice", "hash-b").await;
        assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));

        // The original record is unchanged
        let found = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.password_hash, "hash-a");
        assert_eq!(repo.user_count(), 1);
    }

    #[tokio::test]
    async fn test_usernames_are_case_sensitive() {
        let repo = InMemoryUserRepository::new();

        repo.create_user("alice", "hash-a").await.unwrap();
        repo.create_user("Alice", "hash-b").await.unwrap();

        assert_eq!(repo.user_count(), 2);
        assert!(repo.find_by_username("ALICE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let repo = InMemoryUserRepository::new();

        let a = repo.create_user("alice", "h").await.unwrap();
        let b = repo.create_user("bob", "h").await.unwrap();

        assert!(b.id > a.id);
    }
}
