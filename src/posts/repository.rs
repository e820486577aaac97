use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PostModel;
use super::types::PostSummary;
use crate::auth::models::UserModel;
use crate::shared::AppError;

/// Trait for post repository operations.
///
/// `update_post` and `delete_post` take the acting owner's id and report a
/// single merged outcome (`None` / `false`) for "no such post" and "post
/// owned by someone else", so callers cannot probe for existence.
#[async_trait]
pub trait PostRepository {
    /// Persists a new post owned by `owner`, assigning a fresh id and
    /// setting both timestamps to now.
    async fn create_post(
        &self,
        owner: &UserModel,
        title: &str,
        content: &str,
    ) -> Result<PostModel, AppError>;

    async fn get_post(&self, post_id: i64) -> Result<Option<PostModel>, AppError>;

    /// Returns one page of posts in ascending id order plus the page count
    /// over the whole filtered set. `page` is 1-based; `limit` must already
    /// be clamped by the caller. `search` filters by case-insensitive
    /// substring match on the title.
    async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<(Vec<PostSummary>, u64), AppError>;

    async fn update_post(
        &self,
        post_id: i64,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<PostModel>, AppError>;

    async fn delete_post(&self, post_id: i64, owner_id: i64) -> Result<bool, AppError>;
}

fn page_count(total: u64, limit: u32) -> u64 {
    // Empty set yields zero pages
    (total + limit as u64 - 1) / limit as u64
}

/// In-memory implementation of PostRepository for development and testing
///
/// Posts are kept in a BTreeMap keyed by id so listing comes out in stable
/// insertion/id order. The owner's username is denormalized at creation time
/// for list summaries, mirroring the SQL join.
pub struct InMemoryPostRepository {
    inner: Mutex<PostTable>,
}

struct PostTable {
    next_id: i64,
    posts: BTreeMap<i64, StoredPost>,
}

struct StoredPost {
    post: PostModel,
    username: String,
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(PostTable {
                next_id: 1,
                posts: BTreeMap::new(),
            }),
        }
    }

    /// Returns the current number of posts in the repository
    pub fn post_count(&self) -> usize {
        self.inner.lock().unwrap().posts.len()
    }
}

fn title_matches(title: &str, search: &str) -> bool {
    title.to_lowercase().contains(&search.to_lowercase())
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    #[instrument(skip(self, owner, content))]
    async fn create_post(
        &self,
        owner: &UserModel,
        title: &str,
        content: &str,
    ) -> Result<PostModel, AppError> {
        let now = Utc::now();

        let mut table = self.inner.lock().unwrap();
        let post = PostModel {
            id: table.next_id,
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
            user_id: owner.id,
        };
        table.next_id += 1;
        table.posts.insert(
            post.id,
            StoredPost {
                post: post.clone(),
                username: owner.username.clone(),
            },
        );

        debug!(post_id = post.id, owner_id = owner.id, "post created in memory");
        Ok(post)
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: i64) -> Result<Option<PostModel>, AppError> {
        let table = self.inner.lock().unwrap();
        Ok(table.posts.get(&post_id).map(|stored| stored.post.clone()))
    }

    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<(Vec<PostSummary>, u64), AppError> {
        let table = self.inner.lock().unwrap();

        let filtered: Vec<&StoredPost> = table
            .posts
            .values()
            .filter(|stored| match search {
                Some(needle) => title_matches(&stored.post.title, needle),
                None => true,
            })
            .collect();

        let total = filtered.len() as u64;
        let offset = (page.max(1) - 1) as usize * limit as usize;

        let posts = filtered
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|stored| PostSummary {
                id: stored.post.id,
                title: stored.post.title.clone(),
                content: stored.post.content.clone(),
                user_id: stored.post.user_id,
                username: stored.username.clone(),
            })
            .collect();

        debug!(total, page, limit, "listed posts from memory");
        Ok((posts, page_count(total, limit)))
    }

    #[instrument(skip(self, content))]
    async fn update_post(
        &self,
        post_id: i64,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<PostModel>, AppError> {
        let mut table = self.inner.lock().unwrap();

        match table.posts.get_mut(&post_id) {
            Some(stored) if stored.post.user_id == owner_id => {
                stored.post.title = title.to_string();
                stored.post.content = content.to_string();
                stored.post.updated_at = Utc::now();
                debug!(post_id, "post updated in memory");
                Ok(Some(stored.post.clone()))
            }
            // Absent and not-owned collapse into the same outcome
            _ => {
                debug!(post_id, owner_id, "post not found or not owned");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: i64, owner_id: i64) -> Result<bool, AppError> {
        let mut table = self.inner.lock().unwrap();

        match table.posts.get(&post_id) {
            Some(stored) if stored.post.user_id == owner_id => {
                table.posts.remove(&post_id);
                debug!(post_id, "post deleted from memory");
                Ok(true)
            }
            _ => {
                debug!(post_id, owner_id, "post not found or not owned");
                Ok(false)
            }
        }
    }
}

/// PostgreSQL implementation of post repository
///
/// Ownership checks ride in the WHERE clause of single UPDATE/DELETE
/// statements, so conflicting writes on the same post id serialize in the
/// database with no read-modify-write window.
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_post(row: &PgRow) -> PostModel {
    PostModel {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        user_id: row.get("user_id"),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    #[instrument(skip(self, owner, content))]
    async fn create_post(
        &self,
        owner: &UserModel,
        title: &str,
        content: &str,
    ) -> Result<PostModel, AppError> {
        debug!(owner_id = owner.id, "creating post in database");

        let row = sqlx::query(
            "INSERT INTO posts (title, content, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) \
             RETURNING id, title, content, created_at, updated_at, user_id",
        )
        .bind(title)
        .bind(content)
        .bind(owner.id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to create post in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let post = row_to_post(&row);
        debug!(post_id = post.id, "post created in database");
        Ok(post)
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: i64) -> Result<Option<PostModel>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, content, created_at, updated_at, user_id \
             FROM posts WHERE id = $1",
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id, "failed to fetch post from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(row_to_post))
    }

    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<(Vec<PostSummary>, u64), AppError> {
        // Count over the filtered set before pagination
        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM posts \
             WHERE $1::text IS NULL OR title ILIKE '%' || $1 || '%'",
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to count posts in database");
            AppError::DatabaseError(e.to_string())
        })?
        .get("count");

        let rows = sqlx::query(
            "SELECT p.id, p.title, p.content, p.user_id, u.username \
             FROM posts p JOIN users u ON u.id = p.user_id \
             WHERE $1::text IS NULL OR p.title ILIKE '%' || $1 || '%' \
             ORDER BY p.id \
             LIMIT $2 OFFSET $3",
        )
        .bind(search)
        .bind(limit as i64)
        .bind((page.max(1) as i64 - 1) * limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to list posts from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let posts = rows
            .iter()
            .map(|row| PostSummary {
                id: row.get("id"),
                title: row.get("title"),
                content: row.get("content"),
                user_id: row.get("user_id"),
                username: row.get("username"),
            })
            .collect();

        debug!(total, page, limit, "listed posts from database");
        Ok((posts, page_count(total as u64, limit)))
    }

    #[instrument(skip(self, content))]
    async fn update_post(
        &self,
        post_id: i64,
        owner_id: i64,
        title: &str,
        content: &str,
    ) -> Result<Option<PostModel>, AppError> {
        let row = sqlx::query(
            "UPDATE posts SET title = $3, content = $4, updated_at = $5 \
             WHERE id = $1 AND user_id = $2 \
             RETURNING id, title, content, created_at, updated_at, user_id",
        )
        .bind(post_id)
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, post_id, "failed to update post in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if row.is_none() {
            debug!(post_id, owner_id, "post not found or not owned");
        }

        Ok(row.as_ref().map(row_to_post))
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, post_id, "failed to delete post from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
