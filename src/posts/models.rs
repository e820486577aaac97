use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database model for the posts table.
///
/// `user_id` is the owning user and never changes; only that owner may
/// mutate or delete the post. `updated_at` is refreshed on every mutation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostModel {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
}
