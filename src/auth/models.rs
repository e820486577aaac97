use sqlx::FromRow;

/// Database model for the users table.
///
/// The password hash is an opaque PHC string; the plaintext is never stored.
/// Users are immutable after registration.
#[derive(Debug, Clone, FromRow)]
pub struct UserModel {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
