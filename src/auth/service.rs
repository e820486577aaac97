//! Core business logic for authentication: registration, login, and
//! request-scoped identity resolution.

use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::models::UserModel;
use super::password;
use super::repository::UserRepository;
use super::token::TokenConfig;
use crate::shared::AppError;

/// Service for handling authentication business logic
#[derive(Clone)]
pub struct AuthService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    token_config: TokenConfig,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        token_config: TokenConfig,
    ) -> Self {
        Self {
            repository,
            token_config,
        }
    }

    /// Registers a new user with a hashed password.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<UserModel, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let password_hash = password::hash_password(password)?;
        let user = self.repository.create_user(username, &password_hash).await?;

        debug!(user_id = user.id, "user registered");
        Ok(user)
    }

    /// Checks credentials and issues an access token.
    ///
    /// An unknown username and a wrong password produce the same error, so a
    /// caller cannot probe which usernames exist.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(UserModel, String), AppError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !password::verify_password(password, &user.password_hash) {
            warn!(username = %username, "password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.token_config.issue(&user.username).map_err(|e| {
            warn!(error = %e, "failed to issue token");
            AppError::Internal
        })?;

        debug!(user_id = user.id, "login successful");
        Ok((user, token))
    }

    /// Resolves a bearer token to the authenticated user.
    ///
    /// Every token failure and a missing subject user collapse into the same
    /// `Unauthenticated` outcome; callers cannot tell a bad token from a
    /// deleted account.
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<UserModel, AppError> {
        let claims = self.token_config.verify(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            AppError::Unauthenticated("Invalid or expired token".to_string())
        })?;

        self.repository
            .find_by_username(&claims.sub)
            .await?
            .ok_or_else(|| {
                debug!(subject = %claims.sub, "token subject not found");
                AppError::Unauthenticated("Invalid or expired token".to_string())
            })
    }
}
