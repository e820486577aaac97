use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::service::AuthService;
use crate::shared::{AppError, AppState};

/// Bearer-token authentication middleware.
///
/// Validates the Authorization header, resolves the token to a user and adds
/// the `UserModel` to request extensions. Handlers behind it extract
/// `Extension(user): Extension<UserModel>`.
/// Usage: `.layer(middleware::from_fn_with_state(state.clone(), auth::require_auth))`
#[instrument(skip(state, req, next))]
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| {
            warn!("missing Authorization header");
            AppError::Unauthenticated("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("Authorization header is not a Bearer token");
        AppError::Unauthenticated("Invalid authorization header format".to_string())
    })?;

    let service = AuthService::new(Arc::clone(&state.user_repository), state.token_config.clone());
    let user = service.resolve(token).await?;

    debug!(user_id = user.id, username = %user.username, "request authenticated");

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
