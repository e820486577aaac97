use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    Form, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::service::AuthService;
use super::types::{LoginForm, LoginResponse, RegisterRequest, UserResponse};
use crate::shared::{AppError, AppState, MessageResponse};

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(Arc::clone(&state.user_repository), state.token_config.clone())
}

/// HTTP handler for user registration
///
/// POST /auth/register
#[instrument(name = "register", skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let user = auth_service(&state)
        .register(&payload.username, &payload.password)
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");

    Ok(Json(MessageResponse::new("User registered successfully")))
}

/// HTTP handler for login
///
/// POST /auth/login (form-encoded)
/// Returns the access token in the body and as an http-only cookie so both
/// header-based and cookie-based clients can authenticate.
#[instrument(name = "login", skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = auth_service(&state)
        .login(&form.username, &form.password)
        .await?;

    info!(user_id = user.id, "login succeeded");

    // SameSite=None so browser clients on another origin can send it back
    let cookie = format!(
        "access_token=Bearer {}; HttpOnly; Secure; SameSite=None; Path=/",
        token
    );

    let body = LoginResponse {
        access_token: token,
        user: UserResponse {
            id: user.id,
            username: user.username,
        },
    };

    Ok((AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)))
}
