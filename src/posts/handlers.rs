use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::PostModel;
use super::service::PostService;
use super::types::{ListParams, PostListResponse, PostRequest};
use crate::auth::models::UserModel;
use crate::shared::{AppError, AppState, MessageResponse};

fn post_service(state: &AppState) -> PostService {
    PostService::new(Arc::clone(&state.post_repository))
}

/// POST /posts — requires a resolved identity
#[instrument(name = "create_post", skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    Json(payload): Json<PostRequest>,
) -> Result<Json<PostModel>, AppError> {
    let post = post_service(&state)
        .create(&user, &payload.title, &payload.content)
        .await?;

    info!(post_id = post.id, owner_id = user.id, "post created");
    Ok(Json(post))
}

/// GET /posts — public, paginated, optionally filtered by title substring
#[instrument(name = "list_posts", skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PostListResponse>, AppError> {
    let (posts, total_pages) = post_service(&state).list(&params).await?;

    Ok(Json(PostListResponse { posts, total_pages }))
}

/// GET /posts/{id} — public
#[instrument(name = "get_post", skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostModel>, AppError> {
    let post = post_service(&state).get(post_id).await?;
    Ok(Json(post))
}

/// PUT /posts/{id} — owner only
#[instrument(name = "update_post", skip(state, user, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    Path(post_id): Path<i64>,
    Json(payload): Json<PostRequest>,
) -> Result<Json<PostModel>, AppError> {
    let post = post_service(&state)
        .update(&user, post_id, &payload.title, &payload.content)
        .await?;

    info!(post_id, owner_id = user.id, "post updated");
    Ok(Json(post))
}

/// DELETE /posts/{id} — owner only
#[instrument(name = "delete_post", skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<UserModel>,
    Path(post_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    post_service(&state).delete(&user, post_id).await?;

    info!(post_id, owner_id = user.id, "post deleted");
    Ok(Json(MessageResponse::new("Post deleted")))
}
