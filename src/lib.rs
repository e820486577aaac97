// Library crate for the quill blog backend
// This file exposes the public API and router for integration tests

pub mod auth;
pub mod posts;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use auth::{AuthService, UserModel};
pub use posts::PostService;
pub use shared::{AppError, AppState};

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Builds the application router over the given state.
///
/// Mutating post routes sit behind the bearer-token middleware; everything
/// else is public. The middleware layer applies only to the routes
/// registered before the merge.
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/posts", post(posts::handlers::create_post))
        .route(
            "/posts/:id",
            put(posts::handlers::update_post).delete(posts::handlers::delete_post),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        .route("/posts", get(posts::handlers::list_posts))
        .route("/posts/:id", get(posts::handlers::get_post))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
