use quill::auth::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
use quill::auth::token::TokenConfig;
use quill::posts::repository::{InMemoryPostRepository, PostgresPostRepository, PostRepository};
use quill::shared::AppState;

use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting quill blog server");

    let token_config = TokenConfig::from_env();

    // Repositories are constructed once at startup and injected into the
    // router; handlers never reach for ambient connections.
    let (user_repository, post_repository): (
        Arc<dyn UserRepository + Send + Sync>,
        Arc<dyn PostRepository + Send + Sync>,
    ) = match std::env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .expect("Failed to connect to database");
            info!("Connected to PostgreSQL");
            (
                Arc::new(PostgresUserRepository::new(pool.clone())),
                Arc::new(PostgresPostRepository::new(pool)),
            )
        }
        Err(_) => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryPostRepository::new()),
            )
        }
    };

    let app_state = AppState::new(user_repository, post_repository, token_config);

    // very_permissive mirrors the request origin and allows credentials,
    // which the cross-site login cookie needs
    let app = quill::app(app_state).layer(CorsLayer::very_permissive());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://localhost:{}", port);
    axum::serve(listener, app).await.expect("Server error");
}
