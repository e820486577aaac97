// Public API - what other modules can use
pub use models::PostModel;
pub use service::PostService;
pub use types::{PostListResponse, PostSummary};

// Internal modules
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
