// Public API - what other modules can use
pub use middleware::require_auth;
pub use models::UserModel;
pub use service::AuthService;
pub use types::Claims;

// Internal modules
pub mod handlers;
mod middleware;
pub mod models;
mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
