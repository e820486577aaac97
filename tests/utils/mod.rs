//! Test helpers - drive the full router the way an HTTP client would
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

use quill::auth::repository::InMemoryUserRepository;
use quill::auth::token::TokenConfig;
use quill::posts::repository::InMemoryPostRepository;
use quill::shared::AppState;

pub struct TestApp {
    app: Router,
}

impl TestApp {
    /// Builds the full application over fresh in-memory repositories.
    pub fn new() -> Self {
        let state = AppState::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPostRepository::new()),
            TokenConfig::new("workflow-test-secret", 30),
        );
        Self {
            app: quill::app(state),
        }
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn register(&self, username: &str, password: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"username":"{}","password":"{}"}}"#,
                username, password
            )))
            .unwrap();
        self.request(request).await.status()
    }

    /// Logs in and returns (status, bearer token, user id).
    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, String, i64) {
        let request = Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={}&password={}",
                username, password
            )))
            .unwrap();
        let response = self.request(request).await;
        let status = response.status();
        if status != StatusCode::OK {
            return (status, String::new(), 0);
        }

        let body = read_json(response).await;
        let token = body["access_token"].as_str().unwrap().to_string();
        let user_id = body["user"]["id"].as_i64().unwrap();
        (status, token, user_id)
    }

    pub async fn create_post(&self, token: &str, title: &str, content: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri("/posts")
            .header("content-type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(format!(
                r#"{{"title":"{}","content":"{}"}}"#,
                title, content
            )))
            .unwrap();
        self.request(request).await
    }

    pub async fn update_post(
        &self,
        token: &str,
        post_id: i64,
        title: &str,
        content: &str,
    ) -> Response<Body> {
        let request = Request::builder()
            .method("PUT")
            .uri(format!("/posts/{}", post_id))
            .header("content-type", "application/json")
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(format!(
                r#"{{"title":"{}","content":"{}"}}"#,
                title, content
            )))
            .unwrap();
        self.request(request).await
    }

    pub async fn delete_post(&self, token: &str, post_id: i64) -> Response<Body> {
        let request = Request::builder()
            .method("DELETE")
            .uri(format!("/posts/{}", post_id))
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();
        self.request(request).await
    }

    pub async fn get_post(&self, post_id: i64) -> Response<Body> {
        let request = Request::builder()
            .uri(format!("/posts/{}", post_id))
            .body(Body::empty())
            .unwrap();
        self.request(request).await
    }

    pub async fn list_posts(&self, query: &str) -> Response<Body> {
        let uri = if query.is_empty() {
            "/posts".to_string()
        } else {
            format!("/posts?{}", query)
        };
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(request).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn read_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
