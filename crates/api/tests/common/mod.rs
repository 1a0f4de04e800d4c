#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use licensing_core::hashing::sha256_hex;
use sqlx::PgPool;
use tower::ServiceExt;

use licensing_api::app::build_app;
use licensing_api::config::ServerConfig;
use licensing_api::state::AppState;
use licensing_delivery::LicenceMailer;

/// Bearer token accepted by the test app's admin routes.
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// MeuDanfe API key configured in the test app.
pub const API_KEY: &str = "meudanfe-test-key";

/// Build a test `ServerConfig` with safe defaults.
///
/// SMTP is never configured in tests, so issued licences are logged.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        meudanfe_api_key: API_KEY.to_string(),
        licence_days: 30,
        admin_token_hash: Some(sha256_hex(ADMIN_TOKEN.as_bytes())),
        sweep_interval_secs: 3600,
        log_json: false,
    }
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_test_app_with_mailer(pool, config, LicenceMailer::new(None))
}

pub fn build_test_app_with_mailer(
    pool: PgPool,
    config: ServerConfig,
    mailer: LicenceMailer,
) -> Router {
    build_app(AppState {
        pool,
        config: Arc::new(config),
        mailer: Arc::new(mailer),
    })
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_admin(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_admin_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(AUTHORIZATION, format!("Bearer {ADMIN_TOKEN}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
