//! Shared helpers for HTTP-level integration tests.
//!
//! [`build_test_app`] mirrors the production router construction in
//! `router.rs` so tests exercise the same middleware stack (CORS, request
//! ID, timeout, tracing, panic recovery) that production uses, with an
//! in-memory object store and a disabled mailer.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use atelier_api::auth::jwt::JwtConfig;
use atelier_api::auth::password::hash_password;
use atelier_api::config::ServerConfig;
use atelier_api::mailer::Mailer;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;
use atelier_api::storage::MemoryObjectStore;
use atelier_db::models::identity::CreateIdentity;
use atelier_db::models::profile::CreateProfile;
use atelier_db::repositories::{IdentityRepo, ProfileRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        object_store: Arc::new(MemoryObjectStore::new()),
        mailer: Arc::new(Mailer::disabled()),
    };
    build_app_router(state, &config)
}

/// Create an identity + profile directly in the database and return the
/// identity id plus the plaintext password used.
///
/// `role` of `"client"` keeps the profile's database default; anything else
/// is assigned explicitly.
pub async fn create_test_user(pool: &PgPool, email: &str, role: &str) -> (i64, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let identity = IdentityRepo::create(
        pool,
        &CreateIdentity {
            email: email.to_string(),
            password_hash: hashed,
        },
    )
    .await
    .expect("identity creation should succeed");
    ProfileRepo::create(
        pool,
        &CreateProfile {
            id: identity.id,
            full_name: Some(format!("Test {email}")),
        },
    )
    .await
    .expect("profile creation should succeed");
    if role != "client" {
        ProfileRepo::set_role(pool, identity.id, Some(role))
            .await
            .expect("role assignment should succeed");
    }
    (identity.id, password.to_string())
}

/// Log in via the API and return the JSON response containing
/// `access_token`, `refresh_token`, and `user` info.
pub async fn login(app: Router, email: &str, password: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await
}

/// Log in and return just the access token.
pub async fn login_token(app: Router, email: &str, password: &str) -> String {
    let json = login(app, email, password).await;
    json["access_token"]
        .as_str()
        .expect("login response must contain access_token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request construction cannot fail");
    app.oneshot(request).await.expect("request should complete")
}

/// Collect a response body into JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}
