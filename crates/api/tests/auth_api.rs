//! HTTP-level integration tests for the auth endpoints.
//!
//! Tests cover sign-up, sign-in, token refresh and rotation, sign-out, and
//! the password-reset flow.

mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{body_json, create_test_user, get_auth, login, post_json};
use sqlx::PgPool;

use atelier_api::auth::jwt::generate_opaque_token;
use atelier_db::models::password_reset::CreatePasswordReset;
use atelier_db::repositories::PasswordResetRepo;

// ---------------------------------------------------------------------------
// Sign-up
// ---------------------------------------------------------------------------

/// Sign-up creates an identity and a profile defaulting to the client role,
/// returning tokens directly.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_creates_client_profile(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "new@studio.test",
        "password": "a-strong-password",
        "full_name": "New Client",
    });
    let response = post_json(app.clone(), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;

    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "new@studio.test");
    assert_eq!(json["user"]["role"], "client");

    // The profile is resolvable right away.
    let token = json["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/auth/me", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["profile"]["role"], "client");
    assert_eq!(me["profile"]["full_name"], "New Client");
}

/// A duplicate email is rejected with 409 Conflict.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_duplicate_email_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({
        "email": "dup@studio.test",
        "password": "a-strong-password",
        "full_name": "First",
    });
    let response = post_json(app.clone(), "/api/v1/auth/signup", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Weak passwords and malformed emails are rejected before any write.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_validation(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "email": "weak@studio.test",
        "password": "short",
        "full_name": "Weak",
    });
    let response = post_json(app.clone(), "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({
        "email": "not-an-email",
        "password": "a-strong-password",
        "full_name": "Bad Email",
    });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

/// Successful login returns tokens and identity info.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let (id, password) = create_test_user(&pool, "login@studio.test", "client").await;
    let app = common::build_test_app(pool);

    let json = login(app, "login@studio.test", &password).await;
    assert_eq!(json["user"]["id"], id);
    assert_eq!(json["user"]["email"], "login@studio.test");
    assert_eq!(json["user"]["role"], "client");
    assert!(json["expires_in"].is_number());
}

/// Wrong password and unknown email both yield 401 with the same shape.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_bad_credentials(pool: PgPool) {
    let (_id, _password) = create_test_user(&pool, "victim@studio.test", "client").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "victim@studio.test", "password": "wrong" });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = serde_json::json!({ "email": "ghost@studio.test", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Refresh & logout
// ---------------------------------------------------------------------------

/// A valid refresh token returns new tokens, and the old one is rotated out.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    let (_id, password) = create_test_user(&pool, "refresher@studio.test", "client").await;
    let app = common::build_test_app(pool);

    let json = login(app.clone(), "refresher@studio.test", &password).await;
    let refresh_token = json["refresh_token"].as_str().unwrap().to_string();

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body.clone()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;
    assert_ne!(
        refreshed["refresh_token"].as_str().unwrap(),
        refresh_token,
        "refresh token must rotate on use"
    );

    // The spent token cannot be replayed.
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes every session: the refresh token stops working.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let (_id, password) = create_test_user(&pool, "leaver@studio.test", "client").await;
    let app = common::build_test_app(pool);

    let json = login(app.clone(), "leaver@studio.test", &password).await;
    let access_token = json["access_token"].as_str().unwrap();
    let refresh_token = json["refresh_token"].as_str().unwrap();

    let response = common::post_json_auth(
        app.clone(),
        "/api/v1/auth/logout",
        serde_json::json!({}),
        access_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Password reset
// ---------------------------------------------------------------------------

/// The request endpoint answers 204 for known and unknown addresses alike.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_request_does_not_disclose_accounts(pool: PgPool) {
    let (_id, _password) = create_test_user(&pool, "known@studio.test", "client").await;
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "known@studio.test" });
    let response = post_json(app.clone(), "/api/v1/auth/password-reset/request", body).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "email": "unknown@studio.test" });
    let response = post_json(app, "/api/v1/auth/password-reset/request", body).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// Confirming a valid token sets the new password, revokes sessions, and
/// burns the token.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reset_confirm_flow(pool: PgPool) {
    let (id, old_password) = create_test_user(&pool, "forgetful@studio.test", "client").await;

    // Issue a token directly so the plaintext is known to the test.
    let (token, token_hash) = generate_opaque_token();
    PasswordResetRepo::create(
        &pool,
        &CreatePasswordReset {
            identity_id: id,
            token_hash,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        },
    )
    .await
    .expect("reset token creation should succeed");

    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "token": token, "new_password": "a-brand-new-password" });
    let response = post_json(app.clone(), "/api/v1/auth/password-reset/confirm", body.clone()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // New password works, old one does not.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "email": "forgetful@studio.test", "password": "a-brand-new-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/login",
        serde_json::json!({ "email": "forgetful@studio.test", "password": old_password }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Single-use: replaying the token fails.
    let response = post_json(app, "/api/v1/auth/password-reset/confirm", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
