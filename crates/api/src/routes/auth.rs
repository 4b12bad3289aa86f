//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /signup                    -> signup
/// POST /login                     -> login
/// POST /refresh                   -> refresh
/// POST /logout                    -> logout (requires auth)
/// GET  /me                        -> me (requires auth)
/// POST /password-reset/request    -> request_password_reset
/// POST /password-reset/confirm    -> confirm_password_reset
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/password-reset/request", post(auth::request_password_reset))
        .route("/password-reset/confirm", post(auth::confirm_password_reset))
}
