//! Route tree assembly.

pub mod admin;
pub mod auth;
pub mod files;
pub mod health;
pub mod profile;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                         sign up (public)
/// /auth/login                          sign in (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         sign out (requires auth)
/// /auth/me                             identity + profile (requires auth)
/// /auth/password-reset/request         issue reset token (public)
/// /auth/password-reset/confirm         consume reset token (public)
///
/// /me/profile                          update own profile (requires auth)
///
/// /projects                            list own, submit brief (requires auth)
/// /projects/{id}                       get own project (owner or admin)
///
/// /files                               scoped file listing (requires auth)
///
/// /admin/projects                      list all, with ?status= filter
/// /admin/projects/{id}                 detail with client + files, save
/// /admin/projects/{id}/files           upload deliverable
/// /admin/files/{id}                    delete file
/// /admin/users                         list users
/// /admin/users/{id}/role               assign role
/// /admin/overview                      headline counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/me", profile::router())
        .nest("/projects", projects::router())
        .nest("/files", files::router())
        .nest("/admin", admin::router())
}
