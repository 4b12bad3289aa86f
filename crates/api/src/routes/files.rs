//! Route definitions for the `/files` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::file;
use crate::state::AppState;

/// Routes mounted at `/files`.
///
/// ```text
/// GET / -> list (scoped by the caller's role)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(file::list))
}
