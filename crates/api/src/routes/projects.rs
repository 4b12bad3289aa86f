//! Route definitions for the `/projects` resource (client surface).

use axum::routing::get;
use axum::Router;

use crate::handlers::project;
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET  /      -> list_mine
/// POST /      -> create (brief submission)
/// GET  /{id}  -> get_by_id (owner or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list_mine).post(project::create))
        .route("/{id}", get(project::get_by_id))
}
