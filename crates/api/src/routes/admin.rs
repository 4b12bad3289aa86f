//! Route definitions for the `/admin` resource.
//!
//! Every handler behind this router requires the admin role.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{admin, file, project};
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /projects              -> admin_list (?status= filter)
/// GET    /projects/{id}         -> admin_get (client + files)
/// PUT    /projects/{id}         -> admin_update (lifecycle save)
/// POST   /projects/{id}/files   -> upload deliverable
/// DELETE /files/{id}            -> delete file
/// GET    /users                 -> list_users
/// PUT    /users/{id}/role       -> set_role
/// GET    /overview              -> overview counts
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(project::admin_list))
        .route(
            "/projects/{id}",
            get(project::admin_get).put(project::admin_update),
        )
        .route("/projects/{id}/files", post(file::upload))
        .route("/files/{id}", delete(file::delete))
        .route("/users", get(admin::list_users))
        .route("/users/{id}/role", put(admin::set_role))
        .route("/overview", get(admin::overview))
}
