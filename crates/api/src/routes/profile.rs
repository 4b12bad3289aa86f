//! Route definitions for the `/me` resource.

use axum::routing::put;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// PUT /profile -> update_me (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/profile", put(profile::update_me))
}
