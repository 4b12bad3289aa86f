//! Handlers for the authenticated identity's own profile.

use atelier_core::error::CoreError;
use atelier_db::models::profile::{Profile, UpdateProfile};
use atelier_db::repositories::ProfileRepo;
use axum::extract::State;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::state::AppState;

/// PUT /api/v1/me/profile
///
/// Update the caller's own profile fields (name, company, avatar). The role
/// column is not touchable here; only admins change roles.
pub async fn update_me(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<Profile>> {
    let profile = ProfileRepo::update_fields(&state.pool, actor.identity.id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: actor.identity.id,
        }))?;
    Ok(Json(profile))
}
