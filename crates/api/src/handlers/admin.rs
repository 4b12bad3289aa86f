//! Handlers for the `/admin` resource (user management, overview stats).
//!
//! All handlers require the `admin` role via [`RequireAdmin`].

use atelier_core::error::CoreError;
use atelier_core::roles::{Role, ROLE_CLIENT};
use atelier_core::types::DbId;
use atelier_db::models::profile::{Profile, ProfileWithEmail};
use atelier_db::repositories::{ProfileRepo, ProjectRepo};
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Response body for `GET /admin/overview`.
#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub projects: i64,
    pub clients: i64,
}

/// GET /api/v1/admin/users
///
/// All profiles joined with their identity's email, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<ProfileWithEmail>>> {
    let users = ProfileRepo::list_with_email(&state.pool).await?;
    Ok(Json(users))
}

/// PUT /api/v1/admin/users/{id}/role
///
/// Assign a role. Only the closed set of role names is accepted; unknown
/// values are rejected rather than stored.
pub async fn set_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetRoleRequest>,
) -> AppResult<Json<Profile>> {
    let role = Role::parse(Some(&input.role));
    if role == Role::Unassigned {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Role must be one of 'client', 'creative', 'admin', got '{}'",
            input.role
        ))));
    }

    let profile = ProfileRepo::set_role(&state.pool, id, role.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id,
        }))?;

    tracing::info!(
        profile_id = id,
        admin_id = admin.identity.id,
        role = input.role,
        "role assigned"
    );
    Ok(Json(profile))
}

/// GET /api/v1/admin/overview
///
/// Headline counts for the admin dashboard.
pub async fn overview(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<OverviewStats>>> {
    let projects = ProjectRepo::count(&state.pool).await?;
    let clients = ProfileRepo::count_by_role(&state.pool, ROLE_CLIENT).await?;
    Ok(Json(DataResponse {
        data: OverviewStats { projects, clients },
    }))
}
