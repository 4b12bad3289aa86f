//! Handlers for the `/projects` resource and its admin counterpart.
//!
//! Clients submit briefs and read their own projects; admins see everything
//! and drive the lifecycle. Visibility never crosses tenants: a foreign
//! project reads as 404.

use atelier_core::error::CoreError;
use atelier_core::lifecycle::{
    self, AdminUpdate, LifecycleWarning, ProjectStatus, ServiceSelection,
};
use atelier_core::roles::Role;
use atelier_core::types::DbId;
use atelier_db::models::file::ProjectFile;
use atelier_db::models::project::{Project, ProjectWithClient};
use atelier_db::repositories::{FileRepo, ProjectRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /projects` (the client brief).
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub services_selected: Vec<ServiceSelection>,
    pub total_price: i64,
}

/// Query filter for `GET /admin/projects`.
#[derive(Debug, Deserialize)]
pub struct ProjectFilter {
    pub status: Option<String>,
}

/// Request body for `PUT /admin/projects/{id}` (the admin save).
#[derive(Debug, Deserialize)]
pub struct UpdateLifecycleRequest {
    pub status: Option<String>,
    pub stage: Option<i32>,
    pub deposit_paid: Option<bool>,
}

/// A project with its derived lifecycle figures.
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Project,
    pub progress_percent: i32,
    pub deposit_amount: i64,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            progress_percent: lifecycle::progress_percent(project.current_stage),
            deposit_amount: lifecycle::deposit_amount(project.total_price),
            project,
        }
    }
}

/// Admin view: project + client annotation + derived figures.
#[derive(Debug, Serialize)]
pub struct AdminProjectResponse {
    #[serde(flatten)]
    pub project: ProjectWithClient,
    pub progress_percent: i32,
    pub deposit_amount: i64,
}

impl From<ProjectWithClient> for AdminProjectResponse {
    fn from(project: ProjectWithClient) -> Self {
        Self {
            progress_percent: lifecycle::progress_percent(project.current_stage),
            deposit_amount: lifecycle::deposit_amount(project.total_price),
            project,
        }
    }
}

/// Admin detail view: the project plus its files, newest upload first.
#[derive(Debug, Serialize)]
pub struct AdminProjectDetail {
    #[serde(flatten)]
    pub project: AdminProjectResponse,
    pub files: Vec<ProjectFile>,
}

// ---------------------------------------------------------------------------
// Client handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/projects
///
/// Submit a brief. The draft always starts at stage 1 / onboarding with the
/// deposit unpaid.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<ProjectResponse>)> {
    let draft = lifecycle::create_draft(
        actor.identity.id,
        &input.title,
        input.services_selected,
        input.total_price,
    )?;
    let project = ProjectRepo::create(&state.pool, &draft).await?;
    tracing::info!(project_id = project.id, client_id = project.client_id, "brief submitted");
    Ok((StatusCode::CREATED, Json(project.into())))
}

/// GET /api/v1/projects
///
/// The authenticated client's own projects, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> AppResult<Json<Vec<ProjectResponse>>> {
    let projects = ProjectRepo::list_for_client(&state.pool, actor.identity.id).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/projects/{id}
///
/// A single project, visible to its owning client and to admins only.
/// Anyone else gets 404, not 403, so existence is not disclosed.
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectResponse>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    if actor.role != Role::Admin && project.client_id != actor.identity.id {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }

    Ok(Json(project.into()))
}

// ---------------------------------------------------------------------------
// Admin handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/projects
///
/// All projects with client annotations, optionally filtered by status.
pub async fn admin_list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(filter): Query<ProjectFilter>,
) -> AppResult<Json<Vec<AdminProjectResponse>>> {
    let status = match filter.status.as_deref() {
        Some(raw) => Some(ProjectStatus::parse(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown status filter '{raw}'")))
        })?),
        None => None,
    };
    let projects = ProjectRepo::list_all(&state.pool, status.map(|s| s.as_str())).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/admin/projects/{id}
///
/// Project detail with client annotation and files.
pub async fn admin_get(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<AdminProjectDetail>> {
    let project = ProjectRepo::find_with_client(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    let files = FileRepo::list_for_project(&state.pool, id).await?;
    Ok(Json(AdminProjectDetail {
        project: project.into(),
        files,
    }))
}

/// PUT /api/v1/admin/projects/{id}
///
/// The admin save: status, stage, deposit flag. Stage regressions and
/// status rollbacks are applied but logged at warn level for audit.
pub async fn admin_update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLifecycleRequest>,
) -> AppResult<Json<ProjectResponse>> {
    let status = match input.status.as_deref() {
        Some(raw) => Some(ProjectStatus::parse(raw).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("Unknown status '{raw}'")))
        })?),
        None => None,
    };

    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    let current = project.lifecycle()?;
    let (next, warnings) = lifecycle::apply_admin_update(
        current,
        AdminUpdate {
            status,
            stage: input.stage,
            deposit_paid: input.deposit_paid,
        },
    )?;

    for warning in &warnings {
        match warning {
            LifecycleWarning::StageRegression { from, to } => {
                tracing::warn!(
                    project_id = id,
                    admin_id = admin.identity.id,
                    from,
                    to,
                    "admin save regressed project stage"
                );
            }
            LifecycleWarning::StatusRollback { from, to } => {
                tracing::warn!(
                    project_id = id,
                    admin_id = admin.identity.id,
                    from = from.as_str(),
                    to = to.as_str(),
                    "admin save rolled back project status"
                );
            }
        }
    }

    let saved = ProjectRepo::save_lifecycle(&state.pool, id, next.into())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;

    Ok(Json(saved.into()))
}
