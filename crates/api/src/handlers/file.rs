//! Handlers for the `/files` resource and admin upload/delete.

use atelier_core::error::CoreError;
use atelier_core::files::{self, FileEntry, FileKind};
use atelier_core::types::DbId;
use atelier_db::models::file::{CreateFile, ProjectFile};
use atelier_db::repositories::{FileRepo, ProjectRepo};
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/files
///
/// Every file the actor may see, newest upload first. Admins get the full
/// vault with project and client annotations; everyone else gets exactly
/// their own projects' files.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(actor): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<FileEntry>>>> {
    let rows = FileRepo::list_all_with_project(&state.pool).await?;
    let entries = rows
        .into_iter()
        .map(|row| row.into_entry())
        .collect::<Result<Vec<_>, _>>()?;
    let visible = files::list_visible(&actor.scope(), entries);
    Ok(Json(DataResponse { data: visible }))
}

/// POST /api/v1/admin/projects/{project_id}/files
///
/// Multipart upload of a deliverable. Expects a `kind` text part
/// (`concept` or `final`) and a `file` part. The bytes go to object
/// storage; only the resulting URL is recorded.
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(project_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProjectFile>)> {
    ProjectRepo::find_by_id(&state.pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;

    let mut kind: Option<FileKind> = None;
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("kind") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("Unreadable kind field: {err}")))?;
                kind = Some(FileKind::parse(&raw).ok_or_else(|| {
                    AppError::Core(CoreError::Validation(
                        "File kind must be 'concept' or 'final'".into(),
                    ))
                })?);
            }
            Some("file") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("unnamed")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::BadRequest(format!("Unreadable file field: {err}")))?;
                upload = Some((file_name, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let kind = kind.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing 'kind' field".into()))
    })?;
    let (file_name, content_type, bytes) = upload.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Missing 'file' field".into()))
    })?;

    let object_path = format!("projects/{project_id}/{}_{file_name}", Uuid::new_v4());
    let file_url = state
        .object_store
        .put(&object_path, bytes, &content_type)
        .await?;

    let file = FileRepo::create(
        &state.pool,
        &CreateFile {
            project_id,
            file_name,
            file_url,
            kind,
        },
    )
    .await?;

    tracing::info!(file_id = file.id, project_id, kind = kind.as_str(), "file uploaded");
    Ok((StatusCode::CREATED, Json(file)))
}

/// DELETE /api/v1/admin/files/{id}
///
/// Irreversible. The row is removed; subsequent listings can never include
/// it. The stored object is retained (see DESIGN.md, cascade policy).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = FileRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound { entity: "File", id }));
    }
    tracing::info!(file_id = id, admin_id = admin.identity.id, "file deleted");
    Ok(StatusCode::NO_CONTENT)
}
