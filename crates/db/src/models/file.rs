//! File entity model and DTOs.

use atelier_core::error::CoreError;
use atelier_core::files::{FileEntry, FileKind, FileProject};
use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A file row from the `files` table. The kind column serializes as
/// `type` on the wire.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectFile {
    pub id: DbId,
    pub project_id: DbId,
    pub file_name: String,
    pub file_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub uploaded_at: Timestamp,
}

/// DTO for registering an uploaded file.
#[derive(Debug)]
pub struct CreateFile {
    pub project_id: DbId,
    pub file_name: String,
    pub file_url: String,
    pub kind: FileKind,
}

/// A file left-joined with its parent project and the owning client's
/// profile -- the input shape for the core's visibility scoping.
#[derive(Debug, Clone, FromRow)]
pub struct FileWithProject {
    pub id: DbId,
    pub project_id: DbId,
    pub file_name: String,
    pub file_url: String,
    pub kind: String,
    pub uploaded_at: Timestamp,
    pub project_title: Option<String>,
    pub project_client_id: Option<DbId>,
    pub client_name: Option<String>,
}

impl FileWithProject {
    /// Convert into the core's scoping entry. A missing joined project maps
    /// to `project: None` (orphaned reference).
    pub fn into_entry(self) -> Result<FileEntry, CoreError> {
        let kind = FileKind::parse(&self.kind).ok_or_else(|| {
            CoreError::Internal(format!("file {} has unknown kind '{}'", self.id, self.kind))
        })?;
        let project = match (self.project_title, self.project_client_id) {
            (Some(title), Some(client_id)) => Some(FileProject {
                title,
                client_id,
                client_name: self.client_name,
            }),
            _ => None,
        };
        Ok(FileEntry {
            id: self.id,
            project_id: self.project_id,
            file_name: self.file_name,
            file_url: self.file_url,
            kind,
            uploaded_at: self.uploaded_at,
            project,
        })
    }
}
