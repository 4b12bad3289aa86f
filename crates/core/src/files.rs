//! File visibility scoping.
//!
//! Visibility is derived transitively from the parent project: a client sees
//! only files on their own projects, an admin sees everything. A file whose
//! parent project cannot be resolved is hidden from non-admins rather than
//! shown with a null project.

use serde::Serialize;

use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Whoever is asking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: DbId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Deliverable kind: early concept or final artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Concept,
    Final,
}

impl FileKind {
    pub fn parse(raw: &str) -> Option<FileKind> {
        match raw {
            "concept" => Some(FileKind::Concept),
            "final" => Some(FileKind::Final),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Concept => "concept",
            FileKind::Final => "final",
        }
    }
}

/// Ownership annotation from the parent project, when it resolves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileProject {
    pub title: String,
    pub client_id: DbId,
    /// Owning client's display name, for cross-project admin review.
    pub client_name: Option<String>,
}

/// A file joined with its parent project's ownership info.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    pub id: DbId,
    pub project_id: DbId,
    pub file_name: String,
    pub file_url: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub uploaded_at: Timestamp,
    /// `None` when the parent project reference is orphaned.
    pub project: Option<FileProject>,
}

/// Filter `files` down to what `actor` may see, newest first.
///
/// Ordering is deterministic: `uploaded_at` descending, ties broken by id
/// descending, so repeated calls over an unchanged collection agree.
pub fn list_visible(actor: &Actor, files: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut visible: Vec<FileEntry> = files
        .into_iter()
        .filter(|file| match (&file.project, actor.role) {
            (_, Role::Admin) => true,
            (Some(project), _) => project.client_id == actor.id,
            // Orphaned parent: excluded rather than disclosed ambiguously.
            (None, _) => false,
        })
        .collect();
    visible.sort_by(|a, b| {
        b.uploaded_at
            .cmp(&a.uploaded_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    visible
}
