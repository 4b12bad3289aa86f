//! Project entity model and DTOs.

use atelier_core::error::CoreError;
use atelier_core::lifecycle::{ProjectState, ProjectStatus, ServiceSelection};
use atelier_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub client_id: DbId,
    pub title: String,
    pub services_selected: Json<Vec<ServiceSelection>>,
    pub total_price: i64,
    pub deposit_paid: bool,
    pub status: String,
    pub current_stage: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// The lifecycle-bearing fields, parsed into the core's types.
    ///
    /// The status column carries a CHECK constraint, so a parse failure here
    /// means the row predates the constraint or was mangled; it is surfaced
    /// rather than defaulted.
    pub fn lifecycle(&self) -> Result<ProjectState, CoreError> {
        let status = ProjectStatus::parse(&self.status).ok_or_else(|| {
            CoreError::Internal(format!(
                "project {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;
        Ok(ProjectState {
            status,
            current_stage: self.current_stage,
            deposit_paid: self.deposit_paid,
        })
    }
}

/// A project joined with its owning client's profile, for the admin detail
/// view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectWithClient {
    pub id: DbId,
    pub client_id: DbId,
    pub title: String,
    pub services_selected: Json<Vec<ServiceSelection>>,
    pub total_price: i64,
    pub deposit_paid: bool,
    pub status: String,
    pub current_stage: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub client_name: Option<String>,
    pub client_company: Option<String>,
}

/// Fields persisted by an admin save. Built from a validated
/// [`ProjectState`], never from raw request input.
#[derive(Debug, Clone, Copy)]
pub struct SaveLifecycle {
    pub status: ProjectStatus,
    pub current_stage: i32,
    pub deposit_paid: bool,
}

impl From<ProjectState> for SaveLifecycle {
    fn from(state: ProjectState) -> Self {
        Self {
            status: state.status,
            current_stage: state.current_stage,
            deposit_paid: state.deposit_paid,
        }
    }
}
