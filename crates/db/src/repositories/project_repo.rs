//! Repository for the `projects` table.

use atelier_core::lifecycle::ProjectDraft;
use atelier_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::project::{Project, ProjectWithClient, SaveLifecycle};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, client_id, title, services_selected, total_price, \
                       deposit_paid, status, current_stage, created_at, updated_at";

/// Joined column list for the admin detail/listing views.
const JOINED_COLUMNS: &str =
    "pr.id, pr.client_id, pr.title, pr.services_selected, pr.total_price, \
     pr.deposit_paid, pr.status, pr.current_stage, pr.created_at, pr.updated_at, \
     p.full_name AS client_name, p.company AS client_company";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a validated brief draft, returning the created row.
    pub async fn create(pool: &PgPool, draft: &ProjectDraft) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects
                 (client_id, title, services_selected, total_price, deposit_paid, status, current_stage)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(draft.client_id)
            .bind(&draft.title)
            .bind(Json(&draft.services_selected))
            .bind(draft.total_price)
            .bind(draft.deposit_paid)
            .bind(draft.status.as_str())
            .bind(draft.current_stage)
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a client's own projects, most recently created first.
    pub async fn list_for_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE client_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// List all projects with client annotations, optionally filtered by
    /// status, most recently created first.
    pub async fn list_all(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<ProjectWithClient>, sqlx::Error> {
        match status {
            Some(status) => {
                let query = format!(
                    "SELECT {JOINED_COLUMNS} FROM projects pr
                     LEFT JOIN profiles p ON p.id = pr.client_id
                     WHERE pr.status = $1
                     ORDER BY pr.created_at DESC"
                );
                sqlx::query_as::<_, ProjectWithClient>(&query)
                    .bind(status)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!(
                    "SELECT {JOINED_COLUMNS} FROM projects pr
                     LEFT JOIN profiles p ON p.id = pr.client_id
                     ORDER BY pr.created_at DESC"
                );
                sqlx::query_as::<_, ProjectWithClient>(&query)
                    .fetch_all(pool)
                    .await
            }
        }
    }

    /// Find a project with its client annotation.
    pub async fn find_with_client(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProjectWithClient>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM projects pr
             LEFT JOIN profiles p ON p.id = pr.client_id
             WHERE pr.id = $1"
        );
        sqlx::query_as::<_, ProjectWithClient>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Persist a validated lifecycle state (admin save).
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn save_lifecycle(
        pool: &PgPool,
        id: DbId,
        save: SaveLifecycle,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                status = $2,
                current_stage = $3,
                deposit_paid = $4,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(save.status.as_str())
            .bind(save.current_stage)
            .bind(save.deposit_paid)
            .fetch_optional(pool)
            .await
    }

    /// Count all projects.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}
