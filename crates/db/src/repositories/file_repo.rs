//! Repository for the `files` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::file::{CreateFile, FileWithProject, ProjectFile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, file_name, file_url, kind, uploaded_at";

/// Provides CRUD operations for project files.
pub struct FileRepo;

impl FileRepo {
    /// Register an uploaded file, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFile) -> Result<ProjectFile, sqlx::Error> {
        let query = format!(
            "INSERT INTO files (project_id, file_name, file_url, kind)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(input.project_id)
            .bind(&input.file_name)
            .bind(&input.file_url)
            .bind(input.kind.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a file by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM files WHERE id = $1");
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's files, newest upload first.
    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<ProjectFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM files WHERE project_id = $1
             ORDER BY uploaded_at DESC, id DESC"
        );
        sqlx::query_as::<_, ProjectFile>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// List every file joined with its parent project and the owning
    /// client's profile -- the raw input for visibility scoping.
    pub async fn list_all_with_project(
        pool: &PgPool,
    ) -> Result<Vec<FileWithProject>, sqlx::Error> {
        sqlx::query_as::<_, FileWithProject>(
            "SELECT f.id, f.project_id, f.file_name, f.file_url, f.kind, f.uploaded_at,
                    pr.title AS project_title,
                    pr.client_id AS project_client_id,
                    p.full_name AS client_name
             FROM files f
             LEFT JOIN projects pr ON pr.id = f.project_id
             LEFT JOIN profiles p ON p.id = pr.client_id",
        )
        .fetch_all(pool)
        .await
    }

    /// Permanently delete a file row. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
