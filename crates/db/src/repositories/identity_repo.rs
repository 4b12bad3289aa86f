//! Repository for the `identities` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::identity::{CreateIdentity, Identity};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, email, password_hash, is_active, last_sign_in_at, created_at, updated_at";

/// Provides CRUD operations for identities.
pub struct IdentityRepo;

impl IdentityRepo {
    /// Insert a new identity, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateIdentity) -> Result<Identity, sqlx::Error> {
        let query = format!(
            "INSERT INTO identities (email, password_hash)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Identity>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Find an identity by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE id = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an identity by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Identity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM identities WHERE email = $1");
        sqlx::query_as::<_, Identity>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Stamp a successful sign-in.
    pub async fn record_sign_in(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE identities SET last_sign_in_at = NOW(), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Replace the stored password hash. Returns `true` if a row was updated.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identities SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
