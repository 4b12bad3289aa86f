//! Repository for the `password_resets` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::password_reset::{CreatePasswordReset, PasswordReset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, identity_id, token_hash, expires_at, used_at, created_at";

/// Provides operations for password-reset tokens.
pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Insert a new reset token, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePasswordReset,
    ) -> Result<PasswordReset, sqlx::Error> {
        let query = format!(
            "INSERT INTO password_resets (identity_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(input.identity_id)
            .bind(&input.token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find an unused, unexpired token by its hash.
    pub async fn find_valid_by_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<PasswordReset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_resets
             WHERE token_hash = $1
               AND used_at IS NULL
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, PasswordReset>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Burn a token so it cannot be replayed. Returns `true` if it was
    /// still unused.
    pub async fn mark_used(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE password_resets SET used_at = NOW() WHERE id = $1 AND used_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
