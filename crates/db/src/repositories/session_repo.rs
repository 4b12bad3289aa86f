//! Repository for the `identity_sessions` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::{CreateSession, IdentitySession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, identity_id, refresh_token_hash, expires_at, is_revoked, \
                       user_agent, ip_address, created_at, updated_at";

/// Provides CRUD operations for refresh-token sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSession,
    ) -> Result<IdentitySession, sqlx::Error> {
        let query = format!(
            "INSERT INTO identity_sessions
                 (identity_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentitySession>(&query)
            .bind(input.identity_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Find an active session by its refresh token hash.
    ///
    /// Only returns sessions that are not revoked and not expired.
    pub async fn find_by_refresh_token_hash(
        pool: &PgPool,
        hash: &str,
    ) -> Result<Option<IdentitySession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM identity_sessions
             WHERE refresh_token_hash = $1
               AND is_revoked = FALSE
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, IdentitySession>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a single session. Returns `true` if the row was updated.
    pub async fn revoke(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identity_sessions SET is_revoked = TRUE, updated_at = NOW()
             WHERE id = $1 AND is_revoked = FALSE",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke all active sessions for an identity. Returns the count revoked.
    pub async fn revoke_all_for_identity(
        pool: &PgPool,
        identity_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE identity_sessions SET is_revoked = TRUE, updated_at = NOW()
             WHERE identity_id = $1 AND is_revoked = FALSE",
        )
        .bind(identity_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete expired or revoked sessions. Returns the count deleted.
    pub async fn cleanup_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM identity_sessions WHERE expires_at < NOW() OR is_revoked = TRUE",
        )
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
