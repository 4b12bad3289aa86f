//! Password-reset token model and DTO.

use atelier_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A reset-token row from the `password_resets` table.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
    pub id: DbId,
    pub identity_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for issuing a reset token.
pub struct CreatePasswordReset {
    pub identity_id: DbId,
    pub token_hash: String,
    pub expires_at: Timestamp,
}
