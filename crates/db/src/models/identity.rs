//! Identity entity model and DTOs.

use atelier_core::session;
use atelier_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Full identity row from the `identities` table.
///
/// Contains the password hash -- never serialize this to API responses.
#[derive(Debug, Clone, FromRow)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_sign_in_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Identity {
    /// The opaque account reference the core works with.
    pub fn to_domain(&self) -> session::Identity {
        session::Identity {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

/// DTO for creating a new identity.
#[derive(Debug)]
pub struct CreateIdentity {
    pub email: String,
    pub password_hash: String,
}
