//! Profile entity model and DTOs.

use atelier_core::profile;
use atelier_core::roles::Role;
use atelier_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A profile row from the `profiles` table. Shares its id with the owning
/// identity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub full_name: Option<String>,
    /// Raw role column; NULL or unknown values read as unassigned.
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    pub fn role(&self) -> Role {
        Role::parse(self.role.as_deref())
    }

    pub fn to_domain(&self) -> profile::Profile {
        profile::Profile {
            id: self.id,
            full_name: self.full_name.clone(),
            role: self.role(),
            company: self.company.clone(),
            avatar_url: self.avatar_url.clone(),
            created_at: self.created_at,
        }
    }
}

/// DTO for creating a profile at sign-up completion. The role column takes
/// its database default (`client`).
#[derive(Debug)]
pub struct CreateProfile {
    pub id: DbId,
    pub full_name: Option<String>,
}

/// DTO for an identity updating its own profile fields. All optional.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
}

/// Profile joined with its identity's email, for admin user listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfileWithEmail {
    pub id: DbId,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub email: String,
    pub created_at: Timestamp,
}
