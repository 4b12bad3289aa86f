//! Domain profile and the resolver seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::roles::Role;
use crate::types::{DbId, Timestamp};

/// Domain record describing a person; exactly one per identity (same id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: DbId,
    pub full_name: Option<String>,
    pub role: Role,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
}

/// Maps an identity id to its profile.
///
/// `Ok(None)` means the profile row does not exist; callers must treat the
/// actor as anonymous/unauthorized, never substitute a fallback role.
#[async_trait]
pub trait ProfileResolver: Send + Sync + 'static {
    async fn resolve(&self, identity_id: DbId) -> Result<Option<Profile>, ProviderError>;
}
