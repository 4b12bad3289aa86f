//! The authorization discriminant.
//!
//! Role names on the wire and in the database are lowercase strings; the
//! `profiles.role` column is nullable, and a NULL or unrecognized value maps
//! to [`Role::Unassigned`]. `Unassigned` is deliberately distinct from
//! `Client`: it satisfies no requirement.

use serde::{Deserialize, Serialize};

/// Well-known role name constants. These must match the CHECK constraint in
/// `0002_create_profiles.sql`.
pub const ROLE_CLIENT: &str = "client";
pub const ROLE_CREATIVE: &str = "creative";
pub const ROLE_ADMIN: &str = "admin";

/// Closed set of roles a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Creative,
    Admin,
    /// No role assigned yet (NULL column) or an unrecognized value.
    /// Authorizes nothing.
    Unassigned,
}

impl Role {
    /// Total parse from a nullable database column.
    pub fn parse(raw: Option<&str>) -> Role {
        match raw {
            Some(ROLE_CLIENT) => Role::Client,
            Some(ROLE_CREATIVE) => Role::Creative,
            Some(ROLE_ADMIN) => Role::Admin,
            _ => Role::Unassigned,
        }
    }

    /// Persisted form. `Unassigned` is never written, it is the absence of a
    /// value.
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Role::Client => Some(ROLE_CLIENT),
            Role::Creative => Some(ROLE_CREATIVE),
            Role::Admin => Some(ROLE_ADMIN),
            Role::Unassigned => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_roles() {
        assert_eq!(Role::parse(Some("client")), Role::Client);
        assert_eq!(Role::parse(Some("creative")), Role::Creative);
        assert_eq!(Role::parse(Some("admin")), Role::Admin);
    }

    #[test]
    fn test_null_and_unknown_map_to_unassigned() {
        assert_eq!(Role::parse(None), Role::Unassigned);
        assert_eq!(Role::parse(Some("superuser")), Role::Unassigned);
        assert_eq!(Role::parse(Some("")), Role::Unassigned);
        // Unassigned must never read as an affirmative role.
        assert_ne!(Role::parse(None), Role::Client);
    }

    #[test]
    fn test_round_trip() {
        for role in [Role::Client, Role::Creative, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), role);
        }
        assert_eq!(Role::Unassigned.as_str(), None);
    }
}
