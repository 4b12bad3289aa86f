//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches, where patching exists
//!
//! Enum-valued columns (role, status, kind) are TEXT in the row structs and
//! are parsed into the `atelier-core` enums at the boundary, so the core
//! stays free of sqlx.

pub mod file;
pub mod identity;
pub mod password_reset;
pub mod profile;
pub mod project;
pub mod session;
