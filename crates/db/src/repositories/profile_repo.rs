//! Repository for the `profiles` table.

use atelier_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, Profile, ProfileWithEmail, UpdateProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, role, company, avatar_url, created_at, updated_at";

/// Provides CRUD operations for profiles.
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert the profile row for a fresh identity. The role column takes
    /// its database default.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (id, full_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.id)
            .bind(&input.full_name)
            .fetch_one(pool)
            .await
    }

    /// Find a profile by its identity id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all profiles joined with their identity's email, newest first.
    pub async fn list_with_email(pool: &PgPool) -> Result<Vec<ProfileWithEmail>, sqlx::Error> {
        sqlx::query_as::<_, ProfileWithEmail>(
            "SELECT p.id, p.full_name, p.role, p.company, p.avatar_url,
                    i.email, p.created_at
             FROM profiles p
             JOIN identities i ON i.id = p.id
             ORDER BY p.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update the owner-editable fields. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_fields(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                company = COALESCE($3, company),
                avatar_url = COALESCE($4, avatar_url),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.company)
            .bind(&input.avatar_url)
            .fetch_optional(pool)
            .await
    }

    /// Set the role column (admin-only path). `None` clears it back to
    /// unassigned. Returns `None` if no row exists.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: Option<&str>,
    ) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!(
            "UPDATE profiles SET role = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Count profiles holding a given role.
    pub async fn count_by_role(pool: &PgPool, role: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE role = $1")
                .bind(role)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
