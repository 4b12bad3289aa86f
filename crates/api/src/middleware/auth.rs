//! JWT-based authentication extractor for Axum handlers.

use atelier_core::error::CoreError;
use atelier_core::session::Identity;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated identity extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Carries only what the token proves. Handlers that make authorization
/// decisions should use the gate-backed extractors in
/// [`crate::middleware::rbac`] instead, which resolve the live role.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated identity (id + email from the claims).
    pub identity: Identity,
    /// Role name at token issue time. Informational; gated routes
    /// re-resolve the role from the profile.
    pub role_claim: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            identity: Identity {
                id: claims.sub,
                email: claims.email,
            },
            role_claim: claims.role,
        })
    }
}
