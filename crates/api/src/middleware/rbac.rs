//! Gate-backed authorization extractors.
//!
//! Each extractor assembles a settled [`SessionState`] for the request --
//! bearer identity plus a fresh profile lookup, so role changes apply
//! immediately rather than at token expiry -- and delegates the decision to
//! [`atelier_core::gate::decide`]. The gate's routing outcomes map onto
//! HTTP: the sign-in redirect becomes 401, the dashboard redirect 403.

use atelier_core::error::CoreError;
use atelier_core::files::Actor;
use atelier_core::gate::{self, Decision, Requirement, SIGN_IN_PATH};
use atelier_core::roles::Role;
use atelier_core::session::{Identity, SessionState};
use atelier_db::repositories::ProfileRepo;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An admitted actor: identity plus the live role the gate saw.
#[derive(Debug, Clone)]
pub struct AuthActor {
    pub identity: Identity,
    pub role: Role,
}

impl AuthActor {
    /// The actor shape file scoping works on.
    pub fn scope(&self) -> Actor {
        Actor::new(self.identity.id, self.role)
    }
}

/// Requires any authenticated identity. Rejects with 401 otherwise.
///
/// ```ignore
/// async fn my_handler(RequireAuth(actor): RequireAuth) -> AppResult<Json<()>> {
///     tracing::info!(identity_id = actor.identity.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAuth(pub AuthActor);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Requirement::Authenticated)
            .await
            .map(RequireAuth)
    }
}

/// Requires the admin role. Rejects with 403 for any lesser role.
pub struct RequireAdmin(pub AuthActor);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Requirement::Admin).await.map(RequireAdmin)
    }
}

async fn admit(
    parts: &mut Parts,
    state: &AppState,
    requirement: Requirement,
) -> Result<AuthActor, AppError> {
    let session = match AuthUser::from_request_parts(parts, state).await {
        Ok(user) => {
            let profile = ProfileRepo::find_by_id(&state.pool, user.identity.id).await?;
            SessionState {
                resolving: false,
                identity: Some(user.identity),
                profile: profile.map(|p| p.to_domain()),
            }
        }
        // Missing or invalid bearer token: the gate sees a settled,
        // anonymous session.
        Err(_) => SessionState::anonymous(),
    };

    match gate::decide(&session, requirement) {
        Decision::Admit => {
            let role = session.role();
            session
                .identity
                .map(|identity| AuthActor { identity, role })
                .ok_or_else(|| {
                    AppError::InternalError("gate admitted a session without identity".into())
                })
        }
        Decision::RedirectTo(path) if path == SIGN_IN_PATH => Err(AppError::Core(
            CoreError::Unauthorized("Authentication required".into()),
        )),
        Decision::RedirectTo(_) => Err(AppError::Core(CoreError::Forbidden(
            "Admin role required".into(),
        ))),
        // Server-side sessions are always settled; a pending decision means
        // the state was assembled wrong. Deny without affirming anything.
        Decision::Pending => Err(AppError::Core(CoreError::Unauthorized(
            "Session is still resolving".into(),
        ))),
    }
}
