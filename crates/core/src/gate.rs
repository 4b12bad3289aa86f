//! The authorization gate: one pure decision function for every protected
//! view or action.
//!
//! The gate never raises; denial is a routing decision. An unauthenticated
//! actor is sent to sign-in, a signed-in but under-privileged actor is sent
//! to the default dashboard (never back to sign-in), and an unsettled
//! session yields [`Decision::Pending`] so callers render nothing rather
//! than flash a false "unauthenticated" state.

use crate::roles::Role;
use crate::session::SessionState;

/// Where an unauthenticated actor is sent.
pub const SIGN_IN_PATH: &str = "/auth";

/// Where a signed-in but under-privileged actor is sent.
pub const DASHBOARD_PATH: &str = "/dashboard";

/// What a route or action demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any authenticated identity.
    Authenticated,
    /// The admin role. Subsumes `Authenticated`; no separate check needed.
    Admin,
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Render the protected content / perform the action.
    Admit,
    /// Route elsewhere; the actor is not told more than that.
    RedirectTo(&'static str),
    /// Session still resolving: render nothing yet.
    Pending,
}

/// Decide admission for `requirement` given the current session state.
///
/// `Pending` is checked before any role logic since the profile is not
/// available until resolution completes.
pub fn decide(state: &SessionState, requirement: Requirement) -> Decision {
    if state.resolving {
        return Decision::Pending;
    }
    if state.identity.is_none() {
        return Decision::RedirectTo(SIGN_IN_PATH);
    }
    match requirement {
        Requirement::Authenticated => Decision::Admit,
        Requirement::Admin => {
            if state.role() == Role::Admin {
                Decision::Admit
            } else {
                Decision::RedirectTo(DASHBOARD_PATH)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::profile::Profile;
    use crate::session::Identity;
    use crate::types::DbId;

    fn state(identity: Option<DbId>, role: Option<Role>, resolving: bool) -> SessionState {
        SessionState {
            resolving,
            identity: identity.map(|id| Identity {
                id,
                email: format!("u{id}@example.test"),
            }),
            profile: role.map(|role| Profile {
                id: identity.unwrap_or_default(),
                full_name: None,
                role,
                company: None,
                avatar_url: None,
                created_at: chrono::Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            }),
        }
    }

    #[test]
    fn test_resolving_is_pending_before_any_role_check() {
        let s = state(Some(1), Some(Role::Admin), true);
        assert_eq!(decide(&s, Requirement::Authenticated), Decision::Pending);
        assert_eq!(decide(&s, Requirement::Admin), Decision::Pending);
    }

    #[test]
    fn test_unauthenticated_redirects_to_sign_in() {
        let s = state(None, None, false);
        assert_eq!(
            decide(&s, Requirement::Authenticated),
            Decision::RedirectTo(SIGN_IN_PATH)
        );
        assert_eq!(
            decide(&s, Requirement::Admin),
            Decision::RedirectTo(SIGN_IN_PATH)
        );
    }

    #[test]
    fn test_under_privileged_redirects_to_dashboard_not_sign_in() {
        for role in [Role::Client, Role::Creative, Role::Unassigned] {
            let s = state(Some(2), Some(role), false);
            assert_eq!(
                decide(&s, Requirement::Admin),
                Decision::RedirectTo(DASHBOARD_PATH),
                "role {role:?} must not reach an admin route"
            );
        }
    }

    #[test]
    fn test_admin_route_admits_only_admin() {
        let s = state(Some(3), Some(Role::Admin), false);
        assert_eq!(decide(&s, Requirement::Admin), Decision::Admit);
        // Admin subsumes the authenticated requirement.
        assert_eq!(decide(&s, Requirement::Authenticated), Decision::Admit);
    }

    #[test]
    fn test_identity_without_profile_is_authenticated_but_never_admin() {
        let s = state(Some(4), None, false);
        assert_eq!(decide(&s, Requirement::Authenticated), Decision::Admit);
        assert_eq!(
            decide(&s, Requirement::Admin),
            Decision::RedirectTo(DASHBOARD_PATH)
        );
    }
}
