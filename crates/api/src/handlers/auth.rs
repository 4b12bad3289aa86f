//! Handlers for the `/auth` resource (sign-up, sign-in, refresh, sign-out,
//! password reset).

use atelier_core::error::CoreError;
use atelier_core::profile::Profile;
use atelier_core::roles::Role;
use atelier_core::types::DbId;
use atelier_db::models::identity::{CreateIdentity, Identity};
use atelier_db::models::password_reset::CreatePasswordReset;
use atelier_db::models::profile::CreateProfile;
use atelier_db::models::session::CreateSession;
use atelier_db::repositories::{IdentityRepo, PasswordResetRepo, ProfileRepo, SessionRepo};
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_opaque_token, hash_opaque_token};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Password-reset token lifetime in minutes.
const RESET_TOKEN_EXPIRY_MINS: i64 = 60;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 200, message = "Full name must not be empty"))]
    pub full_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/password-reset/request`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request body for `POST /auth/password-reset/confirm`.
#[derive(Debug, Deserialize)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Successful authentication response returned by signup, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// Public identity info embedded in [`AuthResponse`].
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub email: String,
    pub role: Role,
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub email: String,
    /// `None` when the profile row is missing; the actor then holds no role.
    pub profile: Option<Profile>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/signup
///
/// Create an identity and its profile row (role defaults to `client`),
/// returning tokens directly.
pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    input
        .validate()
        .map_err(|err| AppError::Core(CoreError::Validation(err.to_string())))?;
    validate_password_strength(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let hashed = hash_password(&input.password)
        .map_err(|err| AppError::InternalError(format!("Password hashing error: {err}")))?;

    // A duplicate email surfaces as 409 via the uq_identities_email
    // constraint.
    let identity = IdentityRepo::create(
        &state.pool,
        &CreateIdentity {
            email: input.email,
            password_hash: hashed,
        },
    )
    .await?;

    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            id: identity.id,
            full_name: Some(input.full_name),
        },
    )
    .await?;

    tracing::info!(identity_id = identity.id, "new identity signed up");

    let response = create_auth_response(&state, &identity, profile.role()).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let identity = IdentityRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    if !identity.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &identity.password_hash)
        .map_err(|err| AppError::InternalError(format!("Password verification error: {err}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        )));
    }

    IdentityRepo::record_sign_in(&state.pool, identity.id).await?;

    let role = ProfileRepo::find_by_id(&state.pool, identity.id)
        .await?
        .map_or(Role::Unassigned, |p| p.role());

    let response = create_auth_response(&state, &identity, role).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_opaque_token(&input.refresh_token);

    let session = SessionRepo::find_by_refresh_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    // Token rotation: the presented token is burned whether or not the rest
    // of the exchange succeeds.
    SessionRepo::revoke(&state.pool, session.id).await?;

    let identity = IdentityRepo::find_by_id(&state.pool, session.identity_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !identity.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role = ProfileRepo::find_by_id(&state.pool, identity.id)
        .await?
        .map_or(Role::Unassigned, |p| p.role());

    let response = create_auth_response(&state, &identity, role).await?;
    Ok(Json(response))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated identity. Returns 204.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    SessionRepo::revoke_all_for_identity(&state.pool, user.identity.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// The current identity plus its resolved profile.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> AppResult<Json<MeResponse>> {
    let identity = IdentityRepo::find_by_id(&state.pool, user.identity.id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let profile = ProfileRepo::find_by_id(&state.pool, identity.id)
        .await?
        .map(|p| p.to_domain());

    Ok(Json(MeResponse {
        id: identity.id,
        email: identity.email,
        profile,
    }))
}

/// POST /api/v1/auth/password-reset/request
///
/// Issue a reset token for the given email. Always returns 204 so the
/// endpoint does not disclose which addresses exist.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetRequest>,
) -> AppResult<StatusCode> {
    let Some(identity) = IdentityRepo::find_by_email(&state.pool, &input.email).await? else {
        tracing::debug!("password reset requested for unknown email");
        return Ok(StatusCode::NO_CONTENT);
    };

    let (token, token_hash) = generate_opaque_token();
    let expires_at = Utc::now() + chrono::Duration::minutes(RESET_TOKEN_EXPIRY_MINS);
    PasswordResetRepo::create(
        &state.pool,
        &CreatePasswordReset {
            identity_id: identity.id,
            token_hash,
            expires_at,
        },
    )
    .await?;

    state
        .mailer
        .send_password_reset(&identity.email, &token)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/password-reset/confirm
///
/// Consume a reset token and set the new password. All existing sessions
/// are revoked.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(input): Json<PasswordResetConfirm>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let token_hash = hash_opaque_token(&input.token);
    let reset = PasswordResetRepo::find_valid_by_token_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired reset token".into(),
            ))
        })?;

    // Single-use: losing the race to another confirm invalidates this one.
    let burned = PasswordResetRepo::mark_used(&state.pool, reset.id).await?;
    if !burned {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired reset token".into(),
        )));
    }

    let hashed = hash_password(&input.new_password)
        .map_err(|err| AppError::InternalError(format!("Password hashing error: {err}")))?;
    IdentityRepo::set_password_hash(&state.pool, reset.identity_id, &hashed).await?;
    SessionRepo::revoke_all_for_identity(&state.pool, reset.identity_id).await?;

    tracing::info!(identity_id = reset.identity_id, "password reset completed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate access + refresh tokens, persist a session row, and build the
/// response.
async fn create_auth_response(
    state: &AppState,
    identity: &Identity,
    role: Role,
) -> AppResult<AuthResponse> {
    let role_name = role.as_str().unwrap_or("unassigned");
    let access_token =
        generate_access_token(identity.id, &identity.email, role_name, &state.config.jwt)
            .map_err(|err| AppError::InternalError(format!("Token generation error: {err}")))?;

    let (refresh_plaintext, refresh_hash) = generate_opaque_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            identity_id: identity.id,
            refresh_token_hash: refresh_hash,
            expires_at,
            user_agent: None,
            ip_address: None,
        },
    )
    .await?;

    let expires_in = state.config.jwt.access_token_expiry_mins * 60;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in,
        user: UserInfo {
            id: identity.id,
            email: identity.email.clone(),
            role,
        },
    })
}
