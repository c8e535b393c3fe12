use axum::{
    Form, Json,
    extract::{FromRequestParts, Path, State},
    http::{HeaderMap, header, request::Parts},
};
use std::sync::Arc;

use super::{
    ApiError, AppState, LoginForm, MessageResponse, NewPasswordRequest, PasswordResetRequest,
};
use crate::constants::messages;
use crate::domain::UserKey;
use crate::models::{NewUser, ProfileUpdate, User};
use crate::services::{AuthError, TokenResponse, access};

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::unauthorized(messages::INVALID_CREDENTIALS),
            AuthError::InvalidToken => Self::unauthorized(messages::INVALID_TOKEN),
            AuthError::UserNotFound => Self::NotFound("User not found".to_string()),
            AuthError::Forbidden(msg) => Self::Forbidden(msg),
            AuthError::Conflict(msg) | AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The user behind a valid access token.
pub struct CurrentUser(pub User);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized(messages::NOT_AUTHENTICATED))?;

        let user = state.auth_service().resolve_current_user(token).await?;
        tracing::Span::current().record("user_key", user.key.as_str());

        Ok(Self(user))
    }
}

/// The user behind a valid access token whose account is verified.
pub struct ActiveUser(pub User);

impl FromRequestParts<Arc<AppState>> for ActiveUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self(access::require_active(user)?))
    }
}

/// An active admin.
pub struct AdminUser(pub User);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        Ok(Self(access::require_admin(user)?))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewUser>,
) -> Result<Json<User>, ApiError> {
    let user = state.auth_service().register(payload).await?;
    Ok(Json(user))
}

/// GET /auth/verify/{token}
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.auth_service().verify_email(&token).await?;
    Ok(Json(MessageResponse::new(messages::USER_VERIFIED)))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .auth_service()
        .login(&form.username, &form.password)
        .await?;
    Ok(Json(token))
}

/// POST /auth/reset-password-request
///
/// Always answers with the same message so the response does not reveal
/// whether the address is registered.
pub async fn reset_password_request(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service()
        .request_password_reset(&payload.email)
        .await?;
    Ok(Json(MessageResponse::new(messages::RESET_REQUESTED)))
}

/// POST /auth/reset-password/{token}
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(payload): Json<NewPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .auth_service()
        .reset_password(&token, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new(messages::PASSWORD_RESET)))
}

/// GET /auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

/// POST /auth/refresh-token
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.auth_service().refresh(&user).await?))
}

/// PUT /auth/update
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    ActiveUser(user): ActiveUser,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    let updated = state.auth_service().update_profile(&user, payload).await?;
    Ok(Json(updated))
}

/// DELETE /auth/delete/me
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    ActiveUser(user): ActiveUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.auth_service().delete_account(&user).await?))
}

/// GET /auth/list
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(state.auth_service().list_users(&admin).await?))
}

/// PUT /auth/promote/{user_key}
pub async fn promote(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_key): Path<String>,
) -> Result<Json<User>, ApiError> {
    super::validation::validate_key("User", &user_key)?;
    let user = state
        .auth_service()
        .set_admin(&admin, &UserKey::from(user_key), true)
        .await?;
    Ok(Json(user))
}

/// PUT /auth/demote/{user_key}
pub async fn demote(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(user_key): Path<String>,
) -> Result<Json<User>, ApiError> {
    super::validation::validate_key("User", &user_key)?;
    let user = state
        .auth_service()
        .set_admin(&admin, &UserKey::from(user_key), false)
        .await?;
    Ok(Json(user))
}
