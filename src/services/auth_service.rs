//! Domain service for authentication and user management.
//!
//! Handles registration, email verification, login, password reset, profile
//! self-service and admin role management.

use serde::Serialize;
use thiserror::Error;

use crate::constants::TOKEN_TYPE;
use crate::domain::UserKey;
use crate::models::{NewUser, ProfileUpdate, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad signature, malformed, expired or wrong-purpose token.
    #[error("Invalid token")]
    InvalidToken,

    /// A valid token whose subject no longer exists.
    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    #[must_use]
    pub const fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE,
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Checks a username/password pair. Unknown users and wrong passwords are
    /// indistinguishable: both yield `Ok(None)`.
    async fn authenticate(&self, username: &str, password: &str)
    -> Result<Option<User>, AuthError>;

    /// Resolves the holder of an access token.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidToken`] for any token failure,
    /// [`AuthError::UserNotFound`] if the subject has been deleted.
    async fn resolve_current_user(&self, token: &str) -> Result<User, AuthError>;

    /// Creates an inactive, non-admin user and mails a verification link.
    ///
    /// # Errors
    ///
    /// [`AuthError::Conflict`] if the username or email is taken.
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Activates the user named by a verification token. Idempotent.
    async fn verify_email(&self, token: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] on a bad pair, [`AuthError::Forbidden`]
    /// when the credentials are right but the account is not yet verified.
    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError>;

    /// Issues a fresh access token for an already authenticated user.
    async fn refresh(&self, user: &User) -> Result<TokenResponse, AuthError>;

    /// Mails a reset link if the address is registered. Succeeds either way.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError>;

    /// Applies username/email/password changes. Role flags are never touched.
    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, AuthError>;

    /// Deletes the caller's own record and returns it.
    async fn delete_account(&self, user: &User) -> Result<User, AuthError>;

    async fn list_users(&self, actor: &User) -> Result<Vec<User>, AuthError>;

    /// Grants or revokes admin on `target`. `actor` must be an active admin,
    /// and may not revoke their own rights.
    async fn set_admin(
        &self,
        actor: &User,
        target: &UserKey,
        is_admin: bool,
    ) -> Result<User, AuthError>;

    /// Bootstraps an active admin without the verification round trip.
    async fn create_admin(&self, new_user: NewUser) -> Result<User, AuthError>;
}
