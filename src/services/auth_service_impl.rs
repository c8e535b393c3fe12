//! Credential-store backed implementation of the `AuthService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::CredentialStore;
use crate::domain::UserKey;
use crate::models::{NewUser, ProfileUpdate, User};
use crate::services::access;
use crate::services::auth_service::{AuthError, AuthService, TokenResponse};
use crate::services::email::Notifier;
use crate::services::password::PasswordHasher;
use crate::services::token::{TokenLifetimes, TokenPurpose, TokenService};
use crate::services::validation::{normalize_email, validate_password, validate_username};

fn record_event(event: &'static str, outcome: &'static str) {
    metrics::counter!("auth_events_total", "event" => event, "outcome" => outcome).increment(1);
}

pub struct DefaultAuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    lifetimes: TokenLifetimes,
    notifier: Notifier,
}

impl DefaultAuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
        lifetimes: TokenLifetimes,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            lifetimes,
            notifier,
        }
    }

    /// Fails with `Conflict` if another record already holds `username` or
    /// `email`. `owner` is excluded so a user can keep their own values.
    async fn ensure_available(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        owner: Option<&UserKey>,
    ) -> Result<(), AuthError> {
        let held_by_other = |found: Option<User>| found.is_some_and(|u| Some(&u.key) != owner);

        if let Some(username) = username
            && held_by_other(self.store.get_by_username(username).await?)
        {
            return Err(AuthError::Conflict("Username already registered".to_string()));
        }

        if let Some(email) = email
            && held_by_other(self.store.get_by_email(email).await?)
        {
            return Err(AuthError::Conflict("Email already registered".to_string()));
        }

        Ok(())
    }

    /// Validates, checks uniqueness, hashes and inserts a brand new record.
    async fn create_user(
        &self,
        new_user: NewUser,
        is_active: bool,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let username = validate_username(new_user.username.trim())
            .map_err(AuthError::Validation)?
            .to_string();
        let email = normalize_email(&new_user.email).map_err(AuthError::Validation)?;
        validate_password(&new_user.password).map_err(AuthError::Validation)?;

        self.ensure_available(Some(&username), Some(&email), None)
            .await?;

        let hashed_password = self.hasher.hash_blocking(new_user.password).await?;
        let now = Utc::now().to_rfc3339();

        let user = User {
            key: UserKey::generate(),
            username,
            email,
            hashed_password,
            is_active,
            is_admin,
            created_at: now.clone(),
            updated_at: now,
        };

        // Uniqueness was checked above, but two concurrent registrations can
        // both pass it. The unique indexes catch the loser.
        if let Err(e) = self.store.insert(&user).await {
            warn!(username = %user.username, error = %e, "Insert failed after availability check");
            self.ensure_available(Some(&user.username), Some(&user.email), None)
                .await?;
            return Err(e.into());
        }

        Ok(user)
    }

    fn issue_access(&self, user: &User) -> Result<TokenResponse, AuthError> {
        let token = self
            .tokens
            .issue(&user.key, TokenPurpose::Access, self.lifetimes.access)?;
        Ok(TokenResponse::bearer(token))
    }

    async fn load(&self, key: &UserKey) -> Result<User, AuthError> {
        self.store.get(key).await?.ok_or(AuthError::UserNotFound)
    }

    async fn save(&self, user: &mut User) -> Result<(), AuthError> {
        user.updated_at = Utc::now().to_rfc3339();
        if self.store.replace(user).await? {
            Ok(())
        } else {
            Err(AuthError::UserNotFound)
        }
    }
}

#[async_trait]
impl AuthService for DefaultAuthService {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        // Usernames are stored trimmed.
        let Some(user) = self.store.get_by_username(username.trim()).await? else {
            // Keep the unknown-user path as slow as a wrong password.
            self.hasher.verify_dummy(password.to_string()).await?;
            return Ok(None);
        };

        let valid = self
            .hasher
            .verify_blocking(password.to_string(), user.hashed_password.clone())
            .await?;

        Ok(valid.then_some(user))
    }

    async fn resolve_current_user(&self, token: &str) -> Result<User, AuthError> {
        let key = self
            .tokens
            .validate(token, TokenPurpose::Access)
            .ok_or(AuthError::InvalidToken)?;

        self.load(&key).await
    }

    async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        let user = match self.create_user(new_user, false, false).await {
            Ok(user) => user,
            Err(e) => {
                record_event("register", "rejected");
                return Err(e);
            }
        };

        let token = self.tokens.issue(
            &user.key,
            TokenPurpose::Verification,
            Some(self.lifetimes.verification),
        )?;
        self.notifier.send_verification(&user.email, &token);

        record_event("register", "ok");
        info!(user_key = %user.key, username = %user.username, "User registered");
        Ok(user)
    }

    async fn verify_email(&self, token: &str) -> Result<(), AuthError> {
        let Some(key) = self.tokens.validate(token, TokenPurpose::Verification) else {
            record_event("verify", "invalid_token");
            return Err(AuthError::InvalidToken);
        };

        let mut user = self.load(&key).await?;
        if user.is_active {
            debug!(user_key = %user.key, "User already verified");
            return Ok(());
        }

        user.is_active = true;
        self.save(&mut user).await?;

        record_event("verify", "ok");
        info!(user_key = %user.key, "User verified");
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let Some(user) = self.authenticate(username, password).await? else {
            record_event("login", "invalid_credentials");
            return Err(AuthError::InvalidCredentials);
        };

        let user = match access::require_active(user) {
            Ok(user) => user,
            Err(e) => {
                record_event("login", "inactive");
                return Err(e);
            }
        };

        record_event("login", "ok");
        debug!(user_key = %user.key, "Login succeeded");
        self.issue_access(&user)
    }

    async fn refresh(&self, user: &User) -> Result<TokenResponse, AuthError> {
        record_event("refresh", "ok");
        self.issue_access(user)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        // A malformed address cannot be registered, so treat it as unknown.
        let Ok(email) = normalize_email(email) else {
            record_event("reset_request", "unknown");
            return Ok(());
        };

        match self.store.get_by_email(&email).await? {
            Some(user) => {
                let token = self.tokens.issue(
                    &user.key,
                    TokenPurpose::PasswordReset,
                    Some(self.lifetimes.password_reset),
                )?;
                self.notifier.send_password_reset(&user.email, &token);
                record_event("reset_request", "sent");
                info!(user_key = %user.key, "Password reset requested");
            }
            None => {
                record_event("reset_request", "unknown");
                debug!("Password reset requested for unknown email");
            }
        }

        Ok(())
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let Some(key) = self.tokens.validate(token, TokenPurpose::PasswordReset) else {
            record_event("reset_confirm", "invalid_token");
            return Err(AuthError::InvalidToken);
        };

        let mut user = self.load(&key).await?;
        validate_password(new_password).map_err(AuthError::Validation)?;

        user.hashed_password = self.hasher.hash_blocking(new_password.to_string()).await?;
        self.save(&mut user).await?;

        record_event("reset_confirm", "ok");
        info!(user_key = %user.key, "Password reset");
        Ok(())
    }

    async fn update_profile(&self, user: &User, update: ProfileUpdate) -> Result<User, AuthError> {
        let mut current = self.load(&user.key).await?;
        if update.is_empty() {
            return Ok(current);
        }

        let username = update
            .username
            .as_deref()
            .map(|u| validate_username(u.trim()).map(str::to_string))
            .transpose()
            .map_err(AuthError::Validation)?
            .filter(|u| *u != current.username);

        let email = update
            .email
            .as_deref()
            .map(normalize_email)
            .transpose()
            .map_err(AuthError::Validation)?
            .filter(|e| *e != current.email);

        if let Some(password) = &update.password {
            validate_password(password).map_err(AuthError::Validation)?;
        }

        self.ensure_available(username.as_deref(), email.as_deref(), Some(&current.key))
            .await?;

        if let Some(username) = username {
            current.username = username;
        }
        if let Some(email) = email {
            current.email = email;
        }
        if let Some(password) = update.password {
            current.hashed_password = self.hasher.hash_blocking(password).await?;
        }

        self.save(&mut current).await?;

        info!(user_key = %current.key, "Profile updated");
        Ok(current)
    }

    async fn delete_account(&self, user: &User) -> Result<User, AuthError> {
        let deleted = self
            .store
            .delete(&user.key)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        record_event("delete", "ok");
        info!(user_key = %deleted.key, "User deleted");
        Ok(deleted)
    }

    async fn list_users(&self, actor: &User) -> Result<Vec<User>, AuthError> {
        access::require_admin(actor.clone())?;
        Ok(self.store.list().await?)
    }

    async fn set_admin(
        &self,
        actor: &User,
        target: &UserKey,
        is_admin: bool,
    ) -> Result<User, AuthError> {
        let actor = access::require_admin(actor.clone())?;

        if !is_admin && actor.key == *target {
            return Err(AuthError::Validation(
                "Admins cannot demote themselves".to_string(),
            ));
        }

        let mut user = self.load(target).await?;
        if user.is_admin != is_admin {
            user.is_admin = is_admin;
            self.save(&mut user).await?;
        }

        record_event(if is_admin { "promote" } else { "demote" }, "ok");
        info!(actor = %actor.key, target = %user.key, is_admin, "Admin flag changed");
        Ok(user)
    }

    async fn create_admin(&self, new_user: NewUser) -> Result<User, AuthError> {
        let user = self.create_user(new_user, true, true).await?;

        record_event("create_admin", "ok");
        info!(user_key = %user.key, username = %user.username, "Admin created");
        Ok(user)
    }
}
