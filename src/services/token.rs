//! Signed bearer tokens.
//!
//! Every token carries the user key as `sub`, an optional `exp` and a
//! `purpose`. A token minted for one purpose never validates for another, so a
//! verification link cannot be replayed as an access token.
//!
//! Expiry is checked against an injected [`Clock`] rather than by
//! `jsonwebtoken`, which keeps the check testable and lets `exp` be absent.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use crate::config::AuthConfig;
use crate::domain::UserKey;

pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Access,
    Verification,
    PasswordReset,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    purpose: TokenPurpose,
}

/// Lifetimes for each token purpose. `access == None` means access tokens
/// never expire.
#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Option<Duration>,
    pub verification: Duration,
    pub password_reset: Duration,
}

impl TokenLifetimes {
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        let minutes = |m: u64| {
            i64::try_from(m)
                .ok()
                .and_then(Duration::try_minutes)
                .unwrap_or(Duration::MAX)
        };
        Self {
            access: (config.access_token_expire_minutes > 0)
                .then(|| minutes(config.access_token_expire_minutes)),
            verification: minutes(config.verification_token_expire_minutes),
            password_reset: minutes(config.reset_token_expire_minutes),
        }
    }
}

pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Only the HMAC family is accepted, since the key is a shared secret.
    pub fn new(secret: &str, algorithm: &str, clock: Arc<dyn Clock>) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .with_context(|| format!("Unknown signing algorithm '{algorithm}'"))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!("Signing algorithm {algorithm:?} is not supported");
        }

        if secret.is_empty() {
            anyhow::bail!("Signing secret must not be empty");
        }

        Ok(Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            clock,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        Self::new(&config.secret_key, &config.algorithm, Arc::new(SystemClock))
    }

    /// Signs a token for `subject`. With `ttl == None` the token has no `exp`.
    pub fn issue(
        &self,
        subject: &UserKey,
        purpose: TokenPurpose,
        ttl: Option<Duration>,
    ) -> Result<String> {
        let claims = Claims {
            sub: subject.as_str().to_string(),
            exp: ttl
                .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
                .map(|at| at.timestamp()),
            purpose,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .context("Failed to sign token")
    }

    /// Returns the subject if the token is well formed, correctly signed,
    /// unexpired and minted for `purpose`. Every failure collapses to `None`.
    #[must_use]
    pub fn validate(&self, token: &str, purpose: TokenPurpose) -> Option<UserKey> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub"]);

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "Rejected token");
                return None;
            }
        };

        if claims.purpose != purpose {
            debug!(expected = ?purpose, got = ?claims.purpose, "Token purpose mismatch");
            return None;
        }

        if let Some(exp) = claims.exp
            && self.clock.now().timestamp() >= exp
        {
            debug!("Token expired");
            return None;
        }

        if claims.sub.is_empty() {
            return None;
        }

        Some(UserKey::from(claims.sub))
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
