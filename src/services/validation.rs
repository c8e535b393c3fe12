//! Field rules for credentials and profile data.
//!
//! These live below the HTTP layer so the `create-admin` command gets the same
//! checks as `/auth/register`.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::limits::{
    EMAIL_MAX_LEN, PASSWORD_MAX_LEN, USERNAME_MAX_LEN, USERNAME_MIN_LEN,
};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"));

pub fn validate_username(username: &str) -> Result<&str, String> {
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(format!(
            "Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(
            "Username can only contain letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        );
    }

    Ok(username)
}

/// Returns the address trimmed and lower-cased, which is the form stored and
/// looked up.
pub fn normalize_email(email: &str) -> Result<String, String> {
    let email = email.trim().to_lowercase();

    if email.len() > EMAIL_MAX_LEN {
        return Err(format!("Email must be {EMAIL_MAX_LEN} characters or less"));
    }

    if !EMAIL_RE.is_match(&email) {
        return Err("Invalid email address".to_string());
    }

    Ok(email)
}

pub fn validate_password(password: &str) -> Result<&str, String> {
    if password.is_empty() {
        return Err("Password cannot be empty".to_string());
    }

    if password.chars().count() > PASSWORD_MAX_LEN {
        return Err(format!(
            "Password must be {PASSWORD_MAX_LEN} characters or less"
        ));
    }

    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob.smith-2_x").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com ").unwrap(), "a@x.com");
        assert!(normalize_email("a@x").is_err());
        assert!(normalize_email("no-at-sign.com").is_err());
        assert!(normalize_email("two@@x.com").is_err());
        let long = format!("{}@x.com", "a".repeat(250));
        assert!(normalize_email(&long).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("pw").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(129)).is_err());
    }
}
