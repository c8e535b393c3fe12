//! Role gates applied after a user has been resolved from a token.

use crate::models::User;
use crate::services::auth_service::AuthError;

pub fn require_active(user: User) -> Result<User, AuthError> {
    if user.is_active {
        Ok(user)
    } else {
        Err(AuthError::Forbidden("Inactive user".to_string()))
    }
}

/// Admin rights only count for active accounts.
pub fn require_admin(user: User) -> Result<User, AuthError> {
    let user = require_active(user)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(AuthError::Forbidden(
            "The user doesn't have enough privileges".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserKey;

    fn user(is_active: bool, is_admin: bool) -> User {
        User {
            key: UserKey::from("user_1"),
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            hashed_password: String::new(),
            is_active,
            is_admin,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn active_gate() {
        assert!(require_active(user(true, false)).is_ok());
        assert!(matches!(
            require_active(user(false, false)),
            Err(AuthError::Forbidden(_))
        ));
    }

    #[test]
    fn admin_gate_implies_active() {
        assert!(require_admin(user(true, true)).is_ok());
        assert!(matches!(
            require_admin(user(true, false)),
            Err(AuthError::Forbidden(_))
        ));
        assert!(matches!(
            require_admin(user(false, true)),
            Err(AuthError::Forbidden(_))
        ));
    }
}
