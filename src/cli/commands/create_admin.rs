//! Create admin command handler

use crate::config::Config;
use crate::models::NewUser;
use crate::services::AuthError;
use crate::state::SharedState;

pub async fn cmd_create_admin(
    config: Config,
    username: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let new_user = NewUser {
        username,
        email,
        password,
    };

    match state.auth_service.create_admin(new_user).await {
        Ok(user) => {
            println!("✓ Admin created: {} <{}>", user.username, user.email);
            println!("  key: {}", user.key);
            Ok(())
        }
        Err(AuthError::Conflict(msg) | AuthError::Validation(msg)) => {
            anyhow::bail!("Could not create admin: {msg}")
        }
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
