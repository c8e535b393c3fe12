use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};

use crate::domain::UserKey;
use crate::entities::{prelude::*, users};
use crate::models::User;

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            key: UserKey::from(model.key),
            username: model.username,
            email: model.email,
            hashed_password: model.hashed_password,
            is_active: model.is_active,
            is_admin: model.is_admin,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn to_active_model(user: &User) -> users::ActiveModel {
    users::ActiveModel {
        key: Set(user.key.as_str().to_string()),
        username: Set(user.username.clone()),
        email: Set(user.email.clone()),
        hashed_password: Set(user.hashed_password.clone()),
        is_active: Set(user.is_active),
        is_admin: Set(user.is_admin),
        created_at: Set(user.created_at.clone()),
        updated_at: Set(user.updated_at.clone()),
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, key: &UserKey) -> Result<Option<User>> {
        let user = Users::find_by_id(key.as_str())
            .one(&self.conn)
            .await
            .context("Failed to query user by key")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = Users::find()
            .order_by_asc(users::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn insert(&self, user: &User) -> Result<()> {
        Users::insert(to_active_model(user))
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to insert user {}", user.key))?;

        Ok(())
    }

    /// Overwrites every column of an existing record.
    /// Returns `false` when no record with that key exists.
    pub async fn replace(&self, user: &User) -> Result<bool> {
        match to_active_model(user).update(&self.conn).await {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotUpdated) => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to update user {}", user.key)),
        }
    }

    /// Removes the record and returns what was deleted.
    pub async fn delete(&self, key: &UserKey) -> Result<Option<User>> {
        let Some(existing) = self.get(key).await? else {
            return Ok(None);
        };

        Users::delete_by_id(key.as_str())
            .exec(&self.conn)
            .await
            .with_context(|| format!("Failed to delete user {key}"))?;

        Ok(Some(existing))
    }
}
