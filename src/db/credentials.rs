//! The credential store seam used by the authentication services.
//!
//! The store is a plain keyed record store: it does not enforce username or
//! email uniqueness on behalf of callers, and concurrent writes to the same key
//! are last-write-wins.

use anyhow::Result;
use async_trait::async_trait;

use super::Store;
use crate::domain::UserKey;
use crate::models::User;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: &UserKey) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;

    async fn insert(&self, user: &User) -> Result<()>;

    /// Full-record replace. `Ok(false)` means the key no longer exists.
    async fn replace(&self, user: &User) -> Result<bool>;

    async fn delete(&self, key: &UserKey) -> Result<Option<User>>;
}

#[async_trait]
impl CredentialStore for Store {
    async fn get(&self, key: &UserKey) -> Result<Option<User>> {
        self.user_repo().get(key).await
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    async fn list(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    async fn insert(&self, user: &User) -> Result<()> {
        self.user_repo().insert(user).await
    }

    async fn replace(&self, user: &User) -> Result<bool> {
        self.user_repo().replace(user).await
    }

    async fn delete(&self, key: &UserKey) -> Result<Option<User>> {
        self.user_repo().delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(username: &str, email: &str) -> User {
        let now = chrono::Utc::now().to_rfc3339();
        User {
            key: UserKey::generate(),
            username: username.to_string(),
            email: email.to_string(),
            hashed_password: "hash".to_string(),
            is_active: false,
            is_admin: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    async fn memory_store() -> Store {
        Store::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn insert_then_lookup_by_every_field() {
        let store = memory_store().await;
        let user = sample_user("alice", "a@x.com");
        store.insert(&user).await.unwrap();

        assert_eq!(store.get(&user.key).await.unwrap(), Some(user.clone()));
        assert_eq!(
            store.get_by_username("alice").await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(store.get_by_email("a@x.com").await.unwrap(), Some(user));
        assert!(store.get_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_overwrites_and_reports_missing_keys() {
        let store = memory_store().await;
        let mut user = sample_user("alice", "a@x.com");
        store.insert(&user).await.unwrap();

        user.is_active = true;
        assert!(store.replace(&user).await.unwrap());
        assert!(store.get(&user.key).await.unwrap().unwrap().is_active);

        let ghost = sample_user("ghost", "g@x.com");
        assert!(!store.replace(&ghost).await.unwrap());
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let store = memory_store().await;
        let user = sample_user("alice", "a@x.com");
        store.insert(&user).await.unwrap();

        let deleted = store.delete(&user.key).await.unwrap();
        assert_eq!(deleted, Some(user.clone()));
        assert!(store.get(&user.key).await.unwrap().is_none());
        assert!(store.delete(&user.key).await.unwrap().is_none());
        assert!(store.list().await.unwrap().is_empty());
    }
}
