use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{NewUser, ProfileUpdate, Role, User};

/// Repository trait for User persistence
///
/// Store failures surface as [`UserError::StoreUnavailable`]; nothing is
/// retried here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get a user by identity-provider id
    async fn get_by_provider_id(&self, supabase_id: &str) -> UserResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Users with `role`, in insertion order
    async fn get_by_role(&self, role: Role) -> UserResult<Vec<User>>;

    /// Insert a user; a uniqueness violation is `AlreadyExists`
    async fn add_user(&self, new_user: NewUser) -> UserResult<User>;

    /// Write the supplied fields and return the updated user
    async fn update_by_provider_id(
        &self,
        supabase_id: &str,
        update: ProfileUpdate,
    ) -> UserResult<User>;

    /// Set the role of the user with `email` and return the updated user
    async fn update_role(&self, email: &str, role: Role) -> UserResult<User>;

    /// Ensure the unique indexes on `email` and `supabase_id`
    async fn create_indexes(&self) -> UserResult<()>;
}

/// In-memory implementation of UserRepository (for development/testing)
///
/// Enforces the same uniqueness rules as the MongoDB indexes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<Vec<User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_provider_id(&self, supabase_id: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.supabase_id == supabase_id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_role(&self, role: Role) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn add_user(&self, new_user: NewUser) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.email == new_user.email || u.supabase_id == new_user.supabase_id)
        {
            return Err(UserError::AlreadyExists(format!(
                "duplicate key for email {}",
                new_user.email
            )));
        }

        let mut user = new_user.into_user(Utc::now());
        user.id = Some(ObjectId::new());
        users.push(user.clone());

        tracing::info!(supabase_id = %user.supabase_id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn update_by_provider_id(
        &self,
        supabase_id: &str,
        update: ProfileUpdate,
    ) -> UserResult<User> {
        if update.is_empty() {
            return Err(UserError::EmptyUpdate("No data provided for update".into()));
        }

        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.supabase_id == supabase_id)
            .ok_or_else(|| UserError::NotFound(format!("User {supabase_id} not found")))?;

        user.apply_update(update, Utc::now());
        Ok(user.clone())
    }

    async fn update_role(&self, email: &str, role: Role) -> UserResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.email == email)
            .ok_or_else(|| UserError::NotFound(format!("User {email} not found")))?;

        user.role = role;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn create_indexes(&self) -> UserResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(supabase_id: &str, email: &str) -> NewUser {
        NewUser {
            supabase_id: supabase_id.into(),
            email: email.into(),
            name: "Ana".into(),
            phone: None,
            birthday: None,
            avatar_url: None,
            is_active: true,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_add_and_get_user() {
        let repo = InMemoryUserRepository::new();
        let created = repo.add_user(new_user("sb-1", "ana@example.com")).await.unwrap();
        assert!(created.id.is_some());

        let by_email = repo.get_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(by_email, created);

        let by_provider = repo.get_by_provider_id("sb-1").await.unwrap().unwrap();
        assert_eq!(by_provider, created);

        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_or_provider_id_is_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.add_user(new_user("sb-1", "ana@example.com")).await.unwrap();

        let err = repo
            .add_user(new_user("sb-2", "ana@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists(_)));

        let err = repo
            .add_user(new_user("sb-1", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists(_)));

        assert_eq!(repo.get_by_role(Role::User).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_by_provider_id() {
        let repo = InMemoryUserRepository::new();
        let created = repo.add_user(new_user("sb-1", "ana@example.com")).await.unwrap();

        let updated = repo
            .update_by_provider_id(
                "sb-1",
                ProfileUpdate {
                    phone: Some("555".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone.as_deref(), Some("555"));
        assert_eq!(updated.name, created.name);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_unknown_provider_id_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let err = repo
            .update_by_provider_id(
                "missing",
                ProfileUpdate {
                    name: Some("Bo".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let repo = InMemoryUserRepository::new();
        let err = repo
            .update_by_provider_id("missing", ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmptyUpdate(_)));
    }

    #[tokio::test]
    async fn test_get_by_role_tracks_role_changes_in_insertion_order() {
        let repo = InMemoryUserRepository::new();
        repo.add_user(new_user("sb-1", "a@example.com")).await.unwrap();
        repo.add_user(new_user("sb-2", "b@example.com")).await.unwrap();
        repo.add_user(new_user("sb-3", "c@example.com")).await.unwrap();

        repo.update_role("c@example.com", Role::Supervisor).await.unwrap();
        repo.update_role("a@example.com", Role::Supervisor).await.unwrap();

        let emails: Vec<_> = repo
            .get_by_role(Role::Supervisor)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.email)
            .collect();
        assert_eq!(emails, vec!["a@example.com", "c@example.com"]);

        repo.update_role("a@example.com", Role::User).await.unwrap();
        assert_eq!(repo.get_by_role(Role::Supervisor).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_role_unknown_email_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let err = repo
            .update_role("nobody@example.com", Role::Supervisor)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }
}
