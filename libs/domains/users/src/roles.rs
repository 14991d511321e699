//! Role Service - supervisor management over the repository alone

use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{Role, RoleChange, User};
use crate::repository::UserRepository;

pub struct RoleService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for RoleService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> RoleService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub async fn promote(&self, email: &str) -> UserResult<RoleChange> {
        self.change_role(email, Role::Supervisor).await
    }

    pub async fn demote(&self, email: &str) -> UserResult<RoleChange> {
        self.change_role(email, Role::User).await
    }

    /// Supervisors in insertion order
    #[instrument(skip(self))]
    pub async fn list_supervisors(&self) -> UserResult<Vec<User>> {
        self.repository.get_by_role(Role::Supervisor).await
    }

    #[instrument(skip(self))]
    async fn change_role(&self, email: &str, role: Role) -> UserResult<RoleChange> {
        let user = self
            .repository
            .get_by_email(email)
            .await?
            .ok_or_else(|| UserError::NotFound(format!("User {email} not found")))?;

        if user.role == role {
            return Ok(RoleChange::Unchanged(user));
        }

        let updated = self.repository.update_role(email, role).await?;
        tracing::info!(email, %role, "Role changed");
        Ok(RoleChange::Changed(updated))
    }
}
