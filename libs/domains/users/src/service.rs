//! Profile Service - account use cases over the repository and identity provider

use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::identity::{AuthResponse, IdentityProvider, OAuthResponse, ProviderError};
use crate::models::{
    CreateProfileRequest, DEFAULT_NAME, NewUser, ProfileUpdate, RegisterRequest, Role, User,
};
use crate::repository::UserRepository;

/// Account use cases.
///
/// Each operation makes at most one identity-provider call. The unique
/// indexes stay authoritative for duplicates; the lookups here only give an
/// early, friendlier failure.
pub struct ProfileService<R: UserRepository, P: IdentityProvider> {
    repository: Arc<R>,
    provider: Arc<P>,
}

impl<R: UserRepository, P: IdentityProvider> Clone for ProfileService<R, P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            provider: Arc::clone(&self.provider),
        }
    }
}

impl<R: UserRepository, P: IdentityProvider> ProfileService<R, P> {
    pub fn new(repository: R, provider: P) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(provider))
    }

    pub fn from_shared(repository: Arc<R>, provider: Arc<P>) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Create the provider account, then the stored profile
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        if self.repository.get_by_email(&input.email).await?.is_some() {
            return Err(UserError::AlreadyExists(
                "User with this email already exists".into(),
            ));
        }

        let auth_response = self
            .provider
            .sign_up(&input.email, &input.password)
            .await
            .map_err(|e| UserError::ProviderError(format!("registration failed: {e}")))?;

        let Some(provider_user) = auth_response.user.as_ref() else {
            return Err(UserError::ProviderError("Failed to create user".into()));
        };

        self.repository
            .add_user(NewUser {
                supabase_id: provider_user.id.clone(),
                email: input.email,
                name: input.name,
                phone: input.phone,
                birthday: input.birthday,
                avatar_url: None,
                is_active: true,
                role: Role::User,
            })
            .await?;

        Ok(auth_response)
    }

    /// Password sign-in; provider rejections keep their status and message
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> UserResult<AuthResponse> {
        self.provider
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| match e {
                ProviderError::Api { status, message } => UserError::AuthApi { status, message },
                other => UserError::ProviderError(format!("Login failed: {other}")),
            })
    }

    #[instrument(skip(self))]
    pub async fn oauth_login(&self, provider_name: &str) -> UserResult<OAuthResponse> {
        self.provider
            .sign_in_with_oauth(provider_name)
            .await
            .map_err(|e| UserError::ProviderError(format!("OAuth login failed: {e}")))
    }

    /// Store the profile of a user who signed in through OAuth
    #[instrument(skip(self, input), fields(supabase_id = %input.supabase_id))]
    pub async fn create_profile(&self, input: CreateProfileRequest) -> UserResult<User> {
        if self
            .repository
            .get_by_provider_id(&input.supabase_id)
            .await?
            .is_some()
        {
            return Err(UserError::AlreadyExists("User profile already exists".into()));
        }

        if self.repository.get_by_email(&input.email).await?.is_some() {
            return Err(UserError::AlreadyExists(
                "User with this email already exists".into(),
            ));
        }

        let name = if input.name.trim().is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            input.name
        };

        self.repository
            .add_user(NewUser {
                supabase_id: input.supabase_id,
                email: input.email,
                name,
                phone: input.phone,
                birthday: input.birthday,
                avatar_url: input.avatar_url,
                is_active: true,
                role: Role::User,
            })
            .await
    }

    /// Write the supplied fields; an update with none is rejected up front
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, supabase_id: &str, update: ProfileUpdate) -> UserResult<User> {
        if update.is_empty() {
            return Err(UserError::EmptyUpdate("No data provided for update".into()));
        }

        self.repository.update_by_provider_id(supabase_id, update).await
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, supabase_id: &str) -> UserResult<Option<User>> {
        self.repository.get_by_provider_id(supabase_id).await
    }
}
