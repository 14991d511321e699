use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

use crate::identity::ProviderSession;

/// Display name given to profiles created without one
pub const DEFAULT_NAME: &str = "User";

/// User role
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Supervisor,
}

/// User profile as stored in the `users` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Store-generated key, absent until inserted
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Identity provider user id
    pub supabase_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    /// Free-form, stored as given
    pub birthday: Option<String>,
    pub avatar_url: Option<String>,
    /// Stored as a BSON date
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub role: Role,
}

impl User {
    /// Apply the supplied fields of `update` and refresh `updated_at`
    pub fn apply_update(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(phone) = update.phone {
            self.phone = Some(phone);
        }
        if let Some(birthday) = update.birthday {
            self.birthday = Some(birthday);
        }
        if let Some(avatar_url) = update.avatar_url {
            self.avatar_url = Some(avatar_url);
        }
        self.updated_at = now;
    }
}

/// Input for [`UserRepository::add_user`](crate::repository::UserRepository::add_user)
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub supabase_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub role: Role,
}

impl NewUser {
    /// Build the stored record with both timestamps set to `now`
    pub fn into_user(self, now: DateTime<Utc>) -> User {
        User {
            id: None,
            supabase_id: self.supabase_id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            birthday: self.birthday,
            avatar_url: self.avatar_url,
            created_at: now,
            updated_at: now,
            is_active: self.is_active,
            role: self.role,
        }
    }
}

/// Partial profile update; only supplied fields are written
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.birthday.is_none()
            && self.avatar_url.is_none()
    }

    /// `(field, value)` pairs for the supplied fields
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("phone", &self.phone),
            ("birthday", &self.birthday),
            ("avatar_url", &self.avatar_url),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub phone: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct OAuthLoginRequest {
    /// Provider name known to Supabase, e.g. `google` or `github`
    #[validate(length(min = 1, message = "must not be empty"))]
    pub provider: String,
}

/// Profile creation for users who signed in through OAuth
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub supabase_id: String,
    #[validate(email(message = "value is not a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, message = "must be at least 2 characters"))]
    pub name: String,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub avatar_url: Option<String>,
}

/// Access token handed back to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl From<&ProviderSession> for Token {
    fn from(session: &ProviderSession) -> Self {
        Self {
            access_token: session.access_token.clone(),
            token_type: session
                .token_type
                .clone()
                .unwrap_or_else(default_token_type),
            refresh_token: session.refresh_token.clone(),
            expires_in: session.expires_in,
        }
    }
}

/// JSON view of a [`User`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Hex ObjectId
    pub id: Option<String>,
    pub supabase_id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub birthday: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()),
            supabase_id: user.supabase_id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            birthday: user.birthday,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_active: user.is_active,
            role: user.role,
        }
    }
}

/// Body of register and login responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResultResponse {
    /// Absent when the provider returned no session, e.g. pending email confirmation
    pub token: Option<Token>,
    /// Stored profile, absent when the account has none yet
    pub user: Option<UserResponse>,
}

/// Outcome of a role change
#[derive(Debug, Clone, PartialEq)]
pub enum RoleChange {
    Changed(User),
    /// The user already had the requested role
    Unchanged(User),
}
