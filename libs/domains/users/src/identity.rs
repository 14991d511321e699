//! Identity provider seam and the Supabase (GoTrue) implementation.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_parse_or, env_required};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-2xx status
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<ProviderUser>,
}

/// Result of sign-up and password sign-in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: Option<ProviderUser>,
    pub session: Option<ProviderSession>,
}

/// Where to send the browser to start an OAuth sign-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OAuthResponse {
    pub provider: String,
    pub url: String,
}

/// Remote authentication API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, ProviderError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ProviderError>;

    async fn sign_in_with_oauth(&self, provider: &str) -> Result<OAuthResponse, ProviderError>;
}

/// Supabase project settings
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Anon or service key sent as `apikey`
    pub key: String,
    /// OAuth redirect target after the provider round trip
    pub redirect_to: Option<String>,
    pub timeout: Duration,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            redirect_to: None,
            timeout: Duration::from_secs(10),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url.trim_end_matches('/'), path)
    }
}

/// Environment variables:
/// - `SUPABASE_URL`, `SUPABASE_KEY` (required)
/// - `SUPABASE_REDIRECT_TO` (optional)
/// - `SUPABASE_TIMEOUT_SECS` (default 10)
impl FromEnv for SupabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: env_required("SUPABASE_URL")?,
            key: env_required("SUPABASE_KEY")?,
            redirect_to: std::env::var("SUPABASE_REDIRECT_TO")
                .ok()
                .filter(|v| !v.is_empty()),
            timeout: Duration::from_secs(env_parse_or("SUPABASE_TIMEOUT_SECS", 10)?),
        })
    }
}

/// GoTrue REST client
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: Client,
    config: SupabaseConfig,
}

impl SupabaseAuthClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    async fn post(&self, url: String, body: Value) -> Result<Value, ProviderError> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let payload: Value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                ProviderError::InvalidResponse(format!("status {status}, body not JSON: {e}"))
            })?
        };

        if !status.is_success() {
            return Err(api_error(status, &payload));
        }
        Ok(payload)
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuthClient {
    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResponse, ProviderError> {
        let payload = self
            .post(
                self.config.auth_url("signup"),
                json!({ "email": email, "password": password }),
            )
            .await?;
        parse_auth_response(payload)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ProviderError> {
        let payload = self
            .post(
                self.config.auth_url("token?grant_type=password"),
                json!({ "email": email, "password": password }),
            )
            .await?;
        parse_auth_response(payload)
    }

    #[instrument(skip(self))]
    async fn sign_in_with_oauth(&self, provider: &str) -> Result<OAuthResponse, ProviderError> {
        Ok(OAuthResponse {
            provider: provider.to_string(),
            url: oauth_authorize_url(&self.config, provider),
        })
    }
}

/// Authorize URL the browser is sent to; built locally without a request
pub fn oauth_authorize_url(config: &SupabaseConfig, provider: &str) -> String {
    let mut url = format!(
        "{}?provider={}",
        config.auth_url("authorize"),
        urlencoding::encode(provider)
    );
    if let Some(redirect_to) = &config.redirect_to {
        url.push_str("&redirect_to=");
        url.push_str(&urlencoding::encode(redirect_to));
    }
    url
}

/// Read sign-up and token responses.
///
/// GoTrue returns a session (`access_token` plus nested `user`) when the
/// account is usable right away, and the bare user object when email
/// confirmation is still pending.
pub fn parse_auth_response(payload: Value) -> Result<AuthResponse, ProviderError> {
    if payload.get("access_token").is_some() {
        let session: ProviderSession = serde_json::from_value(payload)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        return Ok(AuthResponse {
            user: session.user.clone(),
            session: Some(session),
        });
    }

    if payload.get("id").is_some() {
        let user: ProviderUser = serde_json::from_value(payload)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        return Ok(AuthResponse {
            user: Some(user),
            session: None,
        });
    }

    Ok(AuthResponse::default())
}

/// Build [`ProviderError::Api`] from an error body.
///
/// GoTrue uses `msg`, `error_description`, `message` or `error` depending on
/// the endpoint and version.
pub fn api_error(status: StatusCode, payload: &Value) -> ProviderError {
    let message = ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Authentication failed")
                .to_string()
        });

    ProviderError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SupabaseConfig {
        SupabaseConfig::new("https://abc.supabase.co/", "anon-key")
    }

    #[test]
    fn test_oauth_authorize_url() {
        assert_eq!(
            oauth_authorize_url(&config(), "google"),
            "https://abc.supabase.co/auth/v1/authorize?provider=google"
        );
    }

    #[test]
    fn test_oauth_authorize_url_with_redirect() {
        let config = SupabaseConfig {
            redirect_to: Some("http://localhost:3000/auth/callback".into()),
            ..config()
        };
        assert_eq!(
            oauth_authorize_url(&config, "github"),
            "https://abc.supabase.co/auth/v1/authorize?provider=github&redirect_to=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"
        );
    }

    #[test]
    fn test_parse_session_response() {
        let response = parse_auth_response(json!({
            "access_token": "at",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "rt",
            "user": { "id": "sb-1", "email": "ana@example.com" }
        }))
        .unwrap();

        assert_eq!(response.user.unwrap().id, "sb-1");
        assert_eq!(response.session.unwrap().expires_in, Some(3600));
    }

    #[test]
    fn test_parse_unconfirmed_signup_response() {
        let response = parse_auth_response(json!({
            "id": "sb-2",
            "email": "bo@example.com",
            "confirmation_sent_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(response.user.unwrap().id, "sb-2");
        assert!(response.session.is_none());
    }

    #[test]
    fn test_parse_empty_response_has_no_user() {
        let response = parse_auth_response(json!({})).unwrap();
        assert!(response.user.is_none());
        assert!(response.session.is_none());
    }

    #[test]
    fn test_api_error_message_fields() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            &json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
        );
        let ProviderError::Api { status, message } = err else {
            panic!("expected api error");
        };
        assert_eq!(status, 400);
        assert_eq!(message, "Invalid login credentials");

        let err = api_error(StatusCode::UNPROCESSABLE_ENTITY, &json!({ "msg": "User already registered" }));
        assert!(matches!(err, ProviderError::Api { status: 422, ref message } if message == "User already registered"));
    }

    #[test]
    fn test_api_error_falls_back_to_reason() {
        let err = api_error(StatusCode::TOO_MANY_REQUESTS, &Value::Null);
        assert!(matches!(err, ProviderError::Api { status: 429, ref message } if message == "Too Many Requests"));
    }

    #[test]
    fn test_supabase_config_from_env() {
        temp_env::with_vars(
            [
                ("SUPABASE_URL", Some("https://abc.supabase.co")),
                ("SUPABASE_KEY", Some("anon-key")),
                ("SUPABASE_REDIRECT_TO", None),
                ("SUPABASE_TIMEOUT_SECS", Some("3")),
            ],
            || {
                let config = SupabaseConfig::from_env().unwrap();
                assert_eq!(config.url, "https://abc.supabase.co");
                assert!(config.redirect_to.is_none());
                assert_eq!(config.timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn test_supabase_config_requires_key() {
        temp_env::with_vars(
            [
                ("SUPABASE_URL", Some("https://abc.supabase.co")),
                ("SUPABASE_KEY", None::<&str>),
            ],
            || {
                assert!(matches!(
                    SupabaseConfig::from_env(),
                    Err(ConfigError::MissingEnvVar(_))
                ));
            },
        );
    }
}
