use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{patch, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse, ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::identity::{AuthResponse, IdentityProvider, OAuthResponse};
use crate::models::{
    AuthResultResponse, CreateProfileRequest, LoginRequest, OAuthLoginRequest, ProfileUpdate,
    RegisterRequest, Role, Token, UserResponse,
};
use crate::repository::UserRepository;
use crate::service::ProfileService;

/// OpenAPI documentation for the account API
#[derive(OpenApi)]
#[openapi(
    paths(register, login, oauth_login, create_profile, update_profile),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            OAuthLoginRequest,
            CreateProfileRequest,
            ProfileUpdate,
            AuthResultResponse,
            OAuthResponse,
            Token,
            UserResponse,
            Role
        ),
        responses(
            BadRequestResponse,
            ValidationErrorResponse,
            NotFoundResponse,
            ConflictResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration and sign-in through Supabase"),
        (name = "Profile", description = "User profiles stored in MongoDB")
    )
)]
pub struct ApiDoc;

/// Create the account router with all HTTP endpoints
pub fn router<R, P>(service: ProfileService<R, P>) -> Router
where
    R: UserRepository + 'static,
    P: IdentityProvider + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login/oauth", post(oauth_login))
        .route("/profile", post(create_profile))
        .route("/profile/{id}", patch(update_profile))
        .with_state(shared_service)
}

/// `{token, user}` for a provider response, with the stored profile attached
async fn auth_result<R: UserRepository, P: IdentityProvider>(
    service: &ProfileService<R, P>,
    auth: AuthResponse,
) -> UserResult<AuthResultResponse> {
    let user = match auth.user.as_ref() {
        Some(provider_user) => service.get_profile(&provider_user.id).await?,
        None => None,
    };

    Ok(AuthResultResponse {
        token: auth.session.as_ref().map(Token::from),
        user: user.map(UserResponse::from),
    })
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = AuthResultResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn register<R: UserRepository, P: IdentityProvider>(
    State(service): State<Arc<ProfileService<R, P>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<Json<AuthResultResponse>> {
    let auth = service.register(input).await?;
    Ok(Json(auth_result(&service, auth).await?))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResultResponse),
        (status = 400, description = "Rejected by the identity provider"),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository, P: IdentityProvider>(
    State(service): State<Arc<ProfileService<R, P>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResultResponse>> {
    let auth = service.login(&input.email, &input.password).await?;
    Ok(Json(auth_result(&service, auth).await?))
}

/// Start an OAuth sign-in
#[utoipa::path(
    post,
    path = "/login/oauth",
    tag = "Auth",
    request_body = OAuthLoginRequest,
    responses(
        (status = 200, description = "Redirect URL for the provider", body = OAuthResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn oauth_login<R: UserRepository, P: IdentityProvider>(
    State(service): State<Arc<ProfileService<R, P>>>,
    ValidatedJson(input): ValidatedJson<OAuthLoginRequest>,
) -> UserResult<Json<OAuthResponse>> {
    let response = service.oauth_login(&input.provider).await?;
    Ok(Json(response))
}

/// Create the profile of an OAuth user
#[utoipa::path(
    post,
    path = "/profile",
    tag = "Profile",
    request_body = CreateProfileRequest,
    responses(
        (status = 200, description = "Profile created", body = UserResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn create_profile<R: UserRepository, P: IdentityProvider>(
    State(service): State<Arc<ProfileService<R, P>>>,
    ValidatedJson(input): ValidatedJson<CreateProfileRequest>,
) -> UserResult<Json<UserResponse>> {
    let user = service.create_profile(input).await?;
    Ok(Json(user.into()))
}

/// Update the supplied profile fields
#[utoipa::path(
    patch,
    path = "/profile/{id}",
    tag = "Profile",
    params(
        ("id" = String, Path, description = "Identity-provider user id")
    ),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn update_profile<R: UserRepository, P: IdentityProvider>(
    State(service): State<Arc<ProfileService<R, P>>>,
    Path(id): Path<String>,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_profile(&id, update).await?;
    Ok(Json(user.into()))
}
