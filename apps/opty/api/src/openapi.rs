//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Opty API",
        version = "0.1.0",
        description = "User accounts backed by Supabase auth with profiles stored in MongoDB",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api", api = domain_users::ApiDoc)
    ),
    tags(
        (name = "Auth", description = "Registration and sign-in"),
        (name = "Profile", description = "User profile management")
    )
)]
pub struct ApiDoc;
