//! OpenAPI document for the user routes, served by Swagger UI.
//!
//! `User` keeps its password hash out of responses with serde, so its schema
//! is described here by [`UserSchema`] instead of a derive on the domain type.

use crate::domain::favorite::{Favorite, FavoriteMovie};
use crate::domain::user::{Credentials, NewUser, Role, Session, UserId, UserUpdate};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

pub const DOCS_PATH: &str = "/documentation";
pub const OPENAPI_PATH: &str = "/swagger.json";

/// Registers the bearer JWT scheme referenced by the scoped routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /user/login."))
                    .build(),
            ),
        );
    }
}

/// A user as returned by the API. The password hash is never included.
#[derive(ToSchema)]
#[schema(as = User, rename_all = "camelCase")]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation")]
pub struct UserSchema {
    /// Unique id of the user
    #[schema(example = 1)]
    id: i64,
    /// Firstname of the user
    #[schema(example = "John")]
    first_name: String,
    /// Lastname of the user
    #[schema(example = "Doe")]
    last_name: String,
    /// Username of the user
    #[schema(example = "Johny")]
    user_name: String,
    /// Email of the user
    #[schema(example = "tartampion@gmail.com")]
    mail: Option<String>,
    role: Role,
    #[schema(example = "2024-01-01T12:00:00Z")]
    created_at: String,
    #[schema(example = "2024-01-01T12:00:00Z")]
    updated_at: String,
}

/// Error body shared by every rejected request.
#[derive(ToSchema)]
#[schema(as = Error)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation")]
pub struct ErrorSchema {
    #[schema(example = "Validation error: \"password\" length must be at least 8 characters long")]
    error: String,
    /// `{"message": ...}` with the bare reason.
    details: serde_json::Value,
}

#[derive(ToSchema)]
#[schema(as = Health)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation")]
pub struct HealthSchema {
    #[schema(example = "ok")]
    status: String,
    #[schema(example = "2024-01-01T12:00:00+00:00")]
    timestamp: String,
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Movie user API",
        description = "User accounts, role scopes and favorite movies."
    ),
    paths(
        crate::presentation::handlers::health_check,
        crate::presentation::handlers::login,
        crate::presentation::handlers::list_users,
        crate::presentation::handlers::create_user,
        crate::presentation::handlers::update_user,
        crate::presentation::handlers::delete_user,
        crate::presentation::handlers::list_favorites,
        crate::presentation::handlers::add_favorite,
        crate::presentation::handlers::remove_favorite,
    ),
    components(schemas(
        UserSchema,
        ErrorSchema,
        HealthSchema,
        Role,
        Credentials,
        Session,
        NewUser,
        UserUpdate,
        UserId,
        Favorite,
        FavoriteMovie,
    )),
    tags(
        (name = "api", description = "User accounts and favorite movies"),
        (name = "health", description = "Liveness check")
    )
)]
pub struct ApiDoc;
