use crate::presentation::handlers::{
    add_favorite, create_user, delete_user, health_check, list_favorites, list_users, login,
    remove_favorite, update_user,
};
use crate::presentation::doc::{ApiDoc, DOCS_PATH, OPENAPI_PATH};
use crate::presentation::error::ApiError;
use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    UserOrAdmin,
    AdminOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

const fn route(method: &'static str, path: &'static str, access: Access) -> RouteInfo {
    RouteInfo {
        method,
        path,
        access,
    }
}

/// Every endpoint registered by [`configure`], in registration order.
pub const ROUTES: &[RouteInfo] = &[
    route("GET", "/health", Access::Public),
    route("POST", "/user/login", Access::Public),
    route("GET", "/users", Access::UserOrAdmin),
    route("GET", "/user/favorite", Access::UserOrAdmin),
    route("POST", "/user/favorite", Access::UserOrAdmin),
    route("DELETE", "/user/favorite", Access::UserOrAdmin),
    route("POST", "/user", Access::Public),
    route("PATCH", "/user/{id}", Access::AdminOnly),
    route("DELETE", "/user/{id}", Access::AdminOnly),
    route("GET", DOCS_PATH, Access::Public),
    route("GET", OPENAPI_PATH, Access::Public),
];

/// Registers the user routes and the API documentation. Literal `/user/*`
/// paths go before `/user/{id}` so they are never captured as ids.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // non-integer ids get the same 400 JSON body as payload errors
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::Validation(err.to_string()).into()),
    );

    cfg.service(web::resource("/health").route(web::get().to(health_check)))
        .service(web::resource("/user/login").route(web::post().to(login)))
        .service(web::resource("/users").route(web::get().to(list_users)))
        .service(
            web::resource("/user/favorite")
                .route(web::get().to(list_favorites))
                .route(web::post().to(add_favorite))
                .route(web::delete().to(remove_favorite)),
        )
        .service(web::resource("/user").route(web::post().to(create_user)))
        .service(
            web::resource("/user/{id}")
                .route(web::patch().to(update_user))
                .route(web::delete().to(delete_user)),
        )
        .service(
            SwaggerUi::new(format!("{}/{{_:.*}}", DOCS_PATH)).url(OPENAPI_PATH, ApiDoc::openapi()),
        );
}

pub fn describe() -> String {
    ROUTES
        .iter()
        .map(|r| format!("{} {}", r.method, r.path))
        .collect::<Vec<_>>()
        .join(", ")
}
