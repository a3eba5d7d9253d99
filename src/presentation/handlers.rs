use crate::application::mail_service::MailService;
use crate::application::user_service::UserService;
use crate::domain::favorite::{Favorite, FavoriteMovie};
use crate::domain::user::{Credentials, NewUser, Session, UserId, UserUpdate};
use crate::presentation::auth::{AdminOnly, Scoped, UserOrAdmin};
use crate::presentation::doc::{ErrorSchema, HealthSchema, UserSchema};
use crate::presentation::error::ApiError;
use crate::presentation::validation::Valid;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

pub const USER_EDITED: &str = "User edited";
pub const USER_DELETED: &str = "User is been deleted";

/// Collaborators shared by every handler.
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub mail_service: Arc<dyn MailService>,
}

fn text(message: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(message)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses((status = 200, description = "Service is alive", body = HealthSchema))
)]
#[instrument]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[utoipa::path(
    post,
    path = "/user/login",
    tags = ["api"],
    request_body = Credentials,
    responses(
        (status = 200, description = "Bearer token for the user", body = Session),
        (status = 400, description = "Payload failed validation", body = ErrorSchema),
        (status = 401, description = "Invalid mail or password", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(mail = ?payload.mail))]
pub async fn login(
    state: web::Data<AppState>,
    payload: Valid<Credentials>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");
    let session = state.user_service.login(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(session))
}

#[utoipa::path(
    get,
    path = "/users",
    tags = ["api"],
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Every user", body = [UserSchema]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 403, description = "Scope is not user or admin", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id()))]
pub async fn list_users(
    caller: Scoped<UserOrAdmin>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let users = state.user_service.get_all().await?;
    info!(count = users.len(), "Users listed");
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    post,
    path = "/user",
    tags = ["api"],
    request_body = NewUser,
    responses(
        (status = 201, description = "Created user", body = UserSchema),
        (status = 400, description = "Payload failed validation or mail in use", body = ErrorSchema)
    )
)]
/// Creates the account, then sends the welcome mail in the background.
///
/// The mail outcome never reaches the caller; failures are only logged.
#[instrument(skip_all, fields(user_name = %payload.user_name))]
pub async fn create_user(
    state: web::Data<AppState>,
    payload: Valid<NewUser>,
) -> Result<HttpResponse, ApiError> {
    let payload = payload.into_inner();
    let user = state.user_service.create(payload.clone()).await.map_err(|e| {
        error!(error = %e, "Failed to create user");
        e
    })?;

    let mail_service = Arc::clone(&state.mail_service);
    let user_id = user.id;
    tokio::spawn(async move {
        match mail_service.send_mail(payload).await {
            Ok(()) => info!(user_id = user_id, "Welcome mail sent"),
            Err(e) => warn!(user_id = user_id, error = %e, "Welcome mail failed"),
        }
    });

    info!(user_id = user.id, "User created");
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    patch,
    path = "/user/{id}",
    tags = ["api"],
    params(("id" = i64, Path, description = "Unique id of the user")),
    request_body = UserUpdate,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User edited", body = String, content_type = "text/plain"),
        (status = 400, description = "Payload failed validation or ids differ", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 403, description = "Scope is not admin", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id(), user_id = %*path))]
pub async fn update_user(
    caller: Scoped<AdminOnly>,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: Valid<UserUpdate>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if payload.id != id {
        return Err(ApiError::Validation(format!(
            "\"id\" {} does not match the path id {}",
            payload.id, id
        )));
    }

    state.user_service.update(payload.into_inner()).await?;
    info!("User edited");
    Ok(text(USER_EDITED))
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    tags = ["api"],
    params(("id" = i64, Path, description = "Unique id of the user")),
    request_body = UserId,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User is been deleted", body = String, content_type = "text/plain"),
        (status = 400, description = "Payload failed validation or ids differ", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 403, description = "Scope is not admin", body = ErrorSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id(), user_id = %*path))]
pub async fn delete_user(
    caller: Scoped<AdminOnly>,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: Valid<UserId>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    if payload.id != id {
        return Err(ApiError::Validation(format!(
            "\"id\" {} does not match the path id {}",
            payload.id, id
        )));
    }

    state.user_service.delete_user_by_id(id).await?;
    info!("User deleted");
    Ok(text(USER_DELETED))
}

#[utoipa::path(
    get,
    path = "/user/favorite",
    tags = ["api"],
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Favorite movies of the caller", body = [Favorite]),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 403, description = "Scope is not user or admin", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id()))]
pub async fn list_favorites(
    caller: Scoped<UserOrAdmin>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let favorites = state.user_service.get_all_favorites(caller.id()).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

#[utoipa::path(
    post,
    path = "/user/favorite",
    tags = ["api"],
    request_body = FavoriteMovie,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Added favorite", body = Favorite),
        (status = 400, description = "Payload failed validation or already a favorite", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "Caller account not found", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id(), id_movie = payload.id_movie))]
pub async fn add_favorite(
    caller: Scoped<UserOrAdmin>,
    state: web::Data<AppState>,
    payload: Valid<FavoriteMovie>,
) -> Result<HttpResponse, ApiError> {
    let favorite = state
        .user_service
        .add_favorite(caller.id(), payload.id_movie)
        .await?;
    info!("Favorite added");
    Ok(HttpResponse::Ok().json(favorite))
}

#[utoipa::path(
    delete,
    path = "/user/favorite",
    tags = ["api"],
    request_body = FavoriteMovie,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Removed favorite", body = Favorite),
        (status = 400, description = "Payload failed validation", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "Movie is not a favorite", body = ErrorSchema)
    )
)]
#[instrument(skip_all, fields(caller = caller.id(), id_movie = payload.id_movie))]
pub async fn remove_favorite(
    caller: Scoped<UserOrAdmin>,
    state: web::Data<AppState>,
    payload: Valid<FavoriteMovie>,
) -> Result<HttpResponse, ApiError> {
    let favorite = state
        .user_service
        .remove_favorite(caller.id(), payload.id_movie)
        .await?;
    info!("Favorite removed");
    Ok(HttpResponse::Ok().json(favorite))
}
