use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use movie_user_api::application::mail_service::{LogMailTransport, WelcomeMailService};
use movie_user_api::application::user_service::DefaultUserService;
use movie_user_api::data::user_repository::InMemoryUserRepository;
use movie_user_api::infrastructure::config::AppConfig;
use movie_user_api::infrastructure::logging::init_logging;
use movie_user_api::presentation::handlers::AppState;
use movie_user_api::presentation::middleware::{
    JwtAuthMiddleware, RequestIdMiddleware, TimingMiddleware,
};
use movie_user_api::presentation::routes::{configure, describe};
use std::sync::Arc;
use tracing::info;

fn cors(allowed_origin: Option<&str>) -> Cors {
    match allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header(),
        None => Cors::permissive(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_filter);
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let repository = Arc::new(InMemoryUserRepository::new());
    let user_service = DefaultUserService::new(
        repository,
        config.jwt_secret.clone(),
        config.token_ttl_secs,
    );
    if let Some(seed) = &config.admin {
        user_service.seed_admin(seed).await?;
    }

    let state = web::Data::new(AppState {
        user_service: Arc::new(user_service),
        mail_service: Arc::new(WelcomeMailService::new(Arc::new(LogMailTransport))),
    });

    let jwt_secret = config.jwt_secret.clone();
    let cors_origin = config.cors_allowed_origin.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(JwtAuthMiddleware::new(jwt_secret.clone()))
            .wrap(cors(cors_origin.as_deref()))
            .wrap(TimingMiddleware)
            .wrap(RequestIdMiddleware)
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?;

    info!(
        address = %format!("{}:{}", config.host, config.port),
        routes = %describe(),
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
