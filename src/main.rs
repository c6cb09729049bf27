mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use config::{AppConfig, StorageBackend};
use database::{CalendarStore, MemoryStore, MongoDB};
use dotenv::dotenv;
use models::User;
use std::sync::Arc;
use utils::AppError;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

async fn build_store(config: &AppConfig) -> Result<Arc<dyn CalendarStore>, AppError> {
    match config.storage {
        StorageBackend::MongoDB => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| AppError::Config("DATABASE_URL must be set".to_string()))?;
            log::info!("📊 Database: {}", url);

            let db = MongoDB::new(url).await?;
            log::info!("✅ MongoDB connected successfully");
            Ok(Arc::new(db))
        }
        StorageBackend::Memory => {
            log::warn!("⚠️  Using in-memory storage, data is lost on restart");

            let store = MemoryStore::new();
            for id in &config.seed_user_ids {
                store
                    .insert_user(User {
                        id: *id,
                        email: format!("{}@local", id),
                        name: None,
                        starred_events: Vec::new(),
                    })
                    .await;
                log::info!("   👤 Seeded user {}", id);
            }
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    log::info!("🚀 Starting Calendar Service...");
    log::info!("🗓️  Reminder window mode: {:?}", config.window_mode);

    let store = build_store(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    let store_data: web::Data<dyn CalendarStore> = web::Data::from(store);
    let config_data = web::Data::new(config.clone());

    let (host, port) = (config.host.clone(), config.port);

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .expose_headers(vec![actix_web::http::header::CONTENT_TYPE])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();
        let jwt = config.jwt.clone();

        App::new()
            .app_data(store_data.clone())
            .app_data(config_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Calendar: reminders and events (JWT required)
            .configure(|cfg| api::calendar::configure(cfg, jwt))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
