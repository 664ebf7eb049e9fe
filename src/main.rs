mod api;
mod config;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, StoreBackend};
use crate::services::{
    DisabledGenerator, MemoryRecipeStore, MongoRecipeStore, OpenAiRecipeGenerator,
    RecipeGenerator, RecipeStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("❌ {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("🚀 Starting Recipe Service...");

    let store: Arc<dyn RecipeStore> = match config.store_backend {
        StoreBackend::MongoDB => {
            let uri = config.database_url.as_deref().unwrap_or_default();
            let db = database::MongoDB::new(uri).await.map_err(|e| {
                log::error!("❌ Failed to connect to MongoDB: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
            })?;
            log::info!("✅ MongoDB connected successfully");
            Arc::new(MongoRecipeStore::new(db))
        }
        StoreBackend::Memory => {
            log::warn!("⚠️  Using in-memory store: saved recipes are lost on restart");
            Arc::new(MemoryRecipeStore::new())
        }
    };

    let generator: Arc<dyn RecipeGenerator> = match config.openai.clone() {
        Some(openai) => {
            log::info!("🤖 Recipe generation enabled (model: {})", openai.model);
            Arc::new(OpenAiRecipeGenerator::new(openai))
        }
        None => {
            log::warn!("⚠️  OPENAI_API_KEY not set: /recipe/generate will answer 503");
            Arc::new(DisabledGenerator)
        }
    };

    let store_data = web::Data::from(store);
    let generator_data = web::Data::from(generator);
    let host = config.host.clone();
    let port = config.port;

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    HttpServer::new(move || {
        let cors = config
            .cors_allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
                actix_web::http::header::HeaderName::from_static("uid"),
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(generator_data.clone())
            .app_data(api::json_config(config.json_limit))
            .wrap(cors)
            .wrap(middleware::RequestMetrics)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
