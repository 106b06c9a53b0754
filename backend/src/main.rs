mod analysis;
mod cache;
mod config;
mod context;
mod inference;
mod routes;
mod upload;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use config::AppConfig;
use context::AppContext;
use routes::configure_routes;
use std::env;
use std::path::Path;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::load().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Configuration failed: {}", e))
    })?;

    let model = inference::load_model(Path::new(&config.model.path)).map_err(|e| {
        log::error!("Failed to load model at startup: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("Model loading failed: {}", e))
    })?;
    log::info!("Model ready on {}", model.device());

    let frontend_dir = config.frontend_dir();
    match &frontend_dir {
        Some(dir) => log::info!("Serving frontend from {}", dir),
        None => log::warn!("No frontend bundle found; only the API is served"),
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let context = AppContext::new(model, config);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(web::Data::new(context.clone()))
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
