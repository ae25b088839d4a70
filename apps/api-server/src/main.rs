//! # Inkpress API Server
//!
//! actix-web front end for the blog content repository.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    let state = AppState::new(config.database.as_ref(), config.author_cache.clone()).await;

    tracing::info!(
        host = %config.host,
        port = config.port,
        storage = state.storage_kind(),
        author_cache_ttl = ?config.author_cache.ttl,
        "Starting Inkpress API server"
    );

    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .shutdown_timeout(config.shutdown_timeout);

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    server.bind((config.host.as_str(), config.port))?.run().await?;

    tracing::info!("Inkpress API server stopped");
    Ok(())
}
