mod config;
mod constants;
mod handlers;
mod state;
#[cfg(test)]
mod test_support;

use actix_web::{web, App, HttpServer};
use config::ServerConfig;
use state::AppState;
use storage::StorageBackend;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let dotenv = dotenvy::dotenv();

    // Initialize tracing with env filter
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,actix_server::worker=warn,actix_server::accept=warn")
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting file backup server (PID: {})",
        std::process::id()
    );
    if let Ok(path) = dotenv {
        info!("Loaded environment from {:?}", path);
    }

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    let storage = StorageBackend::Filesystem(config.backup_dir.clone())
        .initialize()
        .await
        .map_err(|e| {
            error!("Failed to initialize filesystem storage: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to initialize filesystem storage: {}", e),
            )
        })?;
    info!(
        backup_dir = ?config.backup_dir,
        max_file_size = config.max_file_size,
        max_file_count = config.max_file_count,
        field_name = %config.field_name,
        catalog_path = %config.catalog_path,
        "Storage backend initialized successfully"
    );

    let state = web::Data::new(AppState::new(storage, config.upload_limits()));
    let catalog_path = config.catalog_path.clone();
    let bind_address = config.bind_address();

    info!("Starting server on http://{}", bind_address);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(|cfg| handlers::configure(cfg, &catalog_path))
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    if let Some(workers) = config.workers {
        server = server.workers(workers);
    }

    info!("Server bound successfully to http://{}", bind_address);

    // Runs until the server receives a shutdown signal
    server.run().await
}
