use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use omni_saude_server::config::{establish_connection, AppConfig};
use omni_saude_server::domain::file::storage::LocalDiskStorage;
use omni_saude_server::domain::health::init_start_time;
use omni_saude_server::global::rate_limit::spawn_purge_task;
use omni_saude_server::global::shutdown::shutdown_signal;
use omni_saude_server::utils::logging::init_logging;
use omni_saude_server::{app, AppState};
use tracing::info;

const RATE_LIMIT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment
    dotenvy::dotenv().ok();

    // 2. Logging (guard flushes the file writer on exit)
    let _log_guard = init_logging();
    init_start_time();

    // 3. Configuration
    let config = AppConfig::from_env()?;
    info!(
        app_env = ?config.app_env,
        upload_max_bytes = config.upload.max_bytes,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );

    // 4. Database
    let db = establish_connection(&config.database_url).await?;

    // 5. Storage and state
    let storage = LocalDiskStorage::new(
        config.upload.upload_dir.clone(),
        config.upload.public_base_url.clone(),
    )
    .await?;
    let port = config.server_port;
    let state = AppState::new(db, config, Arc::new(storage));
    let purge_task = spawn_purge_task(state.rate_limiter.clone(), RATE_LIMIT_PURGE_INTERVAL);

    // 6. Serve
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on {}", addr);
    info!("Swagger UI available at http://localhost:{}/swagger-ui", port);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    purge_task.abort();
    info!("Server shut down");

    Ok(())
}
