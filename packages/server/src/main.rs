use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use common::storage::UploadStore;
use common::storage::filesystem::FilesystemUploadStore;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use server::config::{AppConfig, CorsConfig};
use server::database::{ensure_indexes, init_db};
use server::ingest::{DbIngestStore, IngestPool, Ingestor, run_stuck_file_sweeper};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to initialize database")?;
    ensure_indexes(&db)
        .await
        .context("Failed to create indexes")?;

    let uploads: Arc<dyn UploadStore> = Arc::new(
        FilesystemUploadStore::new(
            config.storage.upload_dir.clone(),
            config.storage.max_upload_size,
        )
        .await
        .context("Failed to prepare upload directory")?,
    );
    info!(upload_dir = %config.storage.upload_dir.display(), "Upload store ready");

    let ingestor = Ingestor::new(uploads.clone(), Arc::new(DbIngestStore::new(db.clone())))
        .with_extract_timeout(config.ingest.extract_timeout_secs.map(Duration::from_secs));
    let pool = IngestPool::start(ingestor, &config.ingest);

    if config.sweep.enabled {
        tokio::spawn(run_stuck_file_sweeper(
            db.clone(),
            config.sweep.clone(),
            pool.in_flight(),
        ));
    }

    let cors = cors_layer(&config.server.cors);
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        uploads,
        ingest: pool.queue(),
    };
    let app = server::build_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its queue handles are gone; let queued runs finish.
    pool.shutdown().await;

    Ok(())
}

fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cors
        .allow_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(cors.max_age))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
