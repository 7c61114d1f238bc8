use std::net::SocketAddr;
use std::sync::Arc;

use common::storage::{FilesystemObjectStore, ObjectStore, S3ObjectStore, S3Settings};
use tracing::{Level, info};

use server::config::{AppConfig, StorageBackend, StorageConfig};
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    let object_store = build_object_store(&config.storage).await?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        object_store,
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_object_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    match cfg.backend {
        StorageBackend::Filesystem => {
            let store =
                FilesystemObjectStore::new(cfg.root.clone(), cfg.bucket.clone()).await?;
            info!("Object storage: filesystem at {}", cfg.root.display());
            Ok(Arc::new(store))
        }
        StorageBackend::S3 => {
            let store = S3ObjectStore::new(&S3Settings {
                bucket: cfg.bucket.clone(),
                region: cfg.region.clone(),
                endpoint: cfg.endpoint.clone(),
                access_key: cfg.access_key.clone(),
                secret_key: cfg.secret_key.clone(),
            })?;
            info!("Object storage: s3 bucket '{}'", cfg.bucket);
            Ok(Arc::new(store))
        }
    }
}
