use std::{future::Future, net::SocketAddr, path::Path, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig, StorageConfig};
use service::{
    assets::{FsPhotoStore, PhotoStore},
    storage::JsonSnapshotFile,
    StudentRegistry,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn invalid_config(e: anyhow::Error) -> StartupError {
    StartupError::InvalidConfig(format!("{e:#}"))
}

/// Config file if present, otherwise defaults plus `SERVER_HOST`/`SERVER_PORT`.
/// A config file that exists but cannot be read or parsed is an error.
pub fn load_config() -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env().map_err(invalid_config)
}

pub fn load_config_from(path: &Path) -> Result<AppConfig, StartupError> {
    AppConfig::load_or_env_from(path).map_err(invalid_config)
}

fn bind_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", server.host, server.port).parse()?)
}

/// Prepare directories and load the registry from disk.
pub async fn build_state(storage: &StorageConfig) -> Result<AppState, StartupError> {
    let data_dir = storage.data_file.parent().unwrap_or(Path::new(""));
    common::env::ensure_env(&storage.static_dir, &[storage.uploads_dir.as_path(), data_dir]).await?;

    let photos: Arc<dyn PhotoStore> =
        Arc::new(FsPhotoStore::new(&storage.uploads_dir, storage.photo_extension.clone()));
    let registry =
        StudentRegistry::open(JsonSnapshotFile::new(&storage.data_file), photos, storage.id_policy).await;
    Ok(AppState { registry, max_upload_bytes: storage.max_upload_bytes })
}

pub fn build_app(state: AppState, storage: &StorageConfig) -> Router {
    routes::build_router(state, storage, build_cors())
}

/// Serve `cfg` until `shutdown` resolves, then flush the registry once more.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&cfg.storage).await?;
    let registry = Arc::clone(&state.registry);
    let app = build_app(state, &cfg.storage);

    let addr = bind_addr(&cfg.server)?;
    info!(
        %addr,
        data_file = %cfg.storage.data_file.display(),
        id_policy = ?cfg.storage.id_policy,
        "starting student registry server"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    // Background flushes from recent adds may not have landed yet.
    registry.flush().await?;
    info!("student registry server stopped");
    Ok(())
}
