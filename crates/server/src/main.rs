use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::get,
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::AssetMetadata,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_public_url};

pub const NFT_METADATA_ROUTE: &str = "/api/nft-metadata";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let public_url = prepare_public_url(&settings.public_url)?;
    let app = build_router(Arc::new(AppState::new(&public_url)));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, %public_url, "metadata server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(NFT_METADATA_ROUTE, get(nft_metadata))
        .fallback(not_found)
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn nft_metadata(State(state): State<Arc<AppState>>) -> Json<AssetMetadata> {
    Json(state.metadata.clone())
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiError>) {
    warn!(%uri, "no route");
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("no route for {}", uri.path()),
        )),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
