pub mod config;
pub mod signaling;

pub use config::ServerConfig;
pub use signaling::*;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// `/ws` for peers, `/health` for probes.
pub fn router(service: SignalingService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(|| async { "ok" }))
        .layer(cors)
        .with_state(service)
}

/// Serve the rendezvous service on an already bound listener.
pub async fn serve(listener: TcpListener, service: SignalingService) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!("Signaling server listening on http://{}", addr);

    axum::serve(listener, router(service))
        .await
        .context("Signaling server stopped")
}

pub async fn run(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    serve(listener, SignalingService::new()).await
}
