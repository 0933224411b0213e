//! Router assembly, listener binding and the serve loop.

use axum::{Router, middleware, routing::get};
use std::{future::Future, sync::Arc};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::info;

use crate::error::ServerError;
use crate::handlers::{serve_index, serve_static};
use crate::middleware::log_requests;
use crate::state::{AppState, ServerConfig};

/// `GET /` serves the index document; every other `GET` falls back to the
/// document root. Other methods get `405 Method Not Allowed`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .fallback(get(serve_static))
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

/// Binds the configured address. There is no retry; a taken port is fatal.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.addr,
            source,
        })?;

    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(config.addr.port());
    info!("Listening on port {}", port);
    Ok(listener)
}

/// Serves until `shutdown` resolves.
pub async fn run<F>(config: ServerConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = Arc::new(AppState::from_config(&config)?);
    info!("Serving static files from: {:?}", state.document_root);
    info!("Index document: {:?}", state.index_path());

    let listener = bind(&config).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}
