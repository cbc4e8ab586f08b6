//! HTTP preview surface. [routes::route_request] is a pure dispatcher; [run_server] serves it
//! through axum on a tokio runtime.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Settings;
use crate::data::{RegistryError, UnitRegistry};
use crate::parallel::WorkerPool;

pub mod api;
pub mod routes;

/// Shared read-only state handed to every request.
#[derive(Debug, Clone, Default)]
pub struct ServerState {
    pub registry: UnitRegistry,
    pub pool: WorkerPool,
}

impl ServerState {
    pub fn new(registry: UnitRegistry, pool: WorkerPool) -> Self {
        Self { registry, pool }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load unit catalog: {0}")]
    Registry(#[from] RegistryError),
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("serve error: {0}")]
    Serve(std::io::Error),
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn dispatch(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let body = String::from_utf8_lossy(&body);
    // Battles are CPU-bound; keep them off the async workers.
    let path = uri.path().to_string();
    let body = body.into_owned();
    let handled = tokio::task::spawn_blocking(move || {
        routes::route_request(&state, method.as_str(), &path, &body)
    })
    .await;

    match handled {
        Ok(response) => {
            let status =
                StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(header::CONTENT_TYPE, response.content_type)], response.body).into_response()
        }
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("request task failed: {err}"))
            .into_response(),
    }
}

pub fn run_server(settings: &Settings) -> Result<(), ServerError> {
    let registry = settings.load_registry()?;
    let state = Arc::new(ServerState::new(registry, settings.worker_pool()));
    let runtime = tokio::runtime::Runtime::new().map_err(ServerError::Runtime)?;

    runtime.block_on(async {
        let listener = TcpListener::bind(&settings.bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: settings.bind_addr.clone(),
                source,
            })?;
        info!(addr = %settings.bind_addr, units = state.registry.len(), "broadside server listening");
        axum::serve(listener, build_router(state))
            .await
            .map_err(ServerError::Serve)
    })
}
