//! JSON HTTP API over the dashboard pages.
//!
//! One GET endpoint per route (`/`, `/devices`, `/analytics`, `/alerts`,
//! `/data`), `POST /data` to upload a CSV body and
//! `POST /alerts/{index}/ack` to acknowledge an alert.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::grid::alerts::AlertBoard;
use crate::grid::metrics::Thresholds;
use crate::grid::store::DatasetStore;
use crate::grid::upload::UploadSession;

/// Application state shared across all request handlers.
///
/// The dataset lives in the store and is swapped atomically on upload;
/// the alert board and upload session are small and guarded by mutexes
/// that are never held across an `.await`. When both are needed the upload
/// session is locked first.
pub struct AppState {
    /// Current dataset.
    pub store: DatasetStore,
    /// Classification thresholds.
    pub thresholds: Thresholds,
    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
    board: Mutex<AlertBoard>,
    upload: Mutex<UploadSession>,
}

impl AppState {
    /// Wraps a store for serving.
    pub fn new(store: DatasetStore, thresholds: Thresholds, max_upload_bytes: usize) -> Self {
        let generation = store.generation();
        Self {
            store,
            thresholds,
            max_upload_bytes,
            board: Mutex::new(AlertBoard::new(generation)),
            upload: Mutex::new(UploadSession::new()),
        }
    }

    fn board(&self) -> MutexGuard<'_, AlertBoard> {
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn upload(&self) -> MutexGuard<'_, UploadSession> {
        self.upload.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/", get(handlers::get_overview))
        .route("/devices", get(handlers::get_devices))
        .route("/analytics", get(handlers::get_analytics))
        .route("/alerts", get(handlers::get_alerts))
        .route("/alerts/{index}/ack", post(handlers::post_ack))
        .route(
            "/data",
            get(handlers::get_data).post(handlers::post_data),
        )
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}

/// Binds to the given address and serves the API until the process exits.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app).await
}
