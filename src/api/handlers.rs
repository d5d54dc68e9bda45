//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{AckResponse, ErrorResponse, UploadQuery, UploadResponse};
use crate::grid::dataset::Dataset;
use crate::grid::ingest::{IngestError, ingest};
use crate::grid::metrics;
use crate::grid::upload::UploadStatus;
use crate::view::{PageContext, PageView, Route, build_page};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(message)))
}

/// Builds a page from the current snapshot.
///
/// Acknowledgments recorded against an older dataset are discarded first.
fn render(state: &AppState, route: Route) -> PageView {
    let snapshot = state.store.snapshot();
    // Lock order is upload before board.
    let upload = state.upload().status().clone();
    let mut board = state.board();
    board.sync(snapshot.generation);
    build_page(
        route,
        &PageContext {
            dataset: &snapshot.dataset,
            thresholds: &state.thresholds,
            board: &board,
            upload: &upload,
        },
    )
}

/// `GET /` → overview page.
pub async fn get_overview(State(state): State<Arc<AppState>>) -> Json<PageView> {
    Json(render(&state, Route::Overview))
}

/// `GET /devices` → device status page.
pub async fn get_devices(State(state): State<Arc<AppState>>) -> Json<PageView> {
    Json(render(&state, Route::Devices))
}

/// `GET /analytics` → risk prediction page.
pub async fn get_analytics(State(state): State<Arc<AppState>>) -> Json<PageView> {
    Json(render(&state, Route::Analytics))
}

/// `GET /alerts` → alert list with acknowledgment marks.
pub async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<PageView> {
    Json(render(&state, Route::Alerts))
}

/// `GET /data` → upload status page.
pub async fn get_data(State(state): State<Arc<AppState>>) -> Json<PageView> {
    Json(render(&state, Route::Data))
}

/// Uploads a CSV request body.
///
/// `POST /data?name=<file>` → 200 + `UploadResponse`
/// → 409 while another upload is parsing
/// → 422 + verbatim ingest error; the current dataset is kept
///
/// Parsing and the commit run on a blocking task that finishes even if the
/// client goes away, so the session never stays stuck in `Parsing`.
pub async fn post_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    let file_name = query.name.unwrap_or_else(|| "upload.csv".to_string());
    state
        .upload()
        .begin(file_name)
        .map_err(|e| api_error(StatusCode::CONFLICT, e.to_string()))?;

    let task_state = Arc::clone(&state);
    let outcome = match tokio::task::spawn_blocking(move || complete_upload(&task_state, &body))
        .await
    {
        Ok(outcome) => outcome,
        // The task died before committing; release the session here.
        Err(e) => finish_upload(
            &state,
            Err(IngestError::Parse(format!("parser task failed: {e}"))),
        ),
    };
    outcome
        .map(Json)
        .map_err(|message| api_error(StatusCode::UNPROCESSABLE_ENTITY, message))
}

/// Parses `body` and commits the result to the in-flight upload.
fn complete_upload(state: &AppState, body: &[u8]) -> Result<UploadResponse, String> {
    finish_upload(state, ingest(body))
}

/// Ends the in-flight upload with `result`.
///
/// Returns the committed row count and generation, or the message shown on
/// the data page.
fn finish_upload(
    state: &AppState,
    result: Result<Dataset, IngestError>,
) -> Result<UploadResponse, String> {
    let mut upload = state.upload();
    match upload.finish(result, &state.store) {
        Some(rows) => {
            let generation = state.store.generation();
            state.board().sync(generation);
            Ok(UploadResponse { rows, generation })
        }
        None => Err(match upload.status() {
            UploadStatus::Failed { message, .. } => message.clone(),
            _ => "upload failed".to_string(),
        }),
    }
}

/// Acknowledges the alert at `index` in the current alert list.
///
/// `POST /alerts/{index}/ack` → 200 + `AckResponse`
/// → 404 if `index` is past the end of the list
/// → 409 if no dataset is loaded
pub async fn post_ack(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<AckResponse>, ApiError> {
    let snapshot = state.store.snapshot();
    let Some(data) = snapshot.dataset.populated() else {
        return Err(api_error(StatusCode::CONFLICT, "no dataset loaded"));
    };
    let count = metrics::alerts(data).len();
    if index >= count {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("alert {index} does not exist ({count} alerts)"),
        ));
    }

    let mut board = state.board();
    board.sync(snapshot.generation);
    let newly_acknowledged = board.acknowledge(index);
    Ok(Json(AckResponse {
        index,
        newly_acknowledged,
    }))
}
