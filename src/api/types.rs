//! API request and response bodies that are not page models.

use serde::{Deserialize, Serialize};

/// Query parameters of `POST /data`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// File name shown on the data page.
    pub name: Option<String>,
}

/// Successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Readings kept after validation.
    pub rows: usize,
    /// Generation of the newly committed dataset.
    pub generation: u64,
}

/// Acknowledgment result.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// Position within the current alert list.
    pub index: usize,
    /// `false` if the alert had already been acknowledged.
    pub newly_acknowledged: bool,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message, shown verbatim.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
