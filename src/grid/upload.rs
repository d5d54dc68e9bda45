//! Upload page state: one parse in flight at a time, errors shown verbatim.

use serde::Serialize;
use thiserror::Error;

use super::dataset::Dataset;
use super::ingest::IngestError;
use super::store::DatasetStore;

/// Prompt shown before any file has been selected.
pub const IDLE_PROMPT: &str = "Please upload a CSV file with smart grid stability data.";

/// Progress label shown while a file is being parsed.
pub const PARSING_LABEL: &str = "Parsing CSV...";

/// Returned when an upload is requested while another is still parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("an upload is already in progress")]
pub struct UploadBusy;

/// Lifecycle of the most recent upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadStatus {
    /// Nothing selected yet.
    Idle,
    /// Parsing `file_name`; further uploads are refused.
    Parsing { file_name: String },
    /// `file_name` was committed with `rows` readings.
    Loaded { file_name: String, rows: usize },
    /// `file_name` was rejected; `message` is shown verbatim.
    Failed { file_name: String, message: String },
}

impl UploadStatus {
    /// Name of the file involved, if any.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Parsing { file_name }
            | Self::Loaded { file_name, .. }
            | Self::Failed { file_name, .. } => Some(file_name),
        }
    }
}

/// State machine for the data upload page.
#[derive(Debug, Clone)]
pub struct UploadSession {
    status: UploadStatus,
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            status: UploadStatus::Idle,
        }
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    /// Returns `true` while a parse is in flight.
    pub fn is_parsing(&self) -> bool {
        matches!(self.status, UploadStatus::Parsing { .. })
    }

    /// Starts an upload of `file_name`, clearing any previous error.
    ///
    /// # Errors
    ///
    /// Returns [`UploadBusy`] if a parse is already running.
    pub fn begin(&mut self, file_name: impl Into<String>) -> Result<(), UploadBusy> {
        if self.is_parsing() {
            return Err(UploadBusy);
        }
        let file_name = file_name.into();
        tracing::info!(file = %file_name, "upload started");
        self.status = UploadStatus::Parsing { file_name };
        Ok(())
    }

    /// Completes the in-flight upload, committing a successful result to `store`.
    ///
    /// Returns the committed row count, or `None` if the upload failed (the
    /// store keeps its previous dataset). A result arriving while no upload
    /// is in flight is committed under an empty file name.
    pub fn finish(
        &mut self,
        result: Result<Dataset, IngestError>,
        store: &DatasetStore,
    ) -> Option<usize> {
        let file_name = self.status.file_name().unwrap_or_default().to_string();
        match store.commit(result) {
            Ok(rows) => {
                self.status = UploadStatus::Loaded { file_name, rows };
                Some(rows)
            }
            Err(e) => {
                self.status = UploadStatus::Failed {
                    file_name,
                    message: e.to_string(),
                };
                None
            }
        }
    }
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}
