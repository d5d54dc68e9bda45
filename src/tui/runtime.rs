//! TUI application state: navigation, alert acknowledgment and background uploads.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::grid::alerts::AlertBoard;
use crate::grid::dataset::Dataset;
use crate::grid::ingest::{IngestError, ingest_path};
use crate::grid::metrics::{self, Thresholds};
use crate::grid::store::{DatasetStore, Snapshot};
use crate::grid::upload::{UploadBusy, UploadSession};
use crate::view::{PageContext, PageView, Route, build_page};

/// TUI application state.
pub struct App {
    /// Current dataset.
    store: DatasetStore,
    /// Classification thresholds.
    thresholds: Thresholds,
    /// Active page.
    pub route: Route,
    /// Acknowledgments of the alerts page; cleared when the page is left.
    pub board: AlertBoard,
    /// Upload page state.
    pub upload: UploadSession,
    /// Highlighted alert position on the alerts page.
    pub selected_alert: usize,
    /// Path being typed on the data page, `None` when not editing.
    pub input: Option<String>,
    /// Most recently requested file, for reloads.
    pub last_path: Option<PathBuf>,
    /// Result channel of the in-flight parse.
    pending: Option<Receiver<Result<Dataset, IngestError>>>,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// Input poll interval.
    pub tick: Duration,
}

impl App {
    /// Creates an app over an existing store.
    ///
    /// `last_path` is the file the store was loaded from, if any.
    pub fn new(
        store: DatasetStore,
        thresholds: Thresholds,
        tick: Duration,
        last_path: Option<PathBuf>,
    ) -> Self {
        let board = AlertBoard::new(store.generation());
        Self {
            store,
            thresholds,
            route: Route::Overview,
            board,
            upload: UploadSession::new(),
            selected_alert: 0,
            input: None,
            last_path,
            pending: None,
            quit: false,
            tick,
        }
    }

    /// Current dataset and generation.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Builds the model of the active page.
    pub fn page(&self) -> PageView {
        let snapshot = self.store.snapshot();
        build_page(
            self.route,
            &PageContext {
                dataset: &snapshot.dataset,
                thresholds: &self.thresholds,
                board: &self.board,
                upload: self.upload.status(),
            },
        )
    }

    /// Switches page. Leaving the alerts page discards its acknowledgments.
    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        if self.route == Route::Alerts {
            self.board.clear();
            self.selected_alert = 0;
        }
        self.input = None;
        self.route = route;
    }

    pub fn next_route(&mut self) {
        self.navigate(self.route.next());
    }

    pub fn prev_route(&mut self) {
        self.navigate(self.route.prev());
    }

    /// Number of alerts in the current dataset.
    pub fn alert_count(&self) -> usize {
        let snapshot = self.store.snapshot();
        snapshot
            .dataset
            .populated()
            .map_or(0, |data| metrics::alerts(data).len())
    }

    pub fn select_next_alert(&mut self) {
        let count = self.alert_count();
        if self.selected_alert + 1 < count {
            self.selected_alert += 1;
        }
    }

    pub fn select_prev_alert(&mut self) {
        self.selected_alert = self.selected_alert.saturating_sub(1);
    }

    /// Acknowledges the highlighted alert, if it exists.
    pub fn acknowledge_selected(&mut self) -> bool {
        if self.selected_alert >= self.alert_count() {
            return false;
        }
        self.board.acknowledge(self.selected_alert)
    }

    /// Starts editing the upload path, pre-filled with the last file.
    pub fn start_edit(&mut self) {
        if self.upload.is_parsing() {
            return;
        }
        let prefill = self
            .last_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.input = Some(prefill);
    }

    pub fn cancel_edit(&mut self) {
        self.input = None;
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.input.as_mut() {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.input.as_mut() {
            input.pop();
        }
    }

    /// Uploads the typed path. Empty input only closes the editor.
    pub fn submit_edit(&mut self) -> Result<(), UploadBusy> {
        let Some(input) = self.input.take() else {
            return Ok(());
        };
        let path = input.trim();
        if path.is_empty() {
            return Ok(());
        }
        self.start_upload(PathBuf::from(path))
    }

    /// Re-uploads the most recent file.
    pub fn reload(&mut self) -> Result<(), UploadBusy> {
        match self.last_path.clone() {
            Some(path) => self.start_upload(path),
            None => Ok(()),
        }
    }

    /// Parses `path` on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`UploadBusy`] while a previous parse is still running.
    pub fn start_upload(&mut self, path: PathBuf) -> Result<(), UploadBusy> {
        self.upload.begin(display_name(&path))?;
        let (tx, rx) = mpsc::channel();
        let worker_path = path.clone();
        thread::spawn(move || {
            // The receiver is gone only if the app quit mid-parse.
            let _ = tx.send(ingest_path(&worker_path));
        });
        self.pending = Some(rx);
        self.last_path = Some(path);
        Ok(())
    }

    /// Commits a finished background parse, if one has arrived.
    ///
    /// Returns `true` when an upload completed (successfully or not).
    pub fn poll_upload(&mut self) -> bool {
        let Some(rx) = self.pending.as_ref() else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                Err(IngestError::Parse("parser thread stopped unexpectedly".to_string()))
            }
        };
        self.pending = None;
        if self.upload.finish(result, &self.store).is_some() {
            self.board.sync(self.store.generation());
            self.selected_alert = 0;
        }
        true
    }
}

/// File name shown on the data page.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
