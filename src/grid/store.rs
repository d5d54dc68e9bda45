//! Session-wide dataset container with a single replace-on-success update point.

use std::sync::{PoisonError, RwLock};

use super::dataset::Dataset;
use super::ingest::IngestError;

/// Current dataset plus the generation it was committed under.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Increments on every successful commit; 0 before the first upload.
    pub generation: u64,
    pub dataset: Dataset,
}

/// Holds the dataset shared by every page.
///
/// Readers take a [`Snapshot`] (a cheap handle clone) and never see a
/// partially built dataset: a new dataset is fully constructed before it is
/// swapped in under the write lock.
#[derive(Debug)]
pub struct DatasetStore {
    current: RwLock<Snapshot>,
}

impl DatasetStore {
    /// Creates a store holding an empty dataset at generation 0.
    pub fn new() -> Self {
        Self::with_dataset(Dataset::empty())
    }

    /// Creates a store holding `dataset` at generation 0.
    pub fn with_dataset(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Snapshot {
                generation: 0,
                dataset,
            }),
        }
    }

    /// Returns the current dataset and generation.
    pub fn snapshot(&self) -> Snapshot {
        // A poisoned lock still guards a complete snapshot.
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the current dataset.
    pub fn dataset(&self) -> Dataset {
        self.snapshot().dataset
    }

    /// Returns the current generation.
    pub fn generation(&self) -> u64 {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }

    /// Installs `dataset`, replacing the previous one in full.
    ///
    /// Returns the new generation.
    pub fn replace(&self, dataset: Dataset) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        guard.generation += 1;
        guard.dataset = dataset;
        tracing::info!(
            generation = guard.generation,
            rows = guard.dataset.len(),
            "dataset replaced"
        );
        guard.generation
    }

    /// Commits an ingest result.
    ///
    /// On `Ok` the dataset is replaced and its row count returned. On `Err`
    /// the store is left untouched and the error handed back.
    ///
    /// # Errors
    ///
    /// Returns the ingest error unchanged.
    pub fn commit(&self, result: Result<Dataset, IngestError>) -> Result<usize, IngestError> {
        match result {
            Ok(dataset) => {
                let rows = dataset.len();
                self.replace(dataset);
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload rejected, keeping current dataset");
                Err(e)
            }
        }
    }
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}
