//! The immutable, shareable set of readings behind every dashboard view.

use std::sync::Arc;

use super::reading::{GridReading, Stability};

/// Ordered sequence of validated readings from one successful upload.
///
/// Backed by a shared slice: cloning a `Dataset` hands out another reference
/// to the same rows. A dataset is never modified after construction; a new
/// upload produces a new value.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Arc<[GridReading]>,
}

impl Dataset {
    /// Wraps readings in file order.
    pub fn new(rows: Vec<GridReading>) -> Self {
        Self { rows: rows.into() }
    }

    /// A dataset with no readings, used before the first upload.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no readings.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All readings in file order.
    pub fn rows(&self) -> &[GridReading] {
        &self.rows
    }

    /// Returns `true` if both handles point at the same rows.
    pub fn same_rows(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }

    /// Borrows the dataset as a non-empty view, or `None` if there is no data.
    ///
    /// Metric functions only accept a [`Populated`] view, so a caller has to
    /// handle the empty case before any statistic is computed.
    pub fn populated(&self) -> Option<Populated<'_>> {
        if self.rows.is_empty() {
            None
        } else {
            Some(Populated { rows: &self.rows })
        }
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::empty()
    }
}

/// A borrowed view of a dataset holding at least one reading.
#[derive(Debug, Clone, Copy)]
pub struct Populated<'a> {
    rows: &'a [GridReading],
}

impl<'a> Populated<'a> {
    /// All readings in file order (never empty).
    pub fn rows(&self) -> &'a [GridReading] {
        self.rows
    }

    /// Number of readings (always >= 1).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Number of readings with the given label.
    pub fn count(&self, label: Stability) -> usize {
        self.rows.iter().filter(|r| r.stabf == label).count()
    }
}
