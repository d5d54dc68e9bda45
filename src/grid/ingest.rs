//! CSV ingestion: delimited text with a header row → validated [`Dataset`].

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use csv::StringRecord;
use thiserror::Error;

use super::dataset::Dataset;
use super::reading::{GridReading, PARTICIPANTS, REQUIRED_COLUMNS, Stability};

/// Reasons an upload is rejected as a whole.
///
/// Messages are meant to be shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// One or more required header fields are absent.
    #[error(
        "CSV missing required columns: {}. Required: {}",
        .missing.join(", "),
        REQUIRED_COLUMNS.join(", ")
    )]
    MissingColumns {
        /// Missing names, in canonical column order.
        missing: Vec<String>,
    },
    /// The input could not be tokenized as delimited text.
    #[error("Error parsing CSV: {0}")]
    Parse(String),
}

/// Why a single row was left out of the dataset. Never surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowRejection {
    MissingCell(&'static str),
    NotNumeric(&'static str),
    UnknownLabel,
}

impl RowRejection {
    /// Column that caused the rejection.
    fn column(self) -> &'static str {
        match self {
            Self::MissingCell(column) | Self::NotNumeric(column) => column,
            Self::UnknownLabel => "stabf",
        }
    }
}

/// Header positions of the required columns, in [`REQUIRED_COLUMNS`] order.
struct ColumnLayout {
    positions: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnLayout {
    /// Locates every required column in the header row.
    fn resolve(headers: &StringRecord) -> Result<Self, IngestError> {
        let mut positions = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();
        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h == *name) {
                Some(pos) => positions[slot] = pos,
                None => missing.push((*name).to_string()),
            }
        }
        if missing.is_empty() {
            Ok(Self { positions })
        } else {
            Err(IngestError::MissingColumns { missing })
        }
    }

    fn cell<'r>(&self, record: &'r StringRecord, slot: usize) -> Result<&'r str, RowRejection> {
        record
            .get(self.positions[slot])
            .ok_or(RowRejection::MissingCell(REQUIRED_COLUMNS[slot]))
    }

    fn number(&self, record: &StringRecord, slot: usize) -> Result<f64, RowRejection> {
        let raw = self.cell(record, slot)?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or(RowRejection::NotNumeric(REQUIRED_COLUMNS[slot]))
    }

    /// Builds a reading from one record, or reports why it was rejected.
    fn read(&self, record: &StringRecord) -> Result<GridReading, RowRejection> {
        let mut tau = [0.0; PARTICIPANTS];
        let mut p = [0.0; PARTICIPANTS];
        let mut g = [0.0; PARTICIPANTS];
        for i in 0..PARTICIPANTS {
            tau[i] = self.number(record, i)?;
            p[i] = self.number(record, PARTICIPANTS + i)?;
            g[i] = self.number(record, 2 * PARTICIPANTS + i)?;
        }
        let stab = self.number(record, 12)?;
        let stabf =
            Stability::from_label(self.cell(record, 13)?).ok_or(RowRejection::UnknownLabel)?;
        Ok(GridReading {
            tau,
            p,
            g,
            stab,
            stabf,
        })
    }
}

/// Returns `true` for records that carry no data at all (e.g. `,,,`).
fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

/// Parses an in-memory CSV upload.
///
/// # Errors
///
/// * [`IngestError::MissingColumns`] if the header lacks a required column.
/// * [`IngestError::Parse`] if the bytes cannot be tokenized (e.g. invalid UTF-8).
///
/// Rows with a missing or non-numeric cell, or a label other than `stable` /
/// `unstable`, are dropped without error.
pub fn ingest(bytes: &[u8]) -> Result<Dataset, IngestError> {
    ingest_reader(bytes)
}

/// Parses a CSV file from disk.
///
/// # Errors
///
/// As [`ingest`]; a file that cannot be opened is reported as
/// [`IngestError::Parse`].
pub fn ingest_path(path: &Path) -> Result<Dataset, IngestError> {
    let file = File::open(path)
        .map_err(|e| IngestError::Parse(format!("cannot read \"{}\": {e}", path.display())))?;
    ingest_reader(io::BufReader::new(file))
}

/// Parses CSV text from any reader.
///
/// # Errors
///
/// As [`ingest`].
pub fn ingest_reader(reader: impl Read) -> Result<Dataset, IngestError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| IngestError::Parse(e.to_string()))?
        .clone();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for record in rdr.records() {
        let record = record.map_err(|e| IngestError::Parse(e.to_string()))?;
        if is_blank(&record) {
            continue;
        }
        match layout.read(&record) {
            Ok(reading) => rows.push(reading),
            Err(reason) => {
                dropped += 1;
                tracing::trace!(
                    ?reason,
                    column = reason.column(),
                    line = ?record.position().map(csv::Position::line),
                    "row dropped"
                );
            }
        }
    }

    tracing::debug!(rows = rows.len(), dropped, "csv ingested");
    Ok(Dataset::new(rows))
}
