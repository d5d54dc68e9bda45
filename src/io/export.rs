//! CSV export of a validated dataset.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::grid::dataset::Dataset;
use crate::grid::reading::REQUIRED_COLUMNS;

/// Exports the dataset to a CSV file at the given path.
///
/// Writes a header row in canonical column order followed by one row per
/// reading. Only readings that survived validation are present, so the file
/// can be uploaded again without losing rows.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(dataset: &Dataset, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(dataset, buf)?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "dataset exported");
    Ok(())
}

/// Writes the dataset as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(dataset: &Dataset, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(REQUIRED_COLUMNS)?;

    for r in dataset.rows() {
        let mut record: Vec<String> = Vec::with_capacity(REQUIRED_COLUMNS.len());
        record.extend(r.tau.iter().map(f64::to_string));
        record.extend(r.p.iter().map(f64::to_string));
        record.extend(r.g.iter().map(f64::to_string));
        record.push(r.stab.to_string());
        record.push(r.stabf.as_str().to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
