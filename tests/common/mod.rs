//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use gridwatch::grid::REQUIRED_COLUMNS;

/// Valid rows in `fixtures/grid_sample.csv` after malformed ones are dropped.
pub const SAMPLE_ROWS: usize = 6;

/// Unstable rows among [`SAMPLE_ROWS`].
pub const SAMPLE_UNSTABLE: usize = 4;

/// `tau1` of each valid sample row, in file order.
pub const SAMPLE_TAU1: [f64; SAMPLE_ROWS] =
    [2.959060, 9.304097, 8.971707, 0.716415, 3.134112, 1.214979];

/// Path to the sample CSV fixture.
pub fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("grid_sample.csv")
}

/// Canonical header line.
pub fn header() -> String {
    REQUIRED_COLUMNS.join(",")
}

/// One CSV row with fixed τ and g columns.
///
/// `p` is the power of each participant, `stab` and `label` the outcome.
pub fn row(p: [f64; 4], stab: f64, label: &str) -> String {
    format!(
        "2.0,3.0,4.0,5.0,{},{},{},{},0.5,0.5,0.5,0.5,{stab},{label}",
        p[0], p[1], p[2], p[3]
    )
}

/// A full CSV document from a header and rows.
pub fn csv(rows: &[String]) -> String {
    let mut doc = header();
    doc.push('\n');
    for r in rows {
        doc.push_str(r);
        doc.push('\n');
    }
    doc
}
