//! Smart-grid stability dashboard: CSV ingestion, derived metrics and views.

/// JSON HTTP API (feature `api`).
#[cfg(feature = "api")]
pub mod api;
/// Command-line argument parsing.
pub mod cli;
/// TOML configuration loading and validation.
pub mod config;
/// Readings, ingestion, metrics and shared dashboard state.
pub mod grid;
/// CSV export.
pub mod io;
/// Terminal dashboard (feature `tui`).
#[cfg(feature = "tui")]
pub mod tui;
/// Routes and page models.
pub mod view;
