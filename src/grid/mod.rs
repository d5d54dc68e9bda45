/// Page-local alert acknowledgment.
pub mod alerts;
pub mod dataset;
/// CSV ingestion and validation.
pub mod ingest;
pub mod metrics;
pub mod reading;
/// Shared dataset container.
pub mod store;
pub mod upload;

pub use dataset::{Dataset, Populated};
pub use ingest::{IngestError, ingest, ingest_path, ingest_reader};
pub use reading::{GridReading, REQUIRED_COLUMNS, Stability};
pub use store::{DatasetStore, Snapshot};
