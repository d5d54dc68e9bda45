/// CSV export of validated datasets.
pub mod export;
