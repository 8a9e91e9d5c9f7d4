//! Data module - dataset layout, loading and typed records

mod layout;
mod loader;
mod records;

pub use layout::{DatasetLayout, MANIFEST_FILE, PARQUET_FILE, YEARS, YEAR_FILE_STEM};
pub use loader::{DataLoader, LoaderError, REQUIRED_COLUMNS};
pub use records::{extract_records, RateBand, RiskLevel, ZoneRecord};
