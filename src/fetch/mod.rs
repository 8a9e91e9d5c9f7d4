//! Fetch module - download and extraction of the remote dataset

mod downloader;
mod manifest;
mod sources;

pub use downloader::{FetchError, FetchOutcome, FetchReport, Fetcher};
pub use manifest::{FetchManifest, ManifestFile};
pub use sources::{ArchiveSource, ARCHIVE_SOURCES, PARQUET_SOURCE};
