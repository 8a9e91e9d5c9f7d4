//! Downloader Module
//! One-shot download and extraction of the remote dataset archives.

use std::fs::{self, File};
use std::io::{self, Cursor};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use zip::result::ZipError;
use zip::ZipArchive;

use super::manifest::FetchManifest;
use super::sources::{ArchiveSource, ARCHIVE_SOURCES, PARQUET_SOURCE};
use crate::data::DatasetLayout;

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to download {name}: {source}")]
    Network {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("downloaded archive for {name} is not a valid zip: {source}")]
    Archive {
        name: String,
        #[source]
        source: ZipError,
    },
    #[error("archive for {name} did not contain {expected}")]
    Incomplete { name: String, expected: String },
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
}

/// Whether a source was actually transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched,
    Skipped,
}

/// Summary of a fetch run.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub fetched: Vec<String>,
    pub skipped: Vec<String>,
}

/// Downloads and extracts the burglary dataset into a data directory.
pub struct Fetcher {
    client: reqwest::blocking::Client,
    layout: DatasetLayout,
    force: bool,
}

impl Fetcher {
    pub fn new(layout: DatasetLayout, force: bool) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Network {
                name: "http client".to_string(),
                source,
            })?;

        Ok(Self {
            client,
            layout,
            force,
        })
    }

    /// Fetch every configured source, then write the manifest.
    ///
    /// Fails fast: the first error aborts the run with a non-zero exit in
    /// the binary. Already-present files are skipped unless `force` is set.
    pub fn fetch_all(&self) -> Result<FetchReport, FetchError> {
        fs::create_dir_all(self.layout.data_dir())?;

        let mut report = FetchReport::default();
        for source in &ARCHIVE_SOURCES {
            match self.fetch_year(source)? {
                FetchOutcome::Fetched => report.fetched.push(source.year.to_string()),
                FetchOutcome::Skipped => report.skipped.push(source.year.to_string()),
            }
        }

        match self.fetch_parquet(&PARQUET_SOURCE)? {
            FetchOutcome::Fetched => report.fetched.push(PARQUET_SOURCE.year.to_string()),
            FetchOutcome::Skipped => report.skipped.push(PARQUET_SOURCE.year.to_string()),
        }

        let manifest = FetchManifest::from_layout(&self.layout);
        manifest.write(&self.layout.manifest_file())?;
        tracing::info!(
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            "fetch complete"
        );

        Ok(report)
    }

    /// Download one year's archive and extract it into the data directory.
    pub fn fetch_year(&self, source: &ArchiveSource) -> Result<FetchOutcome, FetchError> {
        let target = self.layout.year_file(source.year);
        if target.is_file() && !self.force {
            tracing::info!(year = source.year, "data already exists, skipping");
            return Ok(FetchOutcome::Skipped);
        }

        tracing::info!(year = source.year, "downloading data");
        let bytes = self.download(source.url, source.year)?;

        tracing::info!(year = source.year, "extracting data");
        self.extract_archive(&bytes, source.year)?;

        if !target.is_file() {
            return Err(FetchError::Incomplete {
                name: source.year.to_string(),
                expected: target
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            });
        }
        Ok(FetchOutcome::Fetched)
    }

    /// Download the chronological series as a plain file.
    pub fn fetch_parquet(&self, source: &ArchiveSource) -> Result<FetchOutcome, FetchError> {
        let target = self.layout.parquet_file();
        if target.is_file() && !self.force {
            tracing::info!("chronological series already exists, skipping");
            return Ok(FetchOutcome::Skipped);
        }

        tracing::info!("downloading chronological series");
        let bytes = self.download(source.url, source.year)?;

        // Stage then rename so a failed transfer never leaves a half file
        let staged = target.with_extension("parquet.part");
        fs::write(&staged, &bytes)?;
        fs::rename(&staged, &target)?;
        Ok(FetchOutcome::Fetched)
    }

    fn download(&self, url: &str, name: &str) -> Result<Vec<u8>, FetchError> {
        let network_err = |source| FetchError::Network {
            name: name.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(network_err)?;
        let bytes = response.bytes().map_err(network_err)?;
        tracing::debug!(name, bytes = bytes.len(), "download finished");
        Ok(bytes.to_vec())
    }

    /// Extract an in-memory archive into a staging directory, then rename
    /// the files into the data directory (atomic-replace on the same
    /// filesystem). The staging directory is discarded on any error.
    fn extract_archive(&self, bytes: &[u8], year: &str) -> Result<Vec<String>, FetchError> {
        let staging = self
            .layout
            .data_dir()
            .join(format!(".staging.{year}"));
        fs::create_dir_all(&staging)?;

        let staged = match self.extract_into(bytes, year, &staging) {
            Ok(staged) => staged,
            Err(err) => {
                let _ = fs::remove_dir_all(&staging);
                return Err(err);
            }
        };

        let mut extracted = Vec::new();
        for (name, staged_path) in staged {
            fs::rename(&staged_path, self.layout.data_dir().join(&name))?;
            extracted.push(name);
        }
        fs::remove_dir_all(&staging)?;
        Ok(extracted)
    }

    fn extract_into(
        &self,
        bytes: &[u8],
        year: &str,
        staging: &std::path::Path,
    ) -> Result<Vec<(String, PathBuf)>, FetchError> {
        let archive_err = |source| FetchError::Archive {
            name: year.to_string(),
            source,
        };

        let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(archive_err)?;
        let mut staged = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(archive_err)?;
            if entry.is_dir() {
                continue;
            }
            // Archives are published flat; keep only the file name and
            // refuse entries that escape the staging directory
            let Some(name) = entry
                .enclosed_name()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
            else {
                continue;
            };

            let staged_path = staging.join(&name);
            let mut out = File::create(&staged_path)?;
            io::copy(&mut entry, &mut out)?;
            staged.push((name, staged_path));
        }

        Ok(staged)
    }
}
