//! Fetch Manifest Module
//! Record of what the fetcher left on disk, for the viewer's overview screen.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::{DatasetLayout, YEARS};

/// One dataset file as materialized on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestFile {
    pub name: String,
    pub bytes: u64,
}

/// Written next to the extracted files after every successful fetch.
/// The viewer works without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchManifest {
    pub fetched_at: DateTime<Utc>,
    pub files: Vec<ManifestFile>,
}

impl FetchManifest {
    /// Snapshot the dataset files currently present in the layout.
    pub fn from_layout(layout: &DatasetLayout) -> Self {
        let mut files = Vec::new();
        for year in YEARS {
            push_if_present(&mut files, &layout.year_file(year));
        }
        push_if_present(&mut files, &layout.parquet_file());

        Self {
            fetched_at: Utc::now(),
            files,
        }
    }

    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn read(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Total bytes across all recorded files.
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

fn push_if_present(files: &mut Vec<ManifestFile>, path: &Path) {
    if let Ok(meta) = fs::metadata(path) {
        if meta.is_file() {
            files.push(ManifestFile {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                bytes: meta.len(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_snapshot_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        std::fs::write(layout.year_file("2019"), "annee\n2019\n").unwrap();
        std::fs::write(layout.parquet_file(), b"PAR1").unwrap();

        let manifest = FetchManifest::from_layout(&layout);
        assert_eq!(manifest.files.len(), 2);
        assert!(manifest.total_bytes() > 0);

        manifest.write(&layout.manifest_file()).unwrap();
        let reloaded = FetchManifest::read(&layout.manifest_file()).unwrap();
        assert_eq!(reloaded.files.len(), 2);
        assert_eq!(reloaded.fetched_at, manifest.fetched_at);
    }

    #[test]
    fn test_manifest_read_missing_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        assert!(FetchManifest::read(&layout.manifest_file()).is_none());

        std::fs::write(layout.manifest_file(), "{ not json").unwrap();
        assert!(FetchManifest::read(&layout.manifest_file()).is_none());
    }
}
