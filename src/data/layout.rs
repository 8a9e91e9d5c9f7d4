//! Dataset Layout Module
//! Known on-disk locations of the extracted dataset files.

use std::path::{Path, PathBuf};

use super::loader::LoaderError;

/// Years covered by the published dataset.
pub const YEARS: [&str; 5] = ["2018", "2019", "2020", "2021", "2022"];

/// Stem shared by every per-year dataset file.
pub const YEAR_FILE_STEM: &str = "cambriolageslogementsechelleinfracommunale";

/// Chronological series companion file, downloaded as-is.
pub const PARQUET_FILE: &str = "serieschrono-datagouv.parquet";

/// Manifest written by the fetcher after a successful run.
pub const MANIFEST_FILE: &str = "dataset-manifest.json";

/// Resolves the paths of the extracted dataset inside a data directory.
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    data_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the per-year dataset file.
    pub fn year_file(&self, year: &str) -> PathBuf {
        self.data_dir.join(format!("{YEAR_FILE_STEM}.{year}.csv"))
    }

    pub fn parquet_file(&self) -> PathBuf {
        self.data_dir.join(PARQUET_FILE)
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.data_dir.join(MANIFEST_FILE)
    }

    /// Year files that currently exist on disk, in year order.
    pub fn present_year_files(&self) -> Vec<(String, PathBuf)> {
        YEARS
            .iter()
            .map(|year| (year.to_string(), self.year_file(year)))
            .filter(|(_, path)| path.is_file())
            .collect()
    }

    /// Viewer precondition: at least one year file must exist.
    pub fn ensure_present(&self) -> Result<(), LoaderError> {
        if self.present_year_files().is_empty() {
            return Err(LoaderError::DataNotFound {
                dir: self.data_dir.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_file_naming() {
        let layout = DatasetLayout::new("/tmp/data");
        assert_eq!(
            layout.year_file("2019"),
            PathBuf::from("/tmp/data/cambriolageslogementsechelleinfracommunale.2019.csv")
        );
    }

    #[test]
    fn test_ensure_present_fails_on_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        let err = layout.ensure_present().unwrap_err();
        assert!(matches!(err, LoaderError::DataNotFound { .. }));
        assert!(err.to_string().contains("download_data"));
    }

    #[test]
    fn test_present_year_files_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DatasetLayout::new(dir.path());
        std::fs::write(layout.year_file("2021"), "annee\n").unwrap();
        std::fs::write(layout.year_file("2018"), "annee\n").unwrap();

        let present = layout.present_year_files();
        let years: Vec<&str> = present.iter().map(|(y, _)| y.as_str()).collect();
        assert_eq!(years, vec!["2018", "2021"]);
        assert!(layout.ensure_present().is_ok());
    }
}
