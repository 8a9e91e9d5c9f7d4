//! Dataset Loader Module
//! Loads the extracted per-year CSV files into one DataFrame using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::layout::DatasetLayout;

/// Columns every year file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["annee", "code_uu", "libelle_uu", "classe"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("no dataset found in {dir}: run download_data first")]
    DataNotFound { dir: PathBuf },
    #[error("{file}: missing required column '{column}'")]
    MissingColumn { file: String, column: String },
    #[error("{file}: cannot parse dataset: {source}")]
    Format {
        file: String,
        #[source]
        source: PolarsError,
    },
    #[error("row {row}: unrecognized rate band '{band}'")]
    BadRateBand { row: usize, band: String },
}

/// Loads the extracted dataset files with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
    loaded_years: Vec<String>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            df: None,
            loaded_years: Vec::new(),
        }
    }

    /// Load every year file present in the layout and combine them.
    pub fn load_all(&mut self, layout: &DatasetLayout) -> Result<&DataFrame, LoaderError> {
        layout.ensure_present()?;

        let mut combined: Option<DataFrame> = None;
        for (year, path) in layout.present_year_files() {
            let df = Self::load_year_file(&path)?;
            tracing::debug!(year = %year, rows = df.height(), "year file loaded");

            combined = match combined {
                None => Some(df),
                Some(acc) => Some(acc.vstack(&df).map_err(|source| LoaderError::Format {
                    file: display_name(&path),
                    source,
                })?),
            };
            self.loaded_years.push(year);
        }

        self.df = combined;
        self.df.as_ref().ok_or(LoaderError::DataNotFound {
            dir: layout.data_dir().to_path_buf(),
        })
    }

    /// Load a single year file and normalize it to the required columns.
    pub fn load_year_file(path: &Path) -> Result<DataFrame, LoaderError> {
        let file = display_name(path);

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|source| LoaderError::Format {
                file: file.clone(),
                source,
            })?;

        for column in REQUIRED_COLUMNS {
            if df.column(column).is_err() {
                return Err(LoaderError::MissingColumn {
                    file,
                    column: column.to_string(),
                });
            }
        }

        // Keep only the required columns, all as strings (year files may
        // type `annee` as integer)
        df.lazy()
            .select(
                REQUIRED_COLUMNS
                    .map(|name| col(name).cast(DataType::String))
                    .to_vec(),
            )
            .collect()
            .map_err(|source| LoaderError::Format { file, source })
    }

    /// Get the years that contributed rows, in load order.
    pub fn loaded_years(&self) -> &[String] {
        &self.loaded_years
    }

    /// Get the number of rows in the combined DataFrame.
    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(|df| df.height()).unwrap_or(0)
    }

    /// Get a reference to the combined DataFrame.
    pub fn get_dataframe(&self) -> Option<&DataFrame> {
        self.df.as_ref()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
