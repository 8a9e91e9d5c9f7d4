//! Viewer Session Module
//! Everything the terminal viewer holds in memory for one run.

use std::collections::HashMap;

use crate::data::{extract_records, DataLoader, DatasetLayout, LoaderError, ZoneRecord};
use crate::fetch::FetchManifest;
use crate::stats::{StatsCalculator, UrbanUnitStats};

/// An urban unit as listed in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrbanUnit {
    pub code_uu: String,
    pub libelle_uu: String,
}

/// High-level numbers for the overview screen.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub row_count: usize,
    pub years: Vec<String>,
    pub unit_count: usize,
    pub manifest: Option<FetchManifest>,
}

/// In-memory state built from the extracted dataset at viewer startup.
/// Discarded at exit; nothing is written back to disk.
#[derive(Debug)]
pub struct ViewerSession {
    pub records: Vec<ZoneRecord>,
    pub units: Vec<UrbanUnit>,
    pub stats: HashMap<String, UrbanUnitStats>,
    pub summary: DatasetSummary,
}

impl ViewerSession {
    /// Load the dataset and precompute the per-unit analysis.
    pub fn load(layout: &DatasetLayout) -> Result<Self, LoaderError> {
        Self::load_with(layout, &|_, _| {})
    }

    /// Like [`ViewerSession::load`], reporting coarse progress along the way.
    pub fn load_with(
        layout: &DatasetLayout,
        progress: &dyn Fn(f32, &str),
    ) -> Result<Self, LoaderError> {
        progress(5.0, "Lecture des fichiers...");
        let mut loader = DataLoader::new();
        let df = loader.load_all(layout)?;

        progress(40.0, "Préparation des zones...");
        let records = extract_records(df)?;

        progress(70.0, "Calcul des statistiques...");
        let stats = StatsCalculator::compute_all_parallel(&records);

        let units = unique_units(&records);
        let years = loader.loaded_years().to_vec();
        let summary = DatasetSummary {
            row_count: records.len(),
            years,
            unit_count: units.len(),
            manifest: FetchManifest::read(&layout.manifest_file()),
        };

        progress(100.0, "Données chargées !");
        Ok(Self {
            records,
            units,
            stats,
            summary,
        })
    }

    /// Analysis for one urban unit.
    pub fn unit_stats(&self, code_uu: &str) -> Option<&UrbanUnitStats> {
        self.stats.get(code_uu)
    }

    /// Records for one urban unit, or the whole dataset.
    pub fn zones_for(&self, code_uu: Option<&str>) -> Vec<&ZoneRecord> {
        self.records
            .iter()
            .filter(|r| code_uu.map_or(true, |code| r.code_uu == code))
            .collect()
    }
}

/// Deduplicated urban units, sorted by label.
fn unique_units(records: &[ZoneRecord]) -> Vec<UrbanUnit> {
    let mut units: Vec<UrbanUnit> = Vec::new();
    let mut seen: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for record in records {
        if seen.insert(&record.code_uu) {
            units.push(UrbanUnit {
                code_uu: record.code_uu.clone(),
                libelle_uu: record.libelle_uu.clone(),
            });
        }
    }
    units.sort_by(|a, b| a.libelle_uu.cmp(&b.libelle_uu));
    units
}
