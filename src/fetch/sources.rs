//! Remote Sources Module
//! The external data-host contract: every remote location lives here.

/// One per-year ZIP bundle published on data.gouv.fr.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveSource {
    pub year: &'static str,
    pub url: &'static str,
}

/// Per-year archive locations, in publication order.
pub const ARCHIVE_SOURCES: [ArchiveSource; 5] = [
    ArchiveSource {
        year: "2019",
        url: "https://www.data.gouv.fr/api/1/datasets/r/48c96399-be99-4c88-bb38-9972f8a2ee01",
    },
    ArchiveSource {
        year: "2020",
        url: "https://www.data.gouv.fr/api/1/datasets/r/e909c1eb-6dd0-4e85-ac2e-685fd856539c",
    },
    ArchiveSource {
        year: "2021",
        url: "https://www.data.gouv.fr/api/1/datasets/r/3f550073-59e8-4963-86f6-8434751f682e",
    },
    ArchiveSource {
        year: "2022",
        url: "https://www.data.gouv.fr/api/1/datasets/r/4326820e-5732-457e-aa02-aef10195fa24",
    },
    ArchiveSource {
        year: "2018",
        url: "https://www.data.gouv.fr/api/1/datasets/r/3dadcf5a-ae24-4aa4-af6f-d328e490739c",
    },
];

/// Standalone chronological series, downloaded without extraction.
pub const PARQUET_SOURCE: ArchiveSource = ArchiveSource {
    year: "series",
    url: "https://www.data.gouv.fr/fr/datasets/r/279abc73-6a28-4348-9183-563b537b5462",
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PARQUET_FILE, YEARS};

    #[test]
    fn test_every_layout_year_has_a_source() {
        for year in YEARS {
            assert!(
                ARCHIVE_SOURCES.iter().any(|s| s.year == year),
                "no archive source for {year}"
            );
        }
        assert_eq!(ARCHIVE_SOURCES.len(), YEARS.len());
    }

    #[test]
    fn test_parquet_source_matches_layout_name() {
        assert!(PARQUET_SOURCE.url.contains("data.gouv.fr"));
        assert!(PARQUET_FILE.ends_with(".parquet"));
    }
}
