//! Zone Records Module
//! Typed view of the dataset rows: rate bands, risk levels, record extraction.

use polars::prelude::*;

use super::loader::LoaderError;

/// Rate at or below which a zone counts as low risk (per 1000 dwellings).
pub const LOW_RISK_MAX: f64 = 5.0;
/// Rate at or below which a zone counts as medium risk.
pub const MEDIUM_RISK_MAX: f64 = 10.0;

/// Burglary-rate band as published: an open or bounded interval, in
/// burglaries per 1000 dwellings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateBand {
    /// "moins de X"
    Below(f64),
    /// "de X à Y"
    Between(f64, f64),
    /// "plus de X"
    Above(f64),
}

impl RateBand {
    /// Parse a published band label.
    ///
    /// Accepts the three documented shapes with French decimal commas and
    /// arbitrary trailing text ("pour 1 000 logements" and the like).
    pub fn parse(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();

        // "de X à Y" also contains "de ", so match the open shapes first
        if let Some(rest) = after(&lower, "moins de ") {
            return Some(Self::Below(leading_number(rest)?));
        }
        if let Some(rest) = after(&lower, "plus de ") {
            return Some(Self::Above(leading_number(rest)?));
        }
        if let Some(rest) = after(&lower, "de ") {
            let low = leading_number(rest)?;
            let rest = after(rest, " à ").or_else(|| after(rest, " a "))?;
            let high = leading_number(rest)?;
            return Some(Self::Between(low, high));
        }
        None
    }

    /// Representative numeric rate: the bound for open bands, the midpoint
    /// for bounded ones.
    pub fn rate(&self) -> f64 {
        match *self {
            Self::Below(x) | Self::Above(x) => x,
            Self::Between(low, high) => (low + high) / 2.0,
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_rate(self.rate())
    }
}

/// Risk level derived from the representative rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_rate(rate: f64) -> Self {
        if rate > MEDIUM_RISK_MAX {
            Self::High
        } else if rate > LOW_RISK_MAX {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Display label, matching the published terminology.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Faible",
            Self::Medium => "Moyen",
            Self::High => "Élevé",
        }
    }
}

/// One dataset row: a zone observed in one year.
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    pub year: String,
    pub code_uu: String,
    pub libelle_uu: String,
    pub band_label: String,
    pub band: RateBand,
}

impl ZoneRecord {
    pub fn rate(&self) -> f64 {
        self.band.rate()
    }

    pub fn risk_level(&self) -> RiskLevel {
        self.band.risk_level()
    }
}

/// Extract typed records from the combined DataFrame.
///
/// Rows with null values are skipped; a non-null band that does not match
/// any documented shape is a format error.
pub fn extract_records(df: &DataFrame) -> Result<Vec<ZoneRecord>, LoaderError> {
    let get_column = |name: &str| {
        df.column(name).map_err(|source| LoaderError::Format {
            file: "dataset".to_string(),
            source,
        })
    };
    let annee = get_column("annee")?;
    let code_uu = get_column("code_uu")?;
    let libelle_uu = get_column("libelle_uu")?;
    let classe = get_column("classe")?;

    let mut records = Vec::with_capacity(df.height());
    let mut skipped = 0usize;

    for i in 0..df.height() {
        let values = (annee.get(i), code_uu.get(i), libelle_uu.get(i), classe.get(i));
        let (Ok(year), Ok(code), Ok(label), Ok(band)) = values else {
            skipped += 1;
            continue;
        };
        if year.is_null() || code.is_null() || label.is_null() || band.is_null() {
            skipped += 1;
            continue;
        }

        let band_label = band.to_string().trim_matches('"').to_string();
        let band = RateBand::parse(&band_label).ok_or(LoaderError::BadRateBand {
            row: i,
            band: band_label.clone(),
        })?;

        records.push(ZoneRecord {
            year: year.to_string().trim_matches('"').to_string(),
            code_uu: code.to_string().trim_matches('"').to_string(),
            libelle_uu: label.to_string().trim_matches('"').to_string(),
            band_label,
            band,
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "rows with null values ignored");
    }

    Ok(records)
}

/// Parse the substring right after `pattern`, if present.
fn after<'a>(haystack: &'a str, pattern: &str) -> Option<&'a str> {
    haystack
        .find(pattern)
        .map(|pos| &haystack[pos + pattern.len()..])
}

/// Parse a French-formatted number at the start of the input.
fn leading_number(s: &str) -> Option<f64> {
    let number: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    number.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_column(name: &str, values: &[&str]) -> Column {
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        Column::new(name.into(), values)
    }

    #[test]
    fn test_parse_below_band() {
        assert_eq!(RateBand::parse("moins de 2,5"), Some(RateBand::Below(2.5)));
        assert_eq!(
            RateBand::parse("Moins de 5 pour 1000 logements"),
            Some(RateBand::Below(5.0))
        );
    }

    #[test]
    fn test_parse_above_band() {
        assert_eq!(RateBand::parse("plus de 10"), Some(RateBand::Above(10.0)));
        assert_eq!(
            RateBand::parse("plus de 12,5 cambriolages"),
            Some(RateBand::Above(12.5))
        );
    }

    #[test]
    fn test_parse_bounded_band() {
        assert_eq!(
            RateBand::parse("de 2,5 à 5"),
            Some(RateBand::Between(2.5, 5.0))
        );
        assert_eq!(
            RateBand::parse("de 10 à 15 pour 1000 logements"),
            Some(RateBand::Between(10.0, 15.0))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(RateBand::parse(""), None);
        assert_eq!(RateBand::parse("n/a"), None);
        assert_eq!(RateBand::parse("moins de beaucoup"), None);
        assert_eq!(RateBand::parse("de à 5"), None);
    }

    #[test]
    fn test_band_rates() {
        assert_eq!(RateBand::Below(2.5).rate(), 2.5);
        assert_eq!(RateBand::Above(10.0).rate(), 10.0);
        assert_eq!(RateBand::Between(2.5, 5.0).rate(), 3.75);
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RiskLevel::from_rate(4.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_rate(5.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_rate(5.1), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_rate(10.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_rate(10.1), RiskLevel::High);
    }

    #[test]
    fn test_extract_records() {
        let df = DataFrame::new(vec![
            string_column("annee", &["2019", "2020"]),
            string_column("code_uu", &["00851", "00851"]),
            string_column("libelle_uu", &["Paris", "Paris"]),
            string_column("classe", &["moins de 2,5", "de 5 à 10"]),
        ])
        .unwrap();

        let records = extract_records(&df).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, "2019");
        assert_eq!(records[0].band, RateBand::Below(2.5));
        assert_eq!(records[1].rate(), 7.5);
        assert_eq!(records[1].risk_level(), RiskLevel::Medium);
    }

    #[test]
    fn test_extract_records_bad_band() {
        let df = DataFrame::new(vec![
            string_column("annee", &["2019"]),
            string_column("code_uu", &["00851"]),
            string_column("libelle_uu", &["Paris"]),
            string_column("classe", &["indisponible"]),
        ])
        .unwrap();

        let err = extract_records(&df).unwrap_err();
        assert!(matches!(err, LoaderError::BadRateBand { row: 0, .. }));
    }
}
