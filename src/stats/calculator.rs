//! Statistics Calculator Module
//! Per-urban-unit risk breakdowns, computed in parallel across units.

use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

use crate::data::{RateBand, ZoneRecord};

/// Zone counts for one urban unit in one year, bucketed by band shape:
/// open-low bands count as low, open-high bands as high, bounded bands as
/// medium (independent of the numeric risk level used to color single zones).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearBreakdown {
    pub year: String,
    pub total: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl YearBreakdown {
    /// Integer percentages (low, medium, high); medium absorbs rounding so
    /// the three always sum to 100.
    pub fn percentages(&self) -> (u32, u32, u32) {
        if self.total == 0 {
            return (0, 0, 0);
        }
        let low = (self.low * 100 / self.total) as u32;
        let high = (self.high * 100 / self.total) as u32;
        (low, 100 - low - high, high)
    }
}

/// A zone flagged as dangerous: an open-high band, or a bounded band whose
/// lower bound is already in the double digits.
#[derive(Debug, Clone)]
pub struct RiskyZone {
    pub year: String,
    pub band_label: String,
    pub rate: f64,
}

/// Full analysis of one urban unit.
#[derive(Debug, Clone)]
pub struct UrbanUnitStats {
    pub code_uu: String,
    pub libelle_uu: String,
    /// One entry per observed year, in year order.
    pub per_year: Vec<YearBreakdown>,
    /// Dangerous zones across all years, highest rate first.
    pub risky_zones: Vec<RiskyZone>,
}

impl UrbanUnitStats {
    /// Total zones observed across all years.
    pub fn total_zones(&self) -> usize {
        self.per_year.iter().map(|y| y.total).sum()
    }
}

/// Handles the per-urban-unit analysis with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute statistics for every urban unit in parallel.
    pub fn compute_all_parallel(records: &[ZoneRecord]) -> HashMap<String, UrbanUnitStats> {
        let mut by_unit: HashMap<&str, Vec<&ZoneRecord>> = HashMap::new();
        for record in records {
            by_unit.entry(&record.code_uu).or_default().push(record);
        }

        by_unit
            .into_par_iter()
            .map(|(code, unit_records)| {
                (code.to_string(), Self::compute_unit_stats(&unit_records))
            })
            .collect()
    }

    /// Compute the analysis for one urban unit's records.
    pub fn compute_unit_stats(records: &[&ZoneRecord]) -> UrbanUnitStats {
        let code_uu = records
            .first()
            .map(|r| r.code_uu.clone())
            .unwrap_or_default();
        let libelle_uu = records
            .first()
            .map(|r| r.libelle_uu.clone())
            .unwrap_or_default();

        let mut per_year: BTreeMap<&str, YearBreakdown> = BTreeMap::new();
        let mut risky_zones: Vec<RiskyZone> = Vec::new();

        for record in records {
            let breakdown = per_year
                .entry(record.year.as_str())
                .or_insert_with(|| YearBreakdown {
                    year: record.year.clone(),
                    ..YearBreakdown::default()
                });
            breakdown.total += 1;
            match record.band {
                RateBand::Below(_) => breakdown.low += 1,
                RateBand::Between(..) => breakdown.medium += 1,
                RateBand::Above(_) => breakdown.high += 1,
            }

            if is_risky(record.band) {
                risky_zones.push(RiskyZone {
                    year: record.year.clone(),
                    band_label: record.band_label.clone(),
                    rate: record.rate(),
                });
            }
        }

        risky_zones.sort_by(|a, b| {
            b.rate
                .partial_cmp(&a.rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        UrbanUnitStats {
            code_uu,
            libelle_uu,
            per_year: per_year.into_values().collect(),
            risky_zones,
        }
    }
}

fn is_risky(band: RateBand) -> bool {
    match band {
        RateBand::Above(_) => true,
        RateBand::Between(low, _) => low >= 10.0,
        RateBand::Below(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: &str, code: &str, band_label: &str) -> ZoneRecord {
        ZoneRecord {
            year: year.to_string(),
            code_uu: code.to_string(),
            libelle_uu: format!("UU {code}"),
            band_label: band_label.to_string(),
            band: RateBand::parse(band_label).unwrap(),
        }
    }

    #[test]
    fn test_breakdown_buckets_follow_band_shape() {
        let records = vec![
            record("2022", "00851", "moins de 2,5"),
            // A bounded band below the low threshold still counts as medium
            record("2022", "00851", "de 2,5 à 5"),
            record("2022", "00851", "de 10 à 15"),
            record("2022", "00851", "plus de 15"),
        ];
        let refs: Vec<&ZoneRecord> = records.iter().collect();
        let stats = StatsCalculator::compute_unit_stats(&refs);

        assert_eq!(stats.per_year.len(), 1);
        let year = &stats.per_year[0];
        assert_eq!(year.total, 4);
        assert_eq!(year.low, 1);
        assert_eq!(year.medium, 2);
        assert_eq!(year.high, 1);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let breakdown = YearBreakdown {
            year: "2022".to_string(),
            total: 3,
            low: 1,
            medium: 1,
            high: 1,
        };
        let (low, medium, high) = breakdown.percentages();
        assert_eq!(low + medium + high, 100);
        assert_eq!(low, 33);
        assert_eq!(high, 33);
        assert_eq!(medium, 34);
    }

    #[test]
    fn test_risky_zones_rule_and_order() {
        let records = vec![
            record("2021", "00851", "de 10 à 15"),
            record("2022", "00851", "plus de 20"),
            record("2022", "00851", "de 5 à 8"),
            record("2022", "00851", "moins de 2,5"),
        ];
        let refs: Vec<&ZoneRecord> = records.iter().collect();
        let stats = StatsCalculator::compute_unit_stats(&refs);

        let rates: Vec<f64> = stats.risky_zones.iter().map(|z| z.rate).collect();
        assert_eq!(rates, vec![20.0, 12.5]);
        assert_eq!(stats.risky_zones[0].year, "2022");
    }

    #[test]
    fn test_per_year_in_year_order() {
        let records = vec![
            record("2022", "00851", "moins de 2,5"),
            record("2019", "00851", "moins de 2,5"),
            record("2020", "00851", "moins de 2,5"),
        ];
        let refs: Vec<&ZoneRecord> = records.iter().collect();
        let stats = StatsCalculator::compute_unit_stats(&refs);

        let years: Vec<&str> = stats.per_year.iter().map(|y| y.year.as_str()).collect();
        assert_eq!(years, vec!["2019", "2020", "2022"]);
        assert_eq!(stats.total_zones(), 3);
    }

    #[test]
    fn test_compute_all_parallel_groups_by_unit() {
        let records = vec![
            record("2022", "00851", "moins de 2,5"),
            record("2022", "00758", "plus de 10"),
            record("2021", "00851", "de 5 à 10"),
        ];
        let stats = StatsCalculator::compute_all_parallel(&records);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats["00851"].total_zones(), 2);
        assert_eq!(stats["00758"].total_zones(), 1);
        assert_eq!(stats["00758"].libelle_uu, "UU 00758");
    }
}
