//! Stats module - per-urban-unit risk analysis

mod calculator;

pub use calculator::{RiskyZone, StatsCalculator, UrbanUnitStats, YearBreakdown};
