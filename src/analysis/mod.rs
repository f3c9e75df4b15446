//! Post-processing of engine result tables.

pub mod summary;

pub use summary::{relative_change, DemandSummary, EnergyBreakdown, MonthlyPeak, SeriesStats, SummaryError};
