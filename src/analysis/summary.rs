//! Demand Summary
//!
//! Energy totals, peaks and spread statistics computed from a result table
//! after the warm-up rows have been dropped.

use chrono::{Datelike, Duration};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{EngineKind, HeatFlows, ResultRecord, ResultTable};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SummaryError {
    #[error("Table has a single row and no declared timestep to integrate over")]
    UnknownTimestep,
    #[error("No rows left after discarding {warmup_h} h of warm-up ({rows} rows in table)")]
    EmptyAfterWarmup { rows: usize, warmup_h: i64 },
}

/// Mean, population standard deviation and range of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SeriesStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            mean,
            std_dev: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

/// Signed energy per heat-flow category in kWh, at the heating setpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub walls_kwh: f64,
    pub roof_kwh: f64,
    pub floor_kwh: f64,
    pub windows_kwh: f64,
    pub infiltration_kwh: f64,
    pub ventilation_kwh: f64,
    pub solar_kwh: f64,
    pub internal_kwh: f64,
    pub scheduled_kwh: f64,
}

impl EnergyBreakdown {
    fn add(&mut self, flows: &HeatFlows, kwh_per_w: f64) {
        self.walls_kwh += flows.walls_w * kwh_per_w;
        self.roof_kwh += flows.roof_w * kwh_per_w;
        self.floor_kwh += flows.floor_w * kwh_per_w;
        self.windows_kwh += flows.windows_w * kwh_per_w;
        self.infiltration_kwh += flows.infiltration_w * kwh_per_w;
        self.ventilation_kwh += flows.ventilation_w * kwh_per_w;
        self.solar_kwh += flows.solar_w * kwh_per_w;
        self.internal_kwh += flows.internal_w * kwh_per_w;
        self.scheduled_kwh += flows.scheduled_w * kwh_per_w;
    }

    pub fn losses_kwh(&self) -> f64 {
        self.walls_kwh
            + self.roof_kwh
            + self.floor_kwh
            + self.windows_kwh
            + self.infiltration_kwh
            + self.ventilation_kwh
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPeak {
    pub year: i32,
    pub month: u32,
    pub peak_heating_w: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTemperatureStats {
    pub node_id: String,
    pub mass: SeriesStats,
}

/// Headline numbers of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSummary {
    pub engine: EngineKind,
    /// Rows used after the warm-up cut
    pub rows: usize,
    pub warmup_rows: usize,
    pub heating_kwh: f64,
    pub peak_heating_w: f64,
    pub heating: SeriesStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peak_cooling_w: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling: Option<SeriesStats>,
    pub breakdown: EnergyBreakdown,
    pub monthly_peak_heating: Vec<MonthlyPeak>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mass_temperatures: Vec<NodeTemperatureStats>,
    pub warnings: usize,
}

impl DemandSummary {
    /// Summarises the rows at or after `warmup` past the first timestamp.
    ///
    /// Energy is integrated rectangularly: each row's demand held for one
    /// timestep.
    pub fn from_table(table: &ResultTable, warmup: Duration) -> Result<Self, SummaryError> {
        let Some(timestep_s) = table.timestep_s else {
            return Err(SummaryError::UnknownTimestep);
        };
        let rows = table.after_warmup(warmup);
        let kwh_per_w = timestep_s as f64 / 3600.0 / 1000.0;

        let heating: Vec<f64> = rows.iter().map(|r| r.heating_demand_w).collect();
        let cooling: Option<Vec<f64>> = rows.iter().map(|r| r.cooling_demand_w).collect();

        let mut breakdown = EnergyBreakdown::default();
        for r in rows {
            breakdown.add(&r.heating, kwh_per_w);
        }

        let Some(heating_stats) = SeriesStats::from_values(&heating) else {
            return Err(SummaryError::EmptyAfterWarmup {
                rows: table.len(),
                warmup_h: warmup.num_hours(),
            });
        };
        let cooling_stats = cooling.as_deref().and_then(SeriesStats::from_values);

        Ok(Self {
            engine: table.engine,
            rows: rows.len(),
            warmup_rows: table.len() - rows.len(),
            heating_kwh: heating.iter().sum::<f64>() * kwh_per_w,
            peak_heating_w: heating_stats.max,
            heating: heating_stats,
            cooling_kwh: cooling.as_ref().map(|c| c.iter().sum::<f64>() * kwh_per_w),
            peak_cooling_w: cooling_stats.map(|s| s.max),
            cooling: cooling_stats,
            breakdown,
            monthly_peak_heating: monthly_peaks(rows),
            mass_temperatures: table
                .node_ids
                .iter()
                .enumerate()
                .filter_map(|(i, id)| {
                    let temps: Vec<f64> = rows.iter().map(|r| r.mass_temperatures_c[i]).collect();
                    Some(NodeTemperatureStats {
                        node_id: id.clone(),
                        mass: SeriesStats::from_values(&temps)?,
                    })
                })
                .collect(),
            warnings: table.warnings.len(),
        })
    }

    /// Heating energy per m² of floor area (kWh/m²).
    pub fn specific_heating_kwh_m2(&self, floor_area_m2: f64) -> Option<f64> {
        (floor_area_m2 > 0.0).then(|| self.heating_kwh / floor_area_m2)
    }
}

fn monthly_peaks(rows: &[ResultRecord]) -> Vec<MonthlyPeak> {
    rows.iter()
        .chunk_by(|r| (r.timestamp.year(), r.timestamp.month()))
        .into_iter()
        .map(|((year, month), group)| MonthlyPeak {
            year,
            month,
            peak_heating_w: group.map(|r| r.heating_demand_w).fold(0.0, f64::max),
        })
        .collect()
}

/// Fractional change of heating energy from `baseline` to `variant`,
/// e.g. -0.12 when the variant needs 12 % less.
pub fn relative_change(baseline: &DemandSummary, variant: &DemandSummary) -> Option<f64> {
    (baseline.heating_kwh > 0.0)
        .then(|| (variant.heating_kwh - baseline.heating_kwh) / baseline.heating_kwh)
}
