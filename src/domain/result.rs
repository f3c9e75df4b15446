use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::NumericalWarning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EngineKind {
    SteadyState,
    RcNetwork,
}

/// Signed heat-flow components for one timestep, in W.
///
/// Loss terms are positive when heat leaves the zone. `solar_w`,
/// `internal_w` and `scheduled_w` are gains and never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatFlows {
    pub walls_w: f64,
    pub roof_w: f64,
    pub floor_w: f64,
    /// Window conduction
    pub windows_w: f64,
    pub infiltration_w: f64,
    pub ventilation_w: f64,
    /// Solar gain through glazing
    pub solar_w: f64,
    pub internal_w: f64,
    /// Switched extra gain such as cooking
    #[serde(default)]
    pub scheduled_w: f64,
    /// Share of `walls_w` + `floor_w` from ground-coupled planes
    pub ground_w: f64,
    /// Ground-coupled terms with losses clipped away, summed per plane
    pub ground_gain_only_w: f64,
}

impl HeatFlows {
    pub fn opaque_w(&self) -> f64 {
        self.walls_w + self.roof_w + self.floor_w
    }

    pub fn transmission_w(&self) -> f64 {
        self.opaque_w() + self.windows_w
    }

    pub fn air_exchange_w(&self) -> f64 {
        self.infiltration_w + self.ventilation_w
    }

    pub fn losses_w(&self) -> f64 {
        self.transmission_w() + self.air_exchange_w()
    }

    pub fn gains_w(&self) -> f64 {
        self.solar_w + self.internal_w + self.scheduled_w
    }

    /// Losses minus gains; positive means the zone needs heat.
    pub fn net_loss_w(&self) -> f64 {
        self.losses_w() - self.gains_w()
    }
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub timestamp: NaiveDateTime,
    pub outdoor_temperature_c: f64,
    pub heating_setpoint_c: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_setpoint_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ventilation_ach: Option<f64>,
    /// Components evaluated at the heating setpoint
    pub heating: HeatFlows,
    /// Components evaluated at the cooling setpoint, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling: Option<HeatFlows>,
    pub heating_demand_w: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooling_demand_w: Option<f64>,
    /// Mass temperatures, aligned with `ResultTable::node_ids`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mass_temperatures_c: Vec<f64>,
    /// Exterior driving temperatures, aligned with `ResultTable::node_ids`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exterior_temperatures_c: Vec<f64>,
}

/// Full engine output. The RC warm-up transient is included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    pub engine: EngineKind,
    /// Row spacing; `None` for a single-row steady-state run without a
    /// declared weather cadence
    pub timestep_s: Option<i64>,
    pub node_ids: Vec<String>,
    pub records: Vec<ResultRecord>,
    pub warnings: Vec<NumericalWarning>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn heating_demand_w(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.heating_demand_w).collect()
    }

    /// Cooling demand, if the engine produced one for every row.
    pub fn cooling_demand_w(&self) -> Option<Vec<f64>> {
        self.records.iter().map(|r| r.cooling_demand_w).collect()
    }

    pub fn peak_heating_w(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.heating_demand_w)
            .fold(0.0, f64::max)
    }

    fn node_index(&self, node_id: &str) -> Option<usize> {
        self.node_ids.iter().position(|id| id == node_id)
    }

    pub fn mass_temperature_series(&self, node_id: &str) -> Option<Vec<f64>> {
        let i = self.node_index(node_id)?;
        Some(self.records.iter().map(|r| r.mass_temperatures_c[i]).collect())
    }

    pub fn exterior_temperature_series(&self, node_id: &str) -> Option<Vec<f64>> {
        let i = self.node_index(node_id)?;
        Some(self.records.iter().map(|r| r.exterior_temperatures_c[i]).collect())
    }

    /// Rows at or after `warmup` past the first timestamp. A warm-up past
    /// the representable calendar leaves no rows.
    pub fn after_warmup(&self, warmup: Duration) -> &[ResultRecord] {
        let Some(first) = self.records.first() else {
            return &self.records;
        };
        let Some(cutoff) = first.timestamp.checked_add_signed(warmup) else {
            return &[];
        };
        let start = self.records.partition_point(|r| r.timestamp < cutoff);
        &self.records[start..]
    }
}
