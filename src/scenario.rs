//! Scenario files: one building and its operating schedule, in TOML.
//!
//! ```toml
//! name = "south-office"
//! floor_area_m2 = 120.0
//! heating_setpoint_c = 20.0
//! cooling_setpoint_c = 26.0
//!
//! [air]
//! volume_m3 = 360.0
//! ventilation_flow_m3_s = 0.1
//! heat_recovery_effectiveness = 0.8
//! infiltration_ach = 0.3
//!
//! [gains]
//! equipment = 0.6
//! occupants = 0.4
//!
//! [[planes]]
//! id = "Wall-S"
//! type = "opaque"
//! area_m2 = 30.0
//! tilt_deg = 90.0
//! azimuth_deg = 180.0
//! u_value = 0.25
//! absorptance = 0.6
//! emissivity = 0.9
//!
//! [[mass_nodes]]
//! id = "Wall-S"
//! tilt_deg = 90.0
//! azimuth_deg = 180.0
//! area_m2 = 30.0
//! absorptance = 0.6
//! areal_capacitance_j_m2k = 150000.0
//! resistance = 4.0
//! ```

use anyhow::{Context, Result};
use figment::{
    providers::{Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::config::{timestep_from_minutes, EngineConfig};
use crate::domain::{
    AirSide, Circuit, EnvelopeAssembly, InternalGains, Orientation, Plane, PlaneSpec, Schedule,
    SurfaceClass, ThermalMassNode, WeatherTable,
};
use crate::error::{ConfigurationError, EngineError};
use crate::simulation::resample::{resample_factor, resample_weather, upsample_schedule};
use crate::simulation::{HeatingPolicy, RcNetworkInput, SteadyStateInput};

/// Massive surface described with areal construction values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassNodeSpec {
    pub id: String,
    #[serde(default)]
    pub class: Option<SurfaceClass>,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    pub area_m2: f64,
    pub absorptance: f64,
    pub areal_capacitance_j_m2k: f64,
    /// Total areal resistance, split evenly between R1 and R2.
    #[serde(default)]
    pub resistance: Option<f64>,
    #[serde(default)]
    pub r1: Option<f64>,
    #[serde(default)]
    pub r2: Option<f64>,
    /// Exterior film; selects the 3-resistor circuit.
    #[serde(default)]
    pub r3: Option<f64>,
}

impl TryFrom<MassNodeSpec> for ThermalMassNode {
    type Error = ConfigurationError;

    fn try_from(spec: MassNodeSpec) -> Result<Self, Self::Error> {
        let circuit = match (spec.r1, spec.r2, spec.r3, spec.resistance) {
            (Some(r1), Some(r2), Some(r3), _) => Circuit::ThreeResistor { r1, r2, r3 },
            (Some(r1), Some(r2), None, _) => Circuit::TwoResistor { r1, r2 },
            (None, None, None, Some(total)) => Circuit::split_evenly(total),
            (None, ..) => return Err(ConfigurationError::missing(&spec.id, "r1")),
            (Some(_), ..) => return Err(ConfigurationError::missing(&spec.id, "r2")),
        };
        let class = spec
            .class
            .unwrap_or_else(|| SurfaceClass::infer(spec.tilt_deg, false));
        ThermalMassNode::from_areal(
            spec.id,
            class,
            Orientation::new(spec.tilt_deg, spec.azimuth_deg),
            spec.area_m2,
            spec.absorptance,
            spec.areal_capacitance_j_m2k,
            circuit,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub floor_area_m2: Option<f64>,
    pub heating_setpoint_c: Schedule,
    #[serde(default)]
    pub cooling_setpoint_c: Option<Schedule>,
    /// Air changes per hour replacing the mechanical ventilation flow
    #[serde(default)]
    pub ventilation_ach: Option<Schedule>,
    #[serde(default)]
    pub heating_policy: HeatingPolicy,
    pub air: AirSide,
    #[serde(default)]
    pub gains: Option<InternalGains>,
    /// On/off appliance load (kW), counted as a gain like `gains`
    #[serde(default)]
    pub scheduled_gain_kw: Option<Schedule>,
    #[serde(default)]
    pub planes: Vec<PlaneSpec>,
    #[serde(default)]
    pub mass_nodes: Vec<MassNodeSpec>,
}

fn default_name() -> String {
    "scenario".to_string()
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let scenario: Self = Figment::from(Toml::file(path))
            .extract()
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        info!(
            name = %scenario.name,
            planes = scenario.planes.len(),
            mass_nodes = scenario.mass_nodes.len(),
            "Loaded scenario"
        );
        Ok(scenario)
    }

    fn planes(&self) -> Result<Vec<Plane>, ConfigurationError> {
        self.planes.iter().cloned().map(Plane::try_from).collect()
    }

    pub fn steady_state_input(&self, weather: WeatherTable) -> Result<SteadyStateInput, EngineError> {
        let mut input = SteadyStateInput::new(
            weather,
            self.planes()?,
            self.air.clone(),
            self.heating_setpoint_c.clone(),
        )
        .with_heating_policy(self.heating_policy);
        input.cooling_setpoint = self.cooling_setpoint_c.clone();
        input.ventilation_override = self.ventilation_ach.clone();
        input.gains = self.gains.clone();
        input.scheduled_gain = self.scheduled_gain_kw.clone();
        Ok(input)
    }

    /// RC input at the configured timestep.
    ///
    /// Mass nodes replace the exposed opaque planes; windows and
    /// ground-coupled planes stay steady-state. Weather and series schedules
    /// are linearly upsampled to the timestep.
    pub fn rc_input(&self, weather: &WeatherTable, config: &EngineConfig) -> Result<RcNetworkInput, EngineError> {
        if self.mass_nodes.is_empty() {
            return Err(ConfigurationError::InvalidScenario(format!(
                "'{}' has no mass_nodes for the RC engine",
                self.name
            ))
            .into());
        }
        let minutes = config.rc.timestep_minutes;
        let step = timestep_from_minutes(minutes)?;
        let factor = match weather.cadence() {
            Some(cadence) => resample_factor(cadence, step)?,
            None => 1,
        };
        let weather = resample_weather(weather, step)?;

        let nodes = self
            .mass_nodes
            .iter()
            .cloned()
            .map(ThermalMassNode::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let steady = self
            .planes()?
            .into_iter()
            .filter(|p| p.is_window() || p.is_ground_coupled())
            .collect();
        let assembly = EnvelopeAssembly::new(nodes, steady)?;

        let mut input = RcNetworkInput::new(
            weather,
            assembly,
            self.air.clone(),
            upsample_schedule(&self.heating_setpoint_c, factor),
        )
        .with_heating_policy(self.heating_policy)
        .with_timestep_minutes(minutes);
        input.ventilation_rate = self.ventilation_ach.as_ref().map(|s| upsample_schedule(s, factor));
        input.gains = self.gains.clone();
        input.scheduled_gain = self.scheduled_gain_kw.as_ref().map(|s| upsample_schedule(s, factor));
        Ok(input)
    }
}
