//! # Heat Balance
//!
//! One signed accumulation of per-category heat flows, shared by the
//! steady-state and RC engines, and two thin policies that turn the signed
//! flows into clamped demand.
//!
//! Sign convention: positive means heat leaving the zone (a loss). Solar and
//! internal terms are gains and are kept positive in their own fields.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::PhysicsConfig;
use crate::domain::{
    AirSide, Boundary, Plane, PlaneKind, SurfaceClass, WeatherColumn, WeatherTable,
};
use crate::error::{AirPath, NumericalWarning, ValidationError};
use crate::simulation::sol_air::boundary_temperature;

pub use crate::domain::HeatFlows;

/// How solar and internal gains enter the heating demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HeatingPolicy {
    /// Size for the worst case: free heat is never credited.
    #[default]
    Conservative,
    /// Net solar and internal gains against the losses.
    CreditGains,
}

impl HeatingPolicy {
    pub fn demand(self, flows: &HeatFlows) -> f64 {
        match self {
            HeatingPolicy::Conservative => flows.losses_w().max(0.0),
            HeatingPolicy::CreditGains => flows.net_loss_w().max(0.0),
        }
    }
}

/// Cooling demand with every gain credited.
///
/// Ground-coupled planes may only add load: their loss terms are clipped at
/// zero per plane, so passive ground cooling never offsets the demand.
pub fn cooling_demand(flows: &HeatFlows) -> f64 {
    let losses = flows.losses_w() - flows.ground_w + flows.ground_gain_only_w;
    (flows.gains_w() - losses).max(0.0)
}

/// Conductive flow from the indoor air to a boundary, in W.
pub fn conduction_w(conductance_w_k: f64, indoor_c: f64, boundary_c: f64) -> f64 {
    conductance_w_k * (indoor_c - boundary_c)
}

/// Thermal resistance of an air stream (K/W).
///
/// A zero flow maps to an infinite resistance, which makes the stream carry
/// no heat.
pub fn air_resistance_k_w(flow_m3_s: f64, physics: &PhysicsConfig) -> f64 {
    if flow_m3_s == 0.0 {
        f64::INFINITY
    } else {
        1.0 / (physics.air_heat_capacity() * flow_m3_s)
    }
}

/// Infiltration and ventilation losses for one timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirExchange {
    pub infiltration_w: f64,
    pub ventilation_w: f64,
}

pub fn air_exchange(
    air: &AirSide,
    ventilation_ach: Option<f64>,
    indoor_c: f64,
    outdoor_c: f64,
    physics: &PhysicsConfig,
) -> AirExchange {
    let delta = indoor_c - outdoor_c;
    let infiltration = air_resistance_k_w(air.infiltration_flow_m3_s(), physics);
    let ventilation = air_resistance_k_w(air.effective_ventilation_flow_m3_s(ventilation_ach), physics);
    AirExchange {
        infiltration_w: delta / infiltration,
        ventilation_w: delta / ventilation,
    }
}

/// One warning per air path that carries exactly zero flow at any timestep.
pub fn zero_airflow_warnings(air: &AirSide, ventilation_ach: Option<&[f64]>) -> Vec<NumericalWarning> {
    let mut warnings = Vec::new();
    if air.infiltration_flow_m3_s() == 0.0 {
        warnings.push(NumericalWarning::ZeroAirflow {
            path: AirPath::Infiltration,
        });
    }
    let ventilation_zero = match ventilation_ach {
        Some(rates) => rates
            .iter()
            .any(|&ach| air.effective_ventilation_flow_m3_s(Some(ach)) == 0.0),
        None => air.effective_ventilation_flow_m3_s(None) == 0.0,
    };
    if ventilation_zero {
        warnings.push(NumericalWarning::ZeroAirflow {
            path: AirPath::Ventilation,
        });
    }
    warnings
}

/// Exterior boundary temperature of a plane for every weather row.
///
/// Windows conduct to the outdoor air; opaque planes see the sol-air or
/// ground temperature.
pub fn boundary_series(
    plane: &Plane,
    weather: &WeatherTable,
    irradiance_wm2: &[f64],
    ground_c: Option<&[f64]>,
    physics: &PhysicsConfig,
) -> Result<Vec<f64>, ValidationError> {
    let samples = weather.samples();
    match plane.kind() {
        PlaneKind::Window { .. } => Ok(weather.outdoor_temperature()),
        PlaneKind::Opaque {
            boundary: Boundary::GroundCoupled,
            ..
        } => ground_c
            .map(<[f64]>::to_vec)
            .ok_or_else(|| ValidationError::MissingColumn {
                column: WeatherColumn::GroundTemperatureC.to_string(),
            }),
        PlaneKind::Opaque { boundary, .. } => Ok(samples
            .iter()
            .zip(irradiance_wm2)
            .map(|(s, &i)| {
                boundary_temperature(
                    boundary,
                    s.outdoor_temperature_c,
                    i,
                    s.outdoor_temperature_c,
                    physics.exterior_film_coefficient_w_m2k,
                )
            })
            .collect()),
    }
}

/// Solar gain transmitted through a window (W). Zero for opaque planes,
/// whose absorbed radiation already sits in the sol-air temperature.
pub fn window_solar_gain_w(plane: &Plane, irradiance_wm2: f64) -> f64 {
    match *plane.kind() {
        PlaneKind::Window {
            solar_heat_gain,
            shading_factor,
            ..
        } => solar_heat_gain * plane.area_m2() * shading_factor * irradiance_wm2,
        PlaneKind::Opaque { .. } => 0.0,
    }
}

/// Adds an opaque-surface loss to its category total.
pub fn accumulate_surface(flows: &mut HeatFlows, class: SurfaceClass, loss_w: f64) {
    match class {
        SurfaceClass::Wall => flows.walls_w += loss_w,
        SurfaceClass::Roof => flows.roof_w += loss_w,
        SurfaceClass::Floor => flows.floor_w += loss_w,
    }
}

/// Adds a plane's transmission loss and solar gain.
pub fn accumulate_plane(flows: &mut HeatFlows, plane: &Plane, loss_w: f64, solar_w: f64) {
    if plane.is_window() {
        flows.windows_w += loss_w;
        flows.solar_w += solar_w;
        return;
    }
    accumulate_surface(flows, plane.class(), loss_w);
    if plane.is_ground_coupled() {
        flows.ground_w += loss_w;
        flows.ground_gain_only_w += loss_w.min(0.0);
    }
}

pub fn accumulate_air(flows: &mut HeatFlows, air: AirExchange) {
    flows.infiltration_w += air.infiltration_w;
    flows.ventilation_w += air.ventilation_w;
}
