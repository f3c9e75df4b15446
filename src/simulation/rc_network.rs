//! # RC Network Engine
//!
//! Replaces the instantaneous opaque-surface term with a lumped thermal-mass
//! response for each massive surface. Windows, slabs and air exchange stay
//! steady-state.
//!
//! Physics, per node:
//! - C · dT_C/dt = (T_int - T_C)/R1 + (T_ext - T_C)/R_ext + S
//! - 2-resistor: T_ext = sol-air temperature, R_ext = R2, S = 0
//! - 3-resistor: T_ext = outdoor air, R_ext = R2 + R3, S = α·A·I·R3/(R2 + R3)
//!
//! The indoor temperature is prescribed, so nodes never couple to each other.
//! Each node is integrated with the trapezoidal rule, which is stable for any
//! timestep; the node loops run in parallel.

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::{timestep_from_minutes, EngineConfig};
use crate::domain::{
    AirSide, Circuit, EngineKind, EnvelopeAssembly, HeatFlows, InternalGains, Plane,
    ResultRecord, ResultTable, Schedule, ThermalMassNode, WeatherTable,
};
use crate::error::{EngineError, NumericalWarning, ValidationError};
use crate::simulation::heat_balance::{
    accumulate_air, accumulate_plane, accumulate_surface, air_exchange, boundary_series,
    conduction_w, cooling_demand, window_solar_gain_w, zero_airflow_warnings, HeatingPolicy,
};
use crate::simulation::sol_air::sol_air_temperature;
use crate::simulation::solar::plane_irradiance_series;

/// Boundary conditions seen by one node at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forcing {
    pub indoor_c: f64,
    /// Sol-air temperature (2R) or outdoor air temperature (3R)
    pub exterior_c: f64,
    /// Solar power absorbed at the exterior surface, α·A·I (3R only)
    pub absorbed_w: f64,
}

/// 2C/τ in W/K.
pub fn capacity_rate(capacitance_j_k: f64, timestep_s: f64) -> f64 {
    2.0 * capacitance_j_k / timestep_s
}

fn trapezoidal(
    mass_prev: f64,
    prev: &Forcing,
    next: &Forcing,
    r1: f64,
    r_ext: f64,
    solar_w: f64,
    capacity_rate: f64,
) -> f64 {
    let g = 1.0 / r1 + 1.0 / r_ext;
    let numerator = (next.indoor_c + prev.indoor_c) / r1
        + (next.exterior_c + prev.exterior_c) / r_ext
        + solar_w
        + (capacity_rate - g) * mass_prev;
    numerator / (capacity_rate + g)
}

/// One trapezoidal step of the 2-resistor circuit.
pub fn step_two_resistor(
    mass_prev: f64,
    prev: &Forcing,
    next: &Forcing,
    r1: f64,
    r2: f64,
    capacity_rate: f64,
) -> f64 {
    trapezoidal(mass_prev, prev, next, r1, r2, 0.0, capacity_rate)
}

/// One trapezoidal step of the 3-resistor circuit.
///
/// The exterior surface node is eliminated: R2 and R3 act in series and the
/// absorbed solar power enters scaled by R3/(R2 + R3).
pub fn step_three_resistor(
    mass_prev: f64,
    prev: &Forcing,
    next: &Forcing,
    r1: f64,
    (r2, r3): (f64, f64),
    capacity_rate: f64,
) -> f64 {
    let r_ext = r2 + r3;
    let solar_w = r3 / r_ext * (next.absorbed_w + prev.absorbed_w);
    trapezoidal(mass_prev, prev, next, r1, r_ext, solar_w, capacity_rate)
}

/// Mass temperature series of one node, seeded at `initial_c`.
///
/// The output has one value per forcing row; the first is the seed itself.
pub fn integrate_node(
    node: &ThermalMassNode,
    forcing: &[Forcing],
    timestep_s: f64,
    initial_c: f64,
) -> Vec<f64> {
    let rate = capacity_rate(node.capacitance_j_k, timestep_s);
    let mut mass = Vec::with_capacity(forcing.len());
    if forcing.is_empty() {
        return mass;
    }
    mass.push(initial_c);
    for (prev, next) in forcing.iter().zip(&forcing[1..]) {
        let last = mass[mass.len() - 1];
        let t = match node.circuit {
            Circuit::TwoResistor { r1, r2 } => step_two_resistor(last, prev, next, r1, r2, rate),
            Circuit::ThreeResistor { r1, r2, r3 } => {
                step_three_resistor(last, prev, next, r1, (r2, r3), rate)
            }
        };
        mass.push(t);
    }
    mass
}

/// Heat delivered from the mass to the indoor air (W), positive into the room.
pub fn mass_to_room_w(node: &ThermalMassNode, mass_c: f64, indoor_c: f64) -> f64 {
    (mass_c - indoor_c) / node.circuit.r1()
}

/// Forcing for one node plus the exterior temperature reported for it.
///
/// For the 3-resistor circuit the reported value is the equivalent sol-air
/// temperature with a film coefficient of 1/(R3·A).
fn node_forcing(
    node: &ThermalMassNode,
    weather: &WeatherTable,
    setpoint: &[f64],
    film_coefficient_w_m2k: f64,
) -> (Vec<Forcing>, Vec<f64>) {
    let irradiance = plane_irradiance_series(weather, node.orientation);
    weather
        .samples()
        .iter()
        .zip(&irradiance)
        .zip(setpoint)
        .map(|((sample, &i), &indoor_c)| {
            let t_out = sample.outdoor_temperature_c;
            match node.circuit {
                Circuit::TwoResistor { .. } => {
                    let t_sol = sol_air_temperature(t_out, i, node.absorptance, film_coefficient_w_m2k);
                    let forcing = Forcing {
                        indoor_c,
                        exterior_c: t_sol,
                        absorbed_w: 0.0,
                    };
                    (forcing, t_sol)
                }
                Circuit::ThreeResistor { r3, .. } => {
                    let absorbed_w = node.absorptance * node.area_m2 * i;
                    let forcing = Forcing {
                        indoor_c,
                        exterior_c: t_out,
                        absorbed_w,
                    };
                    (forcing, t_out + absorbed_w * r3)
                }
            }
        })
        .unzip()
}

/// Inputs of one RC run. The weather must already be at the engine timestep.
#[derive(Debug, Clone)]
pub struct RcNetworkInput {
    pub weather: WeatherTable,
    pub assembly: EnvelopeAssembly,
    pub air: AirSide,
    /// Prescribed indoor temperature
    pub setpoint: Schedule,
    /// Ventilation in air changes per hour, replacing the mechanical flow.
    pub ventilation_rate: Option<Schedule>,
    pub gains: Option<InternalGains>,
    /// Switched extra gain in kW, one value per row.
    pub scheduled_gain: Option<Schedule>,
    pub heating_policy: HeatingPolicy,
    /// Overrides `rc.timestep_minutes` from the engine config.
    pub timestep_minutes: Option<i64>,
    /// Overrides `rc.initial_mass_temperature_c` from the engine config.
    pub initial_mass_temperature_c: Option<f64>,
}

impl RcNetworkInput {
    pub fn new(
        weather: WeatherTable,
        assembly: EnvelopeAssembly,
        air: AirSide,
        setpoint: impl Into<Schedule>,
    ) -> Self {
        Self {
            weather,
            assembly,
            air,
            setpoint: setpoint.into(),
            ventilation_rate: None,
            gains: None,
            scheduled_gain: None,
            heating_policy: HeatingPolicy::default(),
            timestep_minutes: None,
            initial_mass_temperature_c: None,
        }
    }

    pub fn with_ventilation_rate(mut self, ach: impl Into<Schedule>) -> Self {
        self.ventilation_rate = Some(ach.into());
        self
    }

    pub fn with_gains(mut self, gains: InternalGains) -> Self {
        self.gains = Some(gains);
        self
    }

    pub fn with_scheduled_gain(mut self, kw: impl Into<Schedule>) -> Self {
        self.scheduled_gain = Some(kw.into());
        self
    }

    pub fn with_heating_policy(mut self, policy: HeatingPolicy) -> Self {
        self.heating_policy = policy;
        self
    }

    pub fn with_timestep_minutes(mut self, minutes: i64) -> Self {
        self.timestep_minutes = Some(minutes);
        self
    }

    pub fn with_initial_mass_temperature(mut self, celsius: f64) -> Self {
        self.initial_mass_temperature_c = Some(celsius);
        self
    }
}

struct NodeSeries {
    mass_c: Vec<f64>,
    exterior_c: Vec<f64>,
    loss_w: Vec<f64>,
}

struct PlaneSeries<'a> {
    plane: &'a Plane,
    loss_w: Vec<f64>,
    solar_w: Vec<f64>,
}

#[instrument(skip_all, fields(rows = input.weather.len(), nodes = input.assembly.nodes().len()))]
pub fn run_rc_network(input: &RcNetworkInput, config: &EngineConfig) -> Result<ResultTable, EngineError> {
    let weather = &input.weather;
    let physics = &config.physics;
    let n = weather.len();

    let minutes = input.timestep_minutes.unwrap_or(config.rc.timestep_minutes);
    let timestep = timestep_from_minutes(minutes)?;
    // A single row carries no cadence and fits any timestep.
    if let Some(cadence) = weather.cadence().filter(|c| *c != timestep) {
        return Err(ValidationError::CadenceMismatch {
            expected_s: timestep.num_seconds(),
            found_s: cadence.num_seconds(),
        }
        .into());
    }
    let timestep_s = timestep.num_seconds() as f64;
    let initial_c = input
        .initial_mass_temperature_c
        .unwrap_or(config.rc.initial_mass_temperature_c);

    input.air.validate()?;
    if let Some(gains) = &input.gains {
        gains.validate()?;
    }
    let setpoint = input.setpoint.resolve("setpoint", n)?;
    let ventilation_ach = input
        .ventilation_rate
        .as_ref()
        .map(|s| s.resolve_non_negative("ventilation_rate", n))
        .transpose()?;
    let scheduled_kw = input
        .scheduled_gain
        .as_ref()
        .map(|s| s.resolve_non_negative("scheduled_gain", n))
        .transpose()?;
    let steady = input.assembly.steady_planes();
    let ground = if steady.iter().any(Plane::is_ground_coupled) {
        Some(weather.require_ground_temperature()?)
    } else {
        None
    };

    let nodes = input.assembly.nodes();
    let mut warnings = zero_airflow_warnings(&input.air, ventilation_ach.as_deref());
    warnings.extend(nodes.iter().filter_map(|node| {
        let limit_s = node.damping_limit_s();
        (timestep_s > limit_s).then(|| NumericalWarning::TimestepExceedsDampingLimit {
            node: node.id.clone(),
            timestep_s,
            limit_s,
        })
    }));
    for w in &warnings {
        warn!(warning = %w, "Numerical warning");
    }

    let mean_setpoint = setpoint.iter().sum::<f64>() / n as f64;
    let warmup = input
        .assembly
        .warmup_duration(config.rc.warmup_tolerance_k, mean_setpoint - initial_c);
    info!(
        rows = n,
        nodes = nodes.len(),
        steady_planes = steady.len(),
        timestep_min = minutes,
        policy = %input.heating_policy,
        warmup_h = warmup.num_hours(),
        "Running RC network"
    );
    if warmup > config.rc.warmup() {
        warn!(
            warmup_h = warmup.num_hours(),
            configured_h = config.rc.warmup().num_hours(),
            "Slowest node needs longer than the configured warm-up"
        );
    }

    let node_series: Vec<NodeSeries> = nodes
        .par_iter()
        .map(|node| {
            let (forcing, exterior_c) =
                node_forcing(node, weather, &setpoint, physics.exterior_film_coefficient_w_m2k);
            let mass_c = integrate_node(node, &forcing, timestep_s, initial_c);
            let loss_w = mass_c
                .iter()
                .zip(&setpoint)
                .map(|(&tc, &ti)| -mass_to_room_w(node, tc, ti))
                .collect();
            debug!(
                node = %node.id,
                time_constant_h = node.time_constant_s() / 3600.0,
                "Node integrated"
            );
            NodeSeries {
                mass_c,
                exterior_c,
                loss_w,
            }
        })
        .collect();

    let plane_series = steady
        .par_iter()
        .map(|plane| {
            let irradiance = plane_irradiance_series(weather, plane.orientation());
            let boundary = boundary_series(plane, weather, &irradiance, ground.as_deref(), physics)?;
            let conductance = plane.conductance_w_k();
            Ok(PlaneSeries {
                plane,
                loss_w: setpoint
                    .iter()
                    .zip(&boundary)
                    .map(|(&ti, &tb)| conduction_w(conductance, ti, tb))
                    .collect(),
                solar_w: irradiance.iter().map(|&i| window_solar_gain_w(plane, i)).collect(),
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let internal_w = input.gains.as_ref().map_or(0.0, InternalGains::total_w);

    let records: Vec<ResultRecord> = weather
        .samples()
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let mut flows = HeatFlows {
                internal_w,
                scheduled_w: scheduled_kw.as_ref().map_or(0.0, |kw| kw[i] * 1000.0),
                ..Default::default()
            };
            for (node, series) in nodes.iter().zip(&node_series) {
                accumulate_surface(&mut flows, node.class, series.loss_w[i]);
            }
            for s in &plane_series {
                accumulate_plane(&mut flows, s.plane, s.loss_w[i], s.solar_w[i]);
            }
            let vent = ventilation_ach.as_ref().map(|v| v[i]);
            accumulate_air(
                &mut flows,
                air_exchange(&input.air, vent, setpoint[i], sample.outdoor_temperature_c, physics),
            );

            ResultRecord {
                timestamp: sample.timestamp,
                outdoor_temperature_c: sample.outdoor_temperature_c,
                heating_setpoint_c: setpoint[i],
                cooling_setpoint_c: None,
                ventilation_ach: vent,
                heating_demand_w: input.heating_policy.demand(&flows),
                cooling_demand_w: Some(cooling_demand(&flows)),
                heating: flows,
                cooling: None,
                mass_temperatures_c: node_series.iter().map(|s| s.mass_c[i]).collect(),
                exterior_temperatures_c: node_series.iter().map(|s| s.exterior_c[i]).collect(),
            }
        })
        .collect();

    let table = ResultTable {
        engine: EngineKind::RcNetwork,
        timestep_s: Some(timestep.num_seconds()),
        node_ids: nodes.iter().map(|node| node.id.clone()).collect(),
        records,
        warnings,
    };
    info!(
        rows = table.len(),
        peak_heating_w = table.peak_heating_w(),
        "RC network run complete"
    );
    Ok(table)
}
