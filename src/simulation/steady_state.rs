//! # Steady-State Engine
//!
//! Instantaneous heat balance with no thermal mass. Every timestep is
//! independent, so per-plane series are computed in parallel over the whole
//! weather table and then folded row by row.

use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::envelope::ensure_unique_ids;
use crate::domain::{
    AirSide, EngineKind, HeatFlows, InternalGains, Plane, ResultRecord, ResultTable, Schedule,
    WeatherTable,
};
use crate::error::{EngineError, ValidationError};
use crate::simulation::heat_balance::{
    accumulate_air, accumulate_plane, air_exchange, boundary_series, conduction_w, cooling_demand,
    window_solar_gain_w, zero_airflow_warnings, HeatingPolicy,
};
use crate::simulation::solar::plane_irradiance_series;

/// Inputs of one steady-state run.
#[derive(Debug, Clone)]
pub struct SteadyStateInput {
    pub weather: WeatherTable,
    pub planes: Vec<Plane>,
    pub air: AirSide,
    pub heating_setpoint: Schedule,
    /// Enables cooling demand, evaluated at its own setpoint.
    pub cooling_setpoint: Option<Schedule>,
    pub gains: Option<InternalGains>,
    /// Ventilation in air changes per hour, replacing the mechanical flow.
    pub ventilation_override: Option<Schedule>,
    /// Switched extra gain in kW (cooking, process loads). Credited to
    /// cooling and to `CreditGains` heating only.
    pub scheduled_gain: Option<Schedule>,
    pub heating_policy: HeatingPolicy,
}

impl SteadyStateInput {
    pub fn new(
        weather: WeatherTable,
        planes: Vec<Plane>,
        air: AirSide,
        heating_setpoint: impl Into<Schedule>,
    ) -> Self {
        Self {
            weather,
            planes,
            air,
            heating_setpoint: heating_setpoint.into(),
            cooling_setpoint: None,
            gains: None,
            ventilation_override: None,
            scheduled_gain: None,
            heating_policy: HeatingPolicy::default(),
        }
    }

    pub fn with_cooling_setpoint(mut self, setpoint: impl Into<Schedule>) -> Self {
        self.cooling_setpoint = Some(setpoint.into());
        self
    }

    pub fn with_gains(mut self, gains: InternalGains) -> Self {
        self.gains = Some(gains);
        self
    }

    pub fn with_ventilation_override(mut self, ach: impl Into<Schedule>) -> Self {
        self.ventilation_override = Some(ach.into());
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
}

/// Per-plane series over the whole weather table.
struct PlaneSeries<'a> {
    plane: &'a Plane,
    heating_loss_w: Vec<f64>,
    cooling_loss_w: Option<Vec<f64>>,
    solar_w: Vec<f64>,
}

#[derive(Clone, Copy)]
enum Setpoint {
    Heating,
    Cooling,
}

/// Everything needed to fold one row of plane series into zone flows.
struct Zone<'a> {
    weather: &'a WeatherTable,
    series: &'a [PlaneSeries<'a>],
    air: &'a AirSide,
    ventilation_ach: Option<&'a [f64]>,
    internal_w: f64,
    scheduled_w: Option<&'a [f64]>,
    config: &'a EngineConfig,
}

impl Zone<'_> {
    fn flows(&self, i: usize, indoor_c: f64, setpoint: Setpoint) -> HeatFlows {
        let mut flows = HeatFlows {
            internal_w: self.internal_w,
            scheduled_w: self.scheduled_w.map_or(0.0, |g| g[i]),
            ..Default::default()
        };
        for s in self.series {
            let loss = match (setpoint, &s.cooling_loss_w) {
                (Setpoint::Cooling, Some(cooling)) => cooling[i],
                _ => s.heating_loss_w[i],
            };
            accumulate_plane(&mut flows, s.plane, loss, s.solar_w[i]);
        }
        accumulate_air(
            &mut flows,
            air_exchange(
                self.air,
                self.ventilation_ach.map(|v| v[i]),
                indoor_c,
                self.weather.samples()[i].outdoor_temperature_c,
                &self.config.physics,
            ),
        );
        flows
    }
}

fn losses(conductance_w_k: f64, indoor_c: &[f64], boundary_c: &[f64]) -> Vec<f64> {
    indoor_c
        .iter()
        .zip(boundary_c)
        .map(|(&ti, &tb)| conduction_w(conductance_w_k, ti, tb))
        .collect()
}

#[instrument(skip_all, fields(rows = input.weather.len(), planes = input.planes.len()))]
pub fn run_steady_state(
    input: &SteadyStateInput,
    config: &EngineConfig,
) -> Result<ResultTable, EngineError> {
    let weather = &input.weather;
    let physics = &config.physics;
    let n = weather.len();

    ensure_unique_ids(input.planes.iter().map(Plane::id))?;
    input.air.validate()?;
    if let Some(gains) = &input.gains {
        gains.validate()?;
    }

    let heating_sp = input.heating_setpoint.resolve("heating_setpoint", n)?;
    let cooling_sp = input
        .cooling_setpoint
        .as_ref()
        .map(|s| s.resolve("cooling_setpoint", n))
        .transpose()?;
    let ventilation_ach = input
        .ventilation_override
        .as_ref()
        .map(|s| s.resolve_non_negative("ventilation_override", n))
        .transpose()?;
    let scheduled_w = input
        .scheduled_gain
        .as_ref()
        .map(|s| s.resolve_non_negative("scheduled_gain", n))
        .transpose()?
        .map(|kw| kw.iter().map(|k| k * 1000.0).collect::<Vec<_>>());
    let ground = if input.planes.iter().any(Plane::is_ground_coupled) {
        Some(weather.require_ground_temperature()?)
    } else {
        None
    };

    info!(
        rows = n,
        planes = input.planes.len(),
        policy = %input.heating_policy,
        cooling = cooling_sp.is_some(),
        "Running steady-state heat balance"
    );

    let series = input
        .planes
        .par_iter()
        .map(|plane| {
            let irradiance = plane_irradiance_series(weather, plane.orientation());
            let boundary = boundary_series(plane, weather, &irradiance, ground.as_deref(), physics)?;
            let conductance = plane.conductance_w_k();
            debug!(plane = plane.id(), conductance_w_k = conductance, "Plane series computed");
            Ok(PlaneSeries {
                plane,
                heating_loss_w: losses(conductance, &heating_sp, &boundary),
                cooling_loss_w: cooling_sp.as_ref().map(|sp| losses(conductance, sp, &boundary)),
                solar_w: irradiance.iter().map(|&i| window_solar_gain_w(plane, i)).collect(),
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    let internal_w = input.gains.as_ref().map_or(0.0, InternalGains::total_w);
    let warnings = zero_airflow_warnings(&input.air, ventilation_ach.as_deref());
    for w in &warnings {
        warn!(warning = %w, "Numerical warning");
    }

    let zone = Zone {
        weather,
        series: &series,
        air: &input.air,
        ventilation_ach: ventilation_ach.as_deref(),
        internal_w,
        scheduled_w: scheduled_w.as_deref(),
        config,
    };

    let records: Vec<ResultRecord> = weather
        .samples()
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let heating = zone.flows(i, heating_sp[i], Setpoint::Heating);
            let cooling = cooling_sp
                .as_ref()
                .map(|sp| zone.flows(i, sp[i], Setpoint::Cooling));
            ResultRecord {
                timestamp: sample.timestamp,
                outdoor_temperature_c: sample.outdoor_temperature_c,
                heating_setpoint_c: heating_sp[i],
                cooling_setpoint_c: cooling_sp.as_ref().map(|sp| sp[i]),
                ventilation_ach: ventilation_ach.as_ref().map(|v| v[i]),
                heating_demand_w: input.heating_policy.demand(&heating),
                cooling_demand_w: cooling.as_ref().map(cooling_demand),
                heating,
                cooling,
                mass_temperatures_c: Vec::new(),
                exterior_temperatures_c: Vec::new(),
            }
        })
        .collect();

    let table = ResultTable {
        engine: EngineKind::SteadyState,
        timestep_s: weather.cadence().map(|c| c.num_seconds()),
        node_ids: Vec::new(),
        records,
        warnings,
    };
    info!(
        rows = table.len(),
        peak_heating_w = table.peak_heating_w(),
        "Steady-state run complete"
    );
    Ok(table)
}
