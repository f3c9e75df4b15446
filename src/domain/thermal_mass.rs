//! Lumped-capacitance nodes for massive opaque surfaces.
//!
//! Resistances and capacitance are whole-surface values (K/W and J/K); the
//! `from_areal` constructors convert per-m² construction data.

use serde::{Deserialize, Serialize};

use super::envelope::{ensure_unique_ids, Orientation, Plane, SurfaceClass};
use crate::error::ConfigurationError;

/// Circuit topology around the single capacitance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "topology", rename_all = "snake_case")]
pub enum Circuit {
    /// R1 to indoor air, R2 to the sol-air node.
    TwoResistor { r1: f64, r2: f64 },
    /// R1 to indoor air, R2 mass to exterior surface, R3 exterior film.
    ThreeResistor { r1: f64, r2: f64, r3: f64 },
}

impl Circuit {
    /// Splits a total resistance equally between the indoor and exterior side.
    pub fn split_evenly(total: f64) -> Self {
        Circuit::TwoResistor {
            r1: total / 2.0,
            r2: total / 2.0,
        }
    }

    pub fn r1(&self) -> f64 {
        match *self {
            Circuit::TwoResistor { r1, .. } | Circuit::ThreeResistor { r1, .. } => r1,
        }
    }

    /// Resistance between the mass and the exterior driving temperature.
    pub fn exterior_resistance(&self) -> f64 {
        match *self {
            Circuit::TwoResistor { r2, .. } => r2,
            Circuit::ThreeResistor { r2, r3, .. } => r2 + r3,
        }
    }

    /// Total conductance seen by the capacitance (W/K).
    pub fn conductance(&self) -> f64 {
        1.0 / self.r1() + 1.0 / self.exterior_resistance()
    }

    fn scaled(&self, factor: f64) -> Self {
        match *self {
            Circuit::TwoResistor { r1, r2 } => Circuit::TwoResistor {
                r1: r1 * factor,
                r2: r2 * factor,
            },
            Circuit::ThreeResistor { r1, r2, r3 } => Circuit::ThreeResistor {
                r1: r1 * factor,
                r2: r2 * factor,
                r3: r3 * factor,
            },
        }
    }

    fn resistances(&self) -> Vec<(&'static str, f64)> {
        match *self {
            Circuit::TwoResistor { r1, r2 } => vec![("r1", r1), ("r2", r2)],
            Circuit::ThreeResistor { r1, r2, r3 } => vec![("r1", r1), ("r2", r2), ("r3", r3)],
        }
    }
}

/// One massive surface (a wall orientation or the roof).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalMassNode {
    pub id: String,
    pub class: SurfaceClass,
    pub orientation: Orientation,
    pub area_m2: f64,
    pub absorptance: f64,
    /// Total heat capacity (J/K)
    pub capacitance_j_k: f64,
    pub circuit: Circuit,
}

impl ThermalMassNode {
    pub fn new(
        id: impl Into<String>,
        class: SurfaceClass,
        orientation: Orientation,
        area_m2: f64,
        absorptance: f64,
        capacitance_j_k: f64,
        circuit: Circuit,
    ) -> Result<Self, ConfigurationError> {
        let node = Self {
            id: id.into(),
            class,
            orientation,
            area_m2,
            absorptance,
            capacitance_j_k,
            circuit,
        };
        node.validate()?;
        Ok(node)
    }

    /// Builds a node from areal resistances (m²K/W) and areal capacity (J/m²K).
    pub fn from_areal(
        id: impl Into<String>,
        class: SurfaceClass,
        orientation: Orientation,
        area_m2: f64,
        absorptance: f64,
        areal_capacitance_j_m2k: f64,
        areal_circuit: Circuit,
    ) -> Result<Self, ConfigurationError> {
        let id = id.into();
        if !(area_m2 > 0.0) {
            return Err(ConfigurationError::non_positive(&id, "area_m2", area_m2));
        }
        Self::new(
            id,
            class,
            orientation,
            area_m2,
            absorptance,
            areal_capacitance_j_m2k * area_m2,
            areal_circuit.scaled(1.0 / area_m2),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.area_m2 > 0.0) {
            return Err(ConfigurationError::non_positive(&self.id, "area_m2", self.area_m2));
        }
        if !(self.capacitance_j_k > 0.0) || !self.capacitance_j_k.is_finite() {
            return Err(ConfigurationError::non_positive(
                &self.id,
                "capacitance_j_k",
                self.capacitance_j_k,
            ));
        }
        for (name, r) in self.circuit.resistances() {
            if !(r > 0.0) || !r.is_finite() {
                return Err(ConfigurationError::non_positive(&self.id, name, r));
            }
        }
        if !(0.0..=1.0).contains(&self.absorptance) {
            return Err(ConfigurationError::out_of_range(
                &self.id,
                "absorptance",
                self.absorptance,
                0.0,
                1.0,
            ));
        }
        Ok(())
    }

    /// C / (1/R1 + 1/R_ext) in seconds.
    pub fn time_constant_s(&self) -> f64 {
        self.capacitance_j_k / self.circuit.conductance()
    }

    /// Timestep above which the trapezoidal update overshoots (2C/G).
    pub fn damping_limit_s(&self) -> f64 {
        2.0 * self.time_constant_s()
    }

    /// Time for an initial offset to decay below `tolerance_k`, saturating at
    /// `Duration::MAX` for time constants beyond chrono's range.
    pub fn warmup_duration(&self, tolerance_k: f64, initial_offset_k: f64) -> chrono::Duration {
        let offset = initial_offset_k.abs();
        if offset <= tolerance_k || tolerance_k <= 0.0 {
            return chrono::Duration::zero();
        }
        let seconds = (self.time_constant_s() * (offset / tolerance_k).ln()).ceil();
        chrono::Duration::try_seconds(seconds as i64).unwrap_or(chrono::Duration::MAX)
    }
}

/// Massive nodes plus the planes that stay steady-state (windows, slabs).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeAssembly {
    nodes: Vec<ThermalMassNode>,
    steady_planes: Vec<Plane>,
}

impl EnvelopeAssembly {
    pub fn new(nodes: Vec<ThermalMassNode>, steady_planes: Vec<Plane>) -> Result<Self, ConfigurationError> {
        for node in &nodes {
            node.validate()?;
        }
        ensure_unique_ids(
            nodes
                .iter()
                .map(|n| n.id.as_str())
                .chain(steady_planes.iter().map(|p| p.id())),
        )?;
        Ok(Self {
            nodes,
            steady_planes,
        })
    }

    pub fn nodes(&self) -> &[ThermalMassNode] {
        &self.nodes
    }

    pub fn steady_planes(&self) -> &[Plane] {
        &self.steady_planes
    }

    /// Warm-up of the slowest node.
    pub fn warmup_duration(&self, tolerance_k: f64, initial_offset_k: f64) -> chrono::Duration {
        self.nodes
            .iter()
            .map(|n| n.warmup_duration(tolerance_k, initial_offset_k))
            .max()
            .unwrap_or_else(chrono::Duration::zero)
    }
}
