//! # Data Model
//!
//! Immutable inputs (weather, envelope, air side, gains, schedules, thermal
//! mass nodes) and the result table the engines produce.

pub mod air;
pub mod envelope;
pub mod gains;
pub mod result;
pub mod schedule;
pub mod thermal_mass;
pub mod weather;

pub use air::AirSide;
pub use envelope::{
    Boundary, Orientation, Plane, PlaneKind, PlaneSpec, PlaneType, SurfaceClass, Transmittance,
};
pub use gains::InternalGains;
pub use result::{EngineKind, HeatFlows, ResultRecord, ResultTable};
pub use schedule::Schedule;
pub use thermal_mass::{Circuit, EnvelopeAssembly, ThermalMassNode};
pub use weather::{WeatherColumn, WeatherColumns, WeatherSample, WeatherTable};
