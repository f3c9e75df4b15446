//! # heatload
//!
//! Hourly and sub-hourly heating and cooling demand of a single building
//! zone, from a prepared weather table and an envelope description.
//!
//! - [`simulation::run_steady_state`]: instantaneous heat balance, no mass.
//! - [`simulation::run_rc_network`]: lumped RC thermal mass per massive
//!   surface, trapezoidal integration.
//! - [`analysis::DemandSummary`]: energy, peaks and statistics of a run.

pub mod analysis;
pub mod config;
pub mod domain;
pub mod error;
pub mod scenario;
pub mod simulation;
pub mod telemetry;

pub use config::EngineConfig;
pub use error::{ConfigurationError, EngineError, NumericalWarning, ValidationError};
