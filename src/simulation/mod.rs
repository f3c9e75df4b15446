//! # Heat-Balance Engines
//!
//! Leaf routines (solar geometry, sol-air temperature, the shared heat
//! balance) and the two engines built on them.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use heatload::config::EngineConfig;
//! use heatload::domain::{AirSide, Orientation, Plane, WeatherColumns};
//! use heatload::simulation::{run_steady_state, SteadyStateInput};
//!
//! # fn main() -> anyhow::Result<()> {
//! let weather: WeatherColumns = serde_json::from_str(&std::fs::read_to_string("weather.json")?)?;
//! let wall = Plane::opaque("Wall-S", 10.0, Orientation::vertical(180.0), 0.3, 0.6, 0.9)?;
//! let air = AirSide::new(250.0, 0.05, 0.8, 0.3)?;
//!
//! let input = SteadyStateInput::new(weather.into_table()?, vec![wall], air, 20.0)
//!     .with_cooling_setpoint(26.0);
//! let table = run_steady_state(&input, &EngineConfig::default())?;
//! println!("peak heating: {:.0} W", table.peak_heating_w());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod heat_balance;
pub mod rc_network;
pub mod resample;
pub mod sol_air;
pub mod solar;
pub mod steady_state;

pub use batch::{run_batch, NamedScenario, RunOutcome, Scenario, ScenarioOutcome};
pub use heat_balance::{cooling_demand, HeatingPolicy};
pub use rc_network::{run_rc_network, RcNetworkInput};
pub use resample::{resample_weather, upsample_schedule, upsample_series};
pub use steady_state::{run_steady_state, SteadyStateInput};
