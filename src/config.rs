use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub physics: PhysicsConfig,
    pub rc: RcConfig,
}

/// Physical constants shared by both engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub air_density_kg_m3: f64,
    pub air_specific_heat_j_kgk: f64,
    /// Exterior surface film coefficient h_e used in the sol-air temperature.
    pub exterior_film_coefficient_w_m2k: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            air_density_kg_m3: 1.2,
            air_specific_heat_j_kgk: 1005.0,
            exterior_film_coefficient_w_m2k: 23.0,
        }
    }
}

impl PhysicsConfig {
    /// Volumetric heat capacity of air (J/m³K).
    pub fn air_heat_capacity(&self) -> f64 {
        self.air_density_kg_m3 * self.air_specific_heat_j_kgk
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcConfig {
    pub timestep_minutes: i64,
    pub initial_mass_temperature_c: f64,
    /// Days the caller should discard before computing statistics.
    pub warmup_days: i64,
    pub warmup_tolerance_k: f64,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            timestep_minutes: 15,
            initial_mass_temperature_c: 10.0,
            warmup_days: 7,
            warmup_tolerance_k: 0.01,
        }
    }
}

impl RcConfig {
    /// Configured warm-up, saturating at `Duration::MAX`.
    pub fn warmup(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.warmup_days).unwrap_or(chrono::Duration::MAX)
    }
}

/// Engine timestep from whole minutes.
pub fn timestep_from_minutes(minutes: i64) -> Result<chrono::Duration, ConfigurationError> {
    chrono::Duration::try_minutes(minutes)
        .filter(|step| *step > chrono::Duration::zero())
        .ok_or(ConfigurationError::NonPositiveTimestep { minutes })
}

impl EngineConfig {
    /// Defaults, then the optional TOML file, then `HEATLOAD__` env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(EngineConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let figment = figment.merge(Env::prefixed("HEATLOAD__").split("__"));
        Ok(figment.extract()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.physics.air_heat_capacity(), 1.2 * 1005.0);
        assert_eq!(cfg.rc.timestep_minutes, 15);
        assert_eq!(cfg.rc.initial_mass_temperature_c, 10.0);
    }

    #[test]
    fn test_timestep_and_warmup_bounds() {
        assert_eq!(timestep_from_minutes(15), Ok(chrono::Duration::minutes(15)));
        assert_eq!(
            timestep_from_minutes(0),
            Err(ConfigurationError::NonPositiveTimestep { minutes: 0 })
        );
        assert!(timestep_from_minutes(i64::MAX).is_err());

        let rc = RcConfig {
            warmup_days: i64::MAX,
            ..RcConfig::default()
        };
        assert_eq!(rc.warmup(), chrono::Duration::MAX);
    }

    #[test]
    fn test_load_merges_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "engine.toml",
                r#"
                [physics]
                exterior_film_coefficient_w_m2k = 25.0

                [rc]
                timestep_minutes = 30
                "#,
            )?;
            jail.set_env("HEATLOAD__RC__WARMUP_DAYS", "14");

            let cfg = EngineConfig::load(Some(Path::new("engine.toml")))
                .map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(cfg.physics.exterior_film_coefficient_w_m2k, 25.0);
            assert_eq!(cfg.physics.air_density_kg_m3, 1.2);
            assert_eq!(cfg.rc.timestep_minutes, 30);
            assert_eq!(cfg.rc.warmup_days, 14);
            Ok(())
        });
    }
}
