use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Zone air-exchange description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSide {
    pub volume_m3: f64,
    /// Mechanical ventilation supply flow (m³/s)
    pub ventilation_flow_m3_s: f64,
    /// Fraction of exhaust heat returned to the supply air (0-1)
    pub heat_recovery_effectiveness: f64,
    /// Infiltration in air changes per hour
    pub infiltration_ach: f64,
}

impl AirSide {
    pub fn new(
        volume_m3: f64,
        ventilation_flow_m3_s: f64,
        heat_recovery_effectiveness: f64,
        infiltration_ach: f64,
    ) -> Result<Self, ConfigurationError> {
        let air = Self {
            volume_m3,
            ventilation_flow_m3_s,
            heat_recovery_effectiveness,
            infiltration_ach,
        };
        air.validate()?;
        Ok(air)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.volume_m3 > 0.0) {
            return Err(ConfigurationError::non_positive("air", "volume_m3", self.volume_m3));
        }
        for (property, value) in [
            ("ventilation_flow_m3_s", self.ventilation_flow_m3_s),
            ("infiltration_ach", self.infiltration_ach),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigurationError::out_of_range("air", property, value, 0.0, f64::INFINITY));
            }
        }
        if !(0.0..=1.0).contains(&self.heat_recovery_effectiveness) {
            return Err(ConfigurationError::out_of_range(
                "air",
                "heat_recovery_effectiveness",
                self.heat_recovery_effectiveness,
                0.0,
                1.0,
            ));
        }
        Ok(())
    }

    /// Infiltration volumetric flow (m³/s).
    pub fn infiltration_flow_m3_s(&self) -> f64 {
        self.infiltration_ach * self.volume_m3 / 3600.0
    }

    /// Volumetric flow for an air-change rate over this zone (m³/s).
    pub fn ach_to_flow_m3_s(&self, ach: f64) -> f64 {
        ach * self.volume_m3 / 3600.0
    }

    /// Ventilation flow left after heat recovery (m³/s).
    ///
    /// `override_ach` replaces the mechanical flow for one timestep.
    pub fn effective_ventilation_flow_m3_s(&self, override_ach: Option<f64>) -> f64 {
        let supply = override_ach
            .map(|ach| self.ach_to_flow_m3_s(ach))
            .unwrap_or(self.ventilation_flow_m3_s);
        supply * (1.0 - self.heat_recovery_effectiveness)
    }
}
