use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ConfigurationError;

/// Named internal heat gains, each in kW.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InternalGains {
    components_kw: BTreeMap<String, f64>,
}

impl InternalGains {
    pub fn new(components_kw: BTreeMap<String, f64>) -> Result<Self, ConfigurationError> {
        let gains = Self { components_kw };
        gains.validate()?;
        Ok(gains)
    }

    /// Equipment, occupant and lighting gains in kW.
    pub fn standard(equipment_kw: f64, occupants_kw: f64, lighting_kw: f64) -> Result<Self, ConfigurationError> {
        Self::new(BTreeMap::from([
            ("equipment".to_string(), equipment_kw),
            ("occupants".to_string(), occupants_kw),
            ("lighting".to_string(), lighting_kw),
        ]))
    }

    /// Single lumped gain in kW.
    pub fn scalar(total_kw: f64) -> Result<Self, ConfigurationError> {
        Self::new(BTreeMap::from([("total".to_string(), total_kw)]))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, &kw) in &self.components_kw {
            if !(kw >= 0.0) || !kw.is_finite() {
                return Err(ConfigurationError::out_of_range(
                    "internal_gains",
                    name,
                    kw,
                    0.0,
                    f64::INFINITY,
                ));
            }
        }
        Ok(())
    }

    pub fn components_kw(&self) -> &BTreeMap<String, f64> {
        &self.components_kw
    }

    pub fn total_kw(&self) -> f64 {
        self.components_kw.values().sum()
    }

    pub fn total_w(&self) -> f64 {
        self.total_kw() * 1000.0
    }
}
