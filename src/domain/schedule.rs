use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, EngineError, ValidationError};

/// A per-timestep input: either one value for every step or an explicit series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Constant(f64),
    Series(Vec<f64>),
}

impl From<f64> for Schedule {
    fn from(value: f64) -> Self {
        Schedule::Constant(value)
    }
}

impl From<Vec<f64>> for Schedule {
    fn from(values: Vec<f64>) -> Self {
        Schedule::Series(values)
    }
}

impl Schedule {
    /// Expands to exactly `len` values, checking series length and finiteness.
    pub fn resolve(&self, name: &str, len: usize) -> Result<Vec<f64>, ValidationError> {
        let values = match self {
            Schedule::Constant(v) => vec![*v; len],
            Schedule::Series(values) => {
                if values.len() != len {
                    return Err(ValidationError::LengthMismatch {
                        name: name.to_string(),
                        expected: len,
                        found: values.len(),
                    });
                }
                values.clone()
            }
        };
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite {
                column: name.to_string(),
                index,
            });
        }
        Ok(values)
    }

    /// [`Schedule::resolve`] for rates and gains, which may not go negative.
    pub fn resolve_non_negative(&self, name: &str, len: usize) -> Result<Vec<f64>, EngineError> {
        let values = self.resolve(name, len)?;
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| **v < 0.0) {
            return Err(ConfigurationError::out_of_range(
                name,
                &format!("value at row {index}"),
                value,
                0.0,
                f64::INFINITY,
            )
            .into());
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_expands() {
        assert_eq!(Schedule::from(21.0).resolve("setpoint", 3).unwrap(), vec![21.0; 3]);
    }

    #[test]
    fn test_series_length_checked() {
        let err = Schedule::from(vec![20.0, 21.0]).resolve("setpoint", 3).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LengthMismatch {
                name: "setpoint".into(),
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = Schedule::from(vec![0.5, -5.0])
            .resolve_non_negative("ventilation_rate", 2)
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::Configuration(ConfigurationError::OutOfRange {
                entity: "ventilation_rate".into(),
                property: "value at row 1".into(),
                value: -5.0,
                min: 0.0,
                max: f64::INFINITY,
            })
        );
        assert_eq!(Schedule::from(0.0).resolve_non_negative("ventilation_rate", 2).unwrap(), vec![0.0; 2]);
    }

    #[test]
    fn test_non_finite_rejected() {
        let err = Schedule::from(vec![20.0, f64::NAN]).resolve("setpoint", 2).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { index: 1, .. }));
    }
}
