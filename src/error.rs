//! Error taxonomy for the heat-balance engines.
//!
//! Every fallible engine call fails fast with an [`EngineError`] before any
//! result row is produced. Non-fatal numerical conditions are reported as
//! [`NumericalWarning`]s inside the result table instead.

use serde::Serialize;
use thiserror::Error;

/// Problems with the weather table or time-aligned input arrays.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Missing weather column: {column}")]
    MissingColumn { column: String },

    #[error("Weather series is empty")]
    EmptySeries,

    #[error("Timestamps not strictly increasing at row {index}")]
    NonMonotonic { index: usize },

    #[error("Irregular cadence at row {index}: expected {expected_s}s, found {found_s}s")]
    IrregularCadence {
        index: usize,
        expected_s: i64,
        found_s: i64,
    },

    #[error("Length mismatch for {name}: expected {expected}, found {found}")]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Non-finite value in column {column} at row {index}")]
    NonFinite { column: String, index: usize },

    #[error("Weather cadence {found_s}s does not match engine timestep {expected_s}s")]
    CadenceMismatch { expected_s: i64, found_s: i64 },

    #[error("Cadence must be a positive number of minutes (got {minutes})")]
    InvalidCadence { minutes: i64 },

    #[error("Cadence {cadence_s}s is not a whole multiple of timestep {timestep_s}s")]
    IncompatibleTimestep { cadence_s: i64, timestep_s: i64 },
}

/// Problems with the envelope, air-side or gains description.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("Plane '{plane}' is missing required property '{property}'")]
    MissingProperty { plane: String, property: String },

    #[error("{entity}: {property} must be positive (got {value})")]
    NonPositive {
        entity: String,
        property: String,
        value: f64,
    },

    #[error("{entity}: {property} = {value} outside [{min}, {max}]")]
    OutOfRange {
        entity: String,
        property: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Timestep must be positive (got {minutes} min)")]
    NonPositiveTimestep { minutes: i64 },

    #[error("Duplicate surface id: {id}")]
    DuplicateId { id: String },

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),
}

impl ConfigurationError {
    pub(crate) fn missing(plane: &str, property: &str) -> Self {
        Self::MissingProperty {
            plane: plane.to_string(),
            property: property.to_string(),
        }
    }

    pub(crate) fn non_positive(entity: &str, property: &str, value: f64) -> Self {
        Self::NonPositive {
            entity: entity.to_string(),
            property: property.to_string(),
            value,
        }
    }

    pub(crate) fn out_of_range(entity: &str, property: &str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            entity: entity.to_string(),
            property: property.to_string(),
            value,
            min,
            max,
        }
    }
}

/// Single error type returned at the engine boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Air-exchange path that may carry zero flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AirPath {
    Infiltration,
    Ventilation,
}

/// Non-fatal numerical conditions detected while running an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NumericalWarning {
    /// Zero airflow: the path's resistance is taken as infinite, so it
    /// contributes no heat exchange.
    #[error("Zero {path} airflow: infinite resistance substituted")]
    ZeroAirflow { path: AirPath },

    /// The trapezoidal recurrence stays stable above this limit but its
    /// response oscillates around the forcing instead of approaching it
    /// monotonically.
    #[error("Node '{node}': timestep {timestep_s}s exceeds damping limit {limit_s:.0}s")]
    TimestepExceedsDampingLimit {
        node: String,
        timestep_s: f64,
        limit_s: f64,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_property_names_plane_and_property() {
        let err = ConfigurationError::missing("Wall-N", "absorptance");
        assert_eq!(
            err.to_string(),
            "Plane 'Wall-N' is missing required property 'absorptance'"
        );
    }

    #[test]
    fn test_engine_error_is_transparent() {
        let err: EngineError = ValidationError::MissingColumn {
            column: "solar_zenith_deg".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Missing weather column: solar_zenith_deg");
    }

    #[test]
    fn test_warning_display() {
        let warning = NumericalWarning::ZeroAirflow {
            path: AirPath::Ventilation,
        };
        assert_eq!(
            warning.to_string(),
            "Zero ventilation airflow: infinite resistance substituted"
        );
    }
}
