//! Timestamp-indexed outdoor weather observations.
//!
//! Solar position and irradiance splitting happen upstream; this module only
//! holds the already-prepared table and enforces its ordering invariants.

use chrono::{Duration, NaiveDateTime};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::ValidationError;

/// Named weather columns, used in validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum WeatherColumn {
    Timestamp,
    OutdoorTemperatureC,
    DirectIrradianceWm2,
    DiffuseIrradianceWm2,
    SolarZenithDeg,
    SolarAzimuthDeg,
    LongwaveIrradianceWm2,
    GroundTemperatureC,
}

impl WeatherColumn {
    fn missing(self) -> ValidationError {
        ValidationError::MissingColumn {
            column: self.to_string(),
        }
    }
}

/// One weather observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub timestamp: NaiveDateTime,
    pub outdoor_temperature_c: f64,
    /// Direct-beam (normal) irradiance in W/m²
    pub direct_irradiance_wm2: f64,
    /// Diffuse-horizontal irradiance in W/m²
    pub diffuse_irradiance_wm2: f64,
    /// Solar zenith angle in degrees (> 90 = below horizon)
    pub solar_zenith_deg: f64,
    /// Solar azimuth in degrees, same reference as surface azimuths
    pub solar_azimuth_deg: f64,
    #[serde(default)]
    pub longwave_irradiance_wm2: Option<f64>,
    #[serde(default)]
    pub ground_temperature_c: Option<f64>,
}

/// Validated weather series: non-empty, strictly increasing, fixed cadence.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTable {
    samples: Vec<WeatherSample>,
    cadence: Option<Duration>,
}

impl WeatherTable {
    pub fn new(samples: Vec<WeatherSample>) -> Result<Self, ValidationError> {
        if samples.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        for (index, s) in samples.iter().enumerate() {
            let required = [
                (WeatherColumn::OutdoorTemperatureC, s.outdoor_temperature_c),
                (WeatherColumn::DirectIrradianceWm2, s.direct_irradiance_wm2),
                (WeatherColumn::DiffuseIrradianceWm2, s.diffuse_irradiance_wm2),
                (WeatherColumn::SolarZenithDeg, s.solar_zenith_deg),
                (WeatherColumn::SolarAzimuthDeg, s.solar_azimuth_deg),
            ];
            if let Some((column, _)) = required.iter().find(|(_, v)| !v.is_finite()) {
                return Err(ValidationError::NonFinite {
                    column: column.to_string(),
                    index,
                });
            }
        }

        // A single sample has no cadence of its own.
        let cadence = match samples.as_slice() {
            [first, second, ..] => Some(second.timestamp - first.timestamp),
            _ => None,
        };

        for (index, (prev, next)) in samples.iter().tuple_windows().enumerate() {
            let step = next.timestamp - prev.timestamp;
            if step <= Duration::zero() {
                return Err(ValidationError::NonMonotonic { index: index + 1 });
            }
            let cadence = cadence.unwrap_or(step);
            if step != cadence {
                return Err(ValidationError::IrregularCadence {
                    index: index + 1,
                    expected_s: cadence.num_seconds(),
                    found_s: step.num_seconds(),
                });
            }
        }

        Ok(Self { samples, cadence })
    }

    pub fn samples(&self) -> &[WeatherSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Spacing between rows; `None` for a single row whose cadence was not
    /// supplied through [`WeatherTable::with_cadence`].
    pub fn cadence(&self) -> Option<Duration> {
        self.cadence
    }

    /// Declares the cadence explicitly. A table of two or more rows keeps its
    /// own spacing and only accepts a matching value.
    pub fn with_cadence(mut self, cadence: Duration) -> Result<Self, ValidationError> {
        if cadence <= Duration::zero() {
            return Err(ValidationError::InvalidCadence {
                minutes: cadence.num_minutes(),
            });
        }
        match self.cadence {
            Some(own) if own != cadence => Err(ValidationError::CadenceMismatch {
                expected_s: cadence.num_seconds(),
                found_s: own.num_seconds(),
            }),
            _ => {
                self.cadence = Some(cadence);
                Ok(self)
            }
        }
    }

    pub fn outdoor_temperature(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.outdoor_temperature_c).collect()
    }

    /// Ground temperature for every row, or the column error if any row lacks it.
    pub fn require_ground_temperature(&self) -> Result<Vec<f64>, ValidationError> {
        self.samples
            .iter()
            .map(|s| {
                s.ground_temperature_c
                    .ok_or_else(|| WeatherColumn::GroundTemperatureC.missing())
            })
            .collect()
    }
}

/// Column-oriented weather record as produced by upstream loaders.
///
/// Every column is optional so that an absent required column can be reported
/// by name rather than as a generic deserialisation failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherColumns {
    pub timestamp: Option<Vec<NaiveDateTime>>,
    pub outdoor_temperature_c: Option<Vec<f64>>,
    pub direct_irradiance_wm2: Option<Vec<f64>>,
    pub diffuse_irradiance_wm2: Option<Vec<f64>>,
    pub solar_zenith_deg: Option<Vec<f64>>,
    pub solar_azimuth_deg: Option<Vec<f64>>,
    pub longwave_irradiance_wm2: Option<Vec<f64>>,
    pub ground_temperature_c: Option<Vec<f64>>,
    /// Row spacing, needed only when the table has a single row
    pub cadence_minutes: Option<i64>,
}

impl WeatherColumns {
    pub fn into_table(self) -> Result<WeatherTable, ValidationError> {
        let timestamp = self.timestamp.ok_or_else(|| WeatherColumn::Timestamp.missing())?;
        let n = timestamp.len();

        let required = |column: WeatherColumn, values: Option<Vec<f64>>| {
            let values = values.ok_or_else(|| column.missing())?;
            check_len(column, n, &values)?;
            Ok::<_, ValidationError>(values)
        };
        let optional = |column: WeatherColumn, values: Option<Vec<f64>>| {
            if let Some(values) = &values {
                check_len(column, n, values)?;
            }
            Ok::<_, ValidationError>(values)
        };

        let outdoor = required(WeatherColumn::OutdoorTemperatureC, self.outdoor_temperature_c)?;
        let direct = required(WeatherColumn::DirectIrradianceWm2, self.direct_irradiance_wm2)?;
        let diffuse = required(WeatherColumn::DiffuseIrradianceWm2, self.diffuse_irradiance_wm2)?;
        let zenith = required(WeatherColumn::SolarZenithDeg, self.solar_zenith_deg)?;
        let azimuth = required(WeatherColumn::SolarAzimuthDeg, self.solar_azimuth_deg)?;
        let longwave = optional(WeatherColumn::LongwaveIrradianceWm2, self.longwave_irradiance_wm2)?;
        let ground = optional(WeatherColumn::GroundTemperatureC, self.ground_temperature_c)?;

        let samples = (0..n)
            .map(|i| WeatherSample {
                timestamp: timestamp[i],
                outdoor_temperature_c: outdoor[i],
                direct_irradiance_wm2: direct[i],
                diffuse_irradiance_wm2: diffuse[i],
                solar_zenith_deg: zenith[i],
                solar_azimuth_deg: azimuth[i],
                longwave_irradiance_wm2: longwave.as_ref().map(|v| v[i]),
                ground_temperature_c: ground.as_ref().map(|v| v[i]),
            })
            .collect();

        let table = WeatherTable::new(samples)?;
        match self.cadence_minutes {
            Some(minutes) => {
                let cadence = Duration::try_minutes(minutes)
                    .ok_or(ValidationError::InvalidCadence { minutes })?;
                table.with_cadence(cadence)
            }
            None => Ok(table),
        }
    }
}

fn check_len(column: WeatherColumn, expected: usize, values: &[f64]) -> Result<(), ValidationError> {
    if values.len() != expected {
        return Err(ValidationError::LengthMismatch {
            name: column.to_string(),
            expected,
            found: values.len(),
        });
    }
    Ok(())
}
