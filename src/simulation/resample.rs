//! Linear upsampling of weather and schedules to the RC engine timestep.
//!
//! Only refinement by a whole factor is supported. The output starts at the
//! first input timestamp and ends at the last one; nothing is extrapolated.

use chrono::Duration;
use itertools::Itertools;

use crate::domain::{Schedule, WeatherSample, WeatherTable};
use crate::error::ValidationError;

/// Number of output steps per input step.
pub fn resample_factor(cadence: Duration, step: Duration) -> Result<usize, ValidationError> {
    let (cadence_s, step_s) = (cadence.num_seconds(), step.num_seconds());
    if step_s <= 0 || cadence_s % step_s != 0 {
        return Err(ValidationError::IncompatibleTimestep {
            cadence_s,
            timestep_s: step_s,
        });
    }
    Ok((cadence_s / step_s) as usize)
}

fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a + (b - a) * frac
}

/// Interpolates along the shorter arc so 350° → 10° passes through north.
fn lerp_azimuth(a: f64, b: f64, frac: f64) -> f64 {
    let delta = (b - a + 540.0).rem_euclid(360.0) - 180.0;
    (a + delta * frac).rem_euclid(360.0)
}

fn lerp_option(a: Option<f64>, b: Option<f64>, frac: f64) -> Option<f64> {
    Some(lerp(a?, b?, frac))
}

fn interpolate(a: &WeatherSample, b: &WeatherSample, frac: f64, step: Duration, k: i32) -> WeatherSample {
    WeatherSample {
        timestamp: a.timestamp + step * k,
        outdoor_temperature_c: lerp(a.outdoor_temperature_c, b.outdoor_temperature_c, frac),
        direct_irradiance_wm2: lerp(a.direct_irradiance_wm2, b.direct_irradiance_wm2, frac),
        diffuse_irradiance_wm2: lerp(a.diffuse_irradiance_wm2, b.diffuse_irradiance_wm2, frac),
        solar_zenith_deg: lerp(a.solar_zenith_deg, b.solar_zenith_deg, frac),
        solar_azimuth_deg: lerp_azimuth(a.solar_azimuth_deg, b.solar_azimuth_deg, frac),
        longwave_irradiance_wm2: lerp_option(a.longwave_irradiance_wm2, b.longwave_irradiance_wm2, frac),
        ground_temperature_c: lerp_option(a.ground_temperature_c, b.ground_temperature_c, frac),
    }
}

/// Weather table at `step` cadence, linearly interpolated between rows. A
/// single row is kept as is and takes `step` as its cadence.
pub fn resample_weather(weather: &WeatherTable, step: Duration) -> Result<WeatherTable, ValidationError> {
    let Some(cadence) = weather.cadence() else {
        return weather.clone().with_cadence(step);
    };
    let factor = resample_factor(cadence, step)?;
    if factor == 1 {
        return Ok(weather.clone());
    }

    let samples = weather.samples();
    let mut out = Vec::with_capacity((samples.len() - 1) * factor + 1);
    for (a, b) in samples.iter().tuple_windows() {
        for k in 0..factor {
            let frac = k as f64 / factor as f64;
            out.push(interpolate(a, b, frac, step, k as i32));
        }
    }
    if let Some(last) = samples.last() {
        out.push(*last);
    }
    WeatherTable::new(out)
}

/// Linear upsampling of a per-step series by a whole factor.
pub fn upsample_series(values: &[f64], factor: usize) -> Vec<f64> {
    if factor <= 1 || values.len() < 2 {
        return values.to_vec();
    }
    let mut out = Vec::with_capacity((values.len() - 1) * factor + 1);
    for (&a, &b) in values.iter().tuple_windows() {
        out.extend((0..factor).map(|k| lerp(a, b, k as f64 / factor as f64)));
    }
    out.extend(values.last());
    out
}

/// Upsampled schedule; constants pass through unchanged.
pub fn upsample_schedule(schedule: &Schedule, factor: usize) -> Schedule {
    match schedule {
        Schedule::Constant(v) => Schedule::Constant(*v),
        Schedule::Series(values) => Schedule::Series(upsample_series(values, factor)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(hour: i64, temp: f64, azimuth: f64) -> WeatherSample {
        WeatherSample {
            timestamp: NaiveDate::from_ymd_opt(2021, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + Duration::hours(hour),
            outdoor_temperature_c: temp,
            direct_irradiance_wm2: 0.0,
            diffuse_irradiance_wm2: 0.0,
            solar_zenith_deg: 100.0,
            solar_azimuth_deg: azimuth,
            longwave_irradiance_wm2: None,
            ground_temperature_c: Some(temp),
        }
    }

    #[test]
    fn test_hourly_to_quarter_hourly() {
        let table = WeatherTable::new(vec![sample(0, 0.0, 90.0), sample(1, 4.0, 100.0), sample(2, 8.0, 110.0)]).unwrap();
        let fine = resample_weather(&table, Duration::minutes(15)).unwrap();

        assert_eq!(fine.len(), 9);
        assert_eq!(fine.cadence(), Some(Duration::minutes(15)));
        assert_eq!(
            fine.outdoor_temperature(),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]
        );
        assert_eq!(fine.samples()[2].ground_temperature_c, Some(2.0));
        assert!((fine.samples()[6].solar_azimuth_deg - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_azimuth_wraps_through_north() {
        assert!((lerp_azimuth(350.0, 10.0, 0.5) - 0.0).abs() < 1e-9);
        assert!((lerp_azimuth(10.0, 350.0, 0.25) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_step_rejected() {
        assert_eq!(
            resample_factor(Duration::hours(1), Duration::minutes(25)),
            Err(ValidationError::IncompatibleTimestep {
                cadence_s: 3600,
                timestep_s: 1500
            })
        );
        assert!(resample_factor(Duration::hours(1), Duration::zero()).is_err());
        assert_eq!(resample_factor(Duration::hours(1), Duration::minutes(15)), Ok(4));
    }

    #[test]
    fn test_same_cadence_is_identity() {
        let table = WeatherTable::new(vec![sample(0, 0.0, 90.0), sample(1, 4.0, 100.0)]).unwrap();
        assert_eq!(resample_weather(&table, Duration::hours(1)).unwrap(), table);
    }

    #[test]
    fn test_single_row_takes_step_as_cadence() {
        let table = WeatherTable::new(vec![sample(0, 3.0, 90.0)]).unwrap();
        let fine = resample_weather(&table, Duration::minutes(15)).unwrap();
        assert_eq!(fine.len(), 1);
        assert_eq!(fine.cadence(), Some(Duration::minutes(15)));
    }

    #[test]
    fn test_upsample_series() {
        assert_eq!(upsample_series(&[20.0, 22.0], 2), vec![20.0, 21.0, 22.0]);
        assert_eq!(upsample_series(&[20.0], 4), vec![20.0]);
        assert_eq!(
            upsample_schedule(&Schedule::Constant(21.0), 4),
            Schedule::Constant(21.0)
        );
    }
}
