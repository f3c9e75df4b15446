use chrono::{Duration, NaiveDate, NaiveDateTime};
use heatload::domain::{AirSide, Orientation, Plane, WeatherSample, WeatherTable};
use std::f64::consts::PI;

pub fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2021, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn dark_sample(timestamp: NaiveDateTime, outdoor_c: f64) -> WeatherSample {
    WeatherSample {
        timestamp,
        outdoor_temperature_c: outdoor_c,
        direct_irradiance_wm2: 0.0,
        diffuse_irradiance_wm2: 0.0,
        solar_zenith_deg: 100.0,
        solar_azimuth_deg: 0.0,
        longwave_irradiance_wm2: None,
        ground_temperature_c: Some(8.0),
    }
}

/// Night-only weather with the given outdoor temperatures.
pub fn dark_weather(temps: &[f64], step: Duration) -> WeatherTable {
    WeatherTable::new(
        temps
            .iter()
            .enumerate()
            .map(|(k, &t)| dark_sample(t0() + step * k as i32, t))
            .collect(),
    )
    .unwrap()
}

/// mean + amplitude·sin(2πt/period), sampled every `step` for `days`.
pub fn sinusoid(mean: f64, amplitude: f64, period: Duration, days: i64, step: Duration) -> Vec<f64> {
    let n = (Duration::days(days).num_seconds() / step.num_seconds()) as usize;
    let period_s = period.num_seconds() as f64;
    (0..n)
        .map(|k| {
            let t = (k as i64 * step.num_seconds()) as f64;
            mean + amplitude * (2.0 * PI * t / period_s).sin()
        })
        .collect()
}

/// Clear days: a simple solar arc from 06:00 to 18:00, sun due south at noon.
pub fn sunny_weather(days: i64, step: Duration) -> WeatherTable {
    let n = Duration::days(days).num_seconds() / step.num_seconds();
    WeatherTable::new(
        (0..n)
            .map(|k| {
                let timestamp = t0() + Duration::seconds(k * step.num_seconds());
                let hour = (k * step.num_seconds() % 86_400) as f64 / 3600.0;
                let elevation = (PI * (hour - 6.0) / 12.0).sin().max(-0.2) * 40.0;
                let up = elevation > 0.0;
                WeatherSample {
                    timestamp,
                    outdoor_temperature_c: 2.0 + 6.0 * (PI * (hour - 9.0) / 12.0).sin(),
                    direct_irradiance_wm2: if up { 700.0 * elevation / 40.0 } else { 0.0 },
                    diffuse_irradiance_wm2: if up { 120.0 } else { 0.0 },
                    solar_zenith_deg: 90.0 - elevation,
                    solar_azimuth_deg: 90.0 + 15.0 * (hour - 6.0),
                    longwave_irradiance_wm2: None,
                    ground_temperature_c: Some(8.0),
                }
            })
            .collect(),
    )
    .unwrap()
}

pub fn sealed_air() -> AirSide {
    AirSide::new(300.0, 0.0, 0.0, 0.0).unwrap()
}

pub fn ventilated_air() -> AirSide {
    AirSide::new(300.0, 0.06, 0.75, 0.4).unwrap()
}

/// Four walls, a roof, a south window and a ground slab.
pub fn small_house() -> Vec<Plane> {
    let mut planes: Vec<Plane> = [(0.0, "N"), (90.0, "E"), (180.0, "S"), (270.0, "W")]
        .iter()
        .map(|&(az, name)| {
            Plane::opaque(format!("Wall-{name}"), 25.0, Orientation::vertical(az), 0.25, 0.6, 0.9).unwrap()
        })
        .collect();
    planes.push(Plane::opaque("Roof", 100.0, Orientation::new(30.0, 180.0), 0.15, 0.7, 0.9).unwrap());
    planes.push(Plane::window("Win-S", 8.0, Orientation::vertical(180.0), 1.1, 0.55, 0.9).unwrap());
    planes.push(Plane::ground_coupled("Slab", 100.0, Orientation::new(180.0, 0.0), 0.2).unwrap());
    planes
}
