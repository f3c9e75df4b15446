//! # Solar Geometry
//!
//! Incidence angle and plane-of-array irradiance from a precomputed solar
//! position and the horizontal irradiance split. All angles are in degrees;
//! sun and surface azimuths share one reference (0 = north, 90 = east).

use crate::domain::{Orientation, WeatherSample, WeatherTable};

/// Cosine of the angle between the sun direction and the plane normal.
///
/// Unclipped: negative values mean the sun is behind the plane.
pub fn cos_incidence(
    zenith_deg: f64,
    sun_azimuth_deg: f64,
    tilt_deg: f64,
    surface_azimuth_deg: f64,
) -> f64 {
    let zenith = zenith_deg.to_radians();
    let tilt = tilt_deg.to_radians();
    let azimuth_diff = (sun_azimuth_deg - surface_azimuth_deg).to_radians();

    zenith.sin() * tilt.sin() * azimuth_diff.cos() + zenith.cos() * tilt.cos()
}

/// Fraction of the isotropic sky dome seen by a plane, (1 + cos tilt) / 2.
pub fn sky_view_factor(tilt_deg: f64) -> f64 {
    (1.0 + tilt_deg.to_radians().cos()) / 2.0
}

/// Total irradiance on a tilted plane in W/m².
///
/// Beam is dropped when the sun is behind the plane; diffuse uses the
/// isotropic sky view factor.
pub fn irradiance_on_plane(
    direct_wm2: f64,
    diffuse_wm2: f64,
    cos_incidence: f64,
    tilt_deg: f64,
) -> f64 {
    let beam = (direct_wm2 * cos_incidence.max(0.0)).max(0.0);
    beam + diffuse_wm2 * sky_view_factor(tilt_deg)
}

/// Plane irradiance for one weather sample. A sun at or below the horizon
/// contributes no beam.
pub fn sample_irradiance(sample: &WeatherSample, orientation: Orientation) -> f64 {
    let cos_i = if sample.solar_zenith_deg >= 90.0 {
        0.0
    } else {
        cos_incidence(
            sample.solar_zenith_deg,
            sample.solar_azimuth_deg,
            orientation.tilt_deg,
            orientation.azimuth_deg,
        )
    };
    irradiance_on_plane(
        sample.direct_irradiance_wm2,
        sample.diffuse_irradiance_wm2,
        cos_i,
        orientation.tilt_deg,
    )
}

/// Plane irradiance for every row of the weather table.
pub fn plane_irradiance_series(weather: &WeatherTable, orientation: Orientation) -> Vec<f64> {
    weather
        .samples()
        .iter()
        .map(|s| sample_irradiance(s, orientation))
        .collect()
}
