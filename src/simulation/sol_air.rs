//! Sol-air temperature of opaque surfaces.
//!
//! Longwave exchange with the sky is neglected, so the sol-air temperature is
//! never below the outdoor air temperature.

use crate::domain::Boundary;

/// T_out + α·I / h_e
pub fn sol_air_temperature(
    outdoor_temperature_c: f64,
    plane_irradiance_wm2: f64,
    absorptance: f64,
    film_coefficient_w_m2k: f64,
) -> f64 {
    outdoor_temperature_c + absorptance * plane_irradiance_wm2 / film_coefficient_w_m2k
}

/// Exterior boundary temperature of an opaque plane for one timestep.
///
/// Ground-coupled planes take the ground temperature directly.
pub fn boundary_temperature(
    boundary: &Boundary,
    outdoor_temperature_c: f64,
    plane_irradiance_wm2: f64,
    ground_temperature_c: f64,
    film_coefficient_w_m2k: f64,
) -> f64 {
    match *boundary {
        Boundary::Exposed { absorptance, .. } => sol_air_temperature(
            outdoor_temperature_c,
            plane_irradiance_wm2,
            absorptance,
            film_coefficient_w_m2k,
        ),
        Boundary::GroundCoupled => ground_temperature_c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_sun_equals_outdoor() {
        assert_eq!(sol_air_temperature(-3.0, 0.0, 0.6, 25.0), -3.0);
    }

    #[test]
    fn test_absorbed_radiation_raises_temperature() {
        // 0.7 * 500 / 23 = 15.2 K
        let t = sol_air_temperature(10.0, 500.0, 0.7, 23.0);
        assert!((t - (10.0 + 350.0 / 23.0)).abs() < 1e-12);
    }

    #[test]
    fn test_ground_boundary_ignores_sun() {
        let t = boundary_temperature(&Boundary::GroundCoupled, 30.0, 900.0, 8.0, 23.0);
        assert_eq!(t, 8.0);
        let exposed = Boundary::Exposed {
            absorptance: 0.5,
            emissivity: 0.9,
        };
        assert_eq!(boundary_temperature(&exposed, 30.0, 46.0, 8.0, 23.0), 31.0);
    }
}
