use super::fixtures::{dark_sample, dark_weather, sealed_air, small_house, sunny_weather, t0, ventilated_air};
use chrono::Duration;
use heatload::config::EngineConfig;
use heatload::domain::{InternalGains, Orientation, Plane, WeatherSample, WeatherTable};
use heatload::error::{EngineError, ValidationError};
use heatload::simulation::{run_steady_state, HeatingPolicy, SteadyStateInput};

#[test]
fn single_wall_no_sun_no_air() {
    let wall = Plane::opaque("Wall-N", 10.0, Orientation::vertical(0.0), 0.3, 0.6, 0.9).unwrap();
    let input = SteadyStateInput::new(dark_weather(&[0.0; 24], Duration::hours(1)), vec![wall], sealed_air(), 20.0);

    let table = run_steady_state(&input, &EngineConfig::default()).unwrap();

    assert_eq!(table.len(), 24);
    assert_eq!(table.timestep_s, Some(3600));
    for r in &table.records {
        assert!((r.heating_demand_w - 60.0).abs() < 1e-9);
        assert!((r.heating.walls_w - 60.0).abs() < 1e-9);
        assert_eq!(r.heating.air_exchange_w(), 0.0);
        assert!(r.cooling_demand_w.is_none());
    }
}

#[test]
fn no_demand_when_outdoors_matches_setpoint() {
    let planes: Vec<Plane> = small_house()
        .into_iter()
        .filter(|p| !p.is_ground_coupled())
        .collect();
    let input = SteadyStateInput::new(dark_weather(&[20.0; 48], Duration::hours(1)), planes, ventilated_air(), 20.0)
        .with_heating_policy(HeatingPolicy::CreditGains);

    let table = run_steady_state(&input, &EngineConfig::default()).unwrap();

    assert!(table.records.iter().all(|r| r.heating_demand_w == 0.0));
    assert!(table.records.iter().all(|r| r.heating.losses_w() == 0.0));
}

#[test]
fn repeated_runs_are_identical() {
    let gains = InternalGains::standard(0.4, 0.3, 0.1).unwrap();
    let input = SteadyStateInput::new(sunny_weather(3, Duration::hours(1)), small_house(), ventilated_air(), 20.0)
        .with_cooling_setpoint(24.0)
        .with_gains(gains);
    let config = EngineConfig::default();

    let first = run_steady_state(&input, &config).unwrap();
    let second = run_steady_state(&input, &config).unwrap();

    assert_eq!(first, second);
}

#[test]
fn credited_gains_never_exceed_conservative_demand() {
    let gains = InternalGains::scalar(0.5).unwrap();
    let weather = sunny_weather(2, Duration::hours(1));
    let config = EngineConfig::default();
    let base = SteadyStateInput::new(weather, small_house(), ventilated_air(), 20.0)
        .with_cooling_setpoint(24.0)
        .with_gains(gains);

    let conservative = run_steady_state(&base, &config).unwrap();
    let credited = run_steady_state(&base.clone().with_heating_policy(HeatingPolicy::CreditGains), &config).unwrap();

    for (c, g) in conservative.records.iter().zip(&credited.records) {
        assert!(g.heating_demand_w >= 0.0);
        assert!(g.heating_demand_w <= c.heating_demand_w + 1e-9);
        assert!(c.cooling_demand_w.unwrap() >= 0.0);
    }
    // Daytime sun on the south window shows up as a gain.
    assert!(credited.records.iter().any(|r| r.heating.solar_w > 0.0));
}

#[test]
fn ground_plane_requires_ground_temperature() {
    let weather = WeatherTable::new(
        (0..6)
            .map(|h| WeatherSample {
                ground_temperature_c: None,
                ..dark_sample(t0() + Duration::hours(h), 0.0)
            })
            .collect(),
    )
    .unwrap();
    let input = SteadyStateInput::new(weather, small_house(), sealed_air(), 20.0);

    let err = run_steady_state(&input, &EngineConfig::default()).unwrap_err();

    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::MissingColumn { ref column }) if column == "ground_temperature_c"
    ));
}
