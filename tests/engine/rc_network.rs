use super::fixtures::{dark_weather, sealed_air, sinusoid, sunny_weather};
use chrono::Duration;
use heatload::config::EngineConfig;
use heatload::NumericalWarning;
use heatload::domain::{Circuit, EnvelopeAssembly, Orientation, SurfaceClass, ThermalMassNode, WeatherTable};
use heatload::simulation::{resample_weather, run_batch, run_rc_network, NamedScenario, RcNetworkInput, Scenario};
use std::f64::consts::PI;

fn quarter_hour() -> Duration {
    Duration::minutes(15)
}

fn wall(id: &str, capacitance_j_k: f64, circuit: Circuit) -> ThermalMassNode {
    ThermalMassNode::new(id, SurfaceClass::Wall, Orientation::vertical(180.0), 20.0, 0.6, capacitance_j_k, circuit)
        .unwrap()
}

fn single_node(weather: WeatherTable, node: ThermalMassNode, setpoint: f64) -> RcNetworkInput {
    let assembly = EnvelopeAssembly::new(vec![node], vec![]).unwrap();
    RcNetworkInput::new(weather, assembly, sealed_air(), setpoint)
}

#[test]
fn mass_settles_without_overshoot() {
    let weather = dark_weather(&[20.0; 960], quarter_hour());
    let circuits = [
        Circuit::TwoResistor { r1: 0.01, r2: 0.01 },
        Circuit::TwoResistor { r1: 0.002, r2: 0.018 },
        Circuit::ThreeResistor {
            r1: 0.01,
            r2: 0.008,
            r3: 0.002,
        },
    ];

    for circuit in circuits {
        let input = single_node(weather.clone(), wall("Wall-S", 1e6, circuit), 20.0).with_initial_mass_temperature(10.0);
        let table = run_rc_network(&input, &EngineConfig::default()).unwrap();
        let mass = table.mass_temperature_series("Wall-S").unwrap();

        assert_eq!(mass[0], 10.0);
        for pair in mass.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-12, "{circuit:?} not monotonic");
        }
        assert!(mass.iter().all(|&t| t <= 20.0 + 1e-9), "{circuit:?} overshoots");
        assert!((mass[mass.len() - 1] - 20.0).abs() < 0.01);
    }
}

#[test]
fn daily_cycle_amplitude_matches_analytic_response() {
    let (r1, r2, capacitance) = (0.01, 0.01, 1e7);
    let outdoor = sinusoid(0.0, 10.0, Duration::days(1), 10, quarter_hour());
    let input = single_node(
        dark_weather(&outdoor, quarter_hour()),
        wall("Wall-S", capacitance, Circuit::TwoResistor { r1, r2 }),
        0.0,
    );

    let table = run_rc_network(&input, &EngineConfig::default()).unwrap();

    let last_day: Vec<f64> = table.records[9 * 96..].iter().map(|r| r.heating.walls_w).collect();
    let max = last_day.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = last_day.iter().copied().fold(f64::INFINITY, f64::min);
    let simulated = (max - min) / 2.0;

    let omega = 2.0 * PI / 86_400.0;
    let conductance = 1.0 / r1 + 1.0 / r2;
    let analytic = 10.0 / (r1 * r2) / (conductance.powi(2) + (omega * capacitance).powi(2)).sqrt();

    assert!(
        (simulated - analytic).abs() / analytic < 0.02,
        "simulated {simulated:.2} W vs analytic {analytic:.2} W"
    );
}

#[test]
fn heavier_mass_lowers_peak_demand() {
    let outdoor = sinusoid(0.0, 10.0, Duration::days(1), 10, quarter_hour());
    let weather = dark_weather(&outdoor, quarter_hour());
    let config = EngineConfig::default();

    let peaks: Vec<f64> = [1e5, 1e6, 1e7]
        .iter()
        .map(|&c| {
            let input = single_node(weather.clone(), wall("Wall-S", c, Circuit::TwoResistor { r1: 0.01, r2: 0.01 }), 20.0);
            let table = run_rc_network(&input, &config).unwrap();
            assert!(!table
                .warnings
                .iter()
                .any(|w| matches!(w, NumericalWarning::TimestepExceedsDampingLimit { .. })));
            table
                .after_warmup(config.rc.warmup())
                .iter()
                .map(|r| r.heating_demand_w)
                .fold(0.0, f64::max)
        })
        .collect();

    assert!(peaks[0] > peaks[1], "{peaks:?}");
    assert!(peaks[1] > peaks[2], "{peaks:?}");
}

#[test]
fn three_resistor_matches_two_resistor_with_equivalent_film() {
    let weather = sunny_weather(4, quarter_hour());
    let (r1, r2, r3) = (0.01, 0.008, 0.002);
    let mut config = EngineConfig::default();
    // 1 / (r3 · A)
    config.physics.exterior_film_coefficient_w_m2k = 25.0;

    let two = run_rc_network(
        &single_node(weather.clone(), wall("Wall-S", 2e6, Circuit::TwoResistor { r1, r2: r2 + r3 }), 20.0),
        &config,
    )
    .unwrap();
    let three = run_rc_network(
        &single_node(weather, wall("Wall-S", 2e6, Circuit::ThreeResistor { r1, r2, r3 }), 20.0),
        &config,
    )
    .unwrap();

    for (a, b) in two.records.iter().zip(&three.records) {
        assert!((a.mass_temperatures_c[0] - b.mass_temperatures_c[0]).abs() < 1e-9);
        assert!((a.heating_demand_w - b.heating_demand_w).abs() < 1e-6);
    }
    let surface_two = two.exterior_temperature_series("Wall-S").unwrap();
    let surface_three = three.exterior_temperature_series("Wall-S").unwrap();
    assert_eq!(surface_two.len(), two.len());
    for (a, b) in surface_two.iter().zip(&surface_three) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn batch_matches_individual_runs() {
    let config = EngineConfig::default();
    let weather = sunny_weather(3, quarter_hour());
    let inputs: Vec<RcNetworkInput> = [5e5, 5e6]
        .iter()
        .map(|&c| single_node(weather.clone(), wall("Wall-S", c, Circuit::split_evenly(0.02)), 21.0))
        .collect();

    let scenarios: Vec<NamedScenario> = inputs
        .iter()
        .enumerate()
        .map(|(k, input)| NamedScenario::new(format!("c{k}"), Scenario::RcNetwork(input.clone())))
        .collect();
    let outcomes = run_batch(&scenarios, &config);

    for (input, outcome) in inputs.iter().zip(&outcomes) {
        let alone = run_rc_network(input, &config).unwrap();
        assert_eq!(outcome.result().unwrap(), &alone);
    }
}

#[test]
fn hourly_weather_runs_after_resampling() {
    let hourly = sunny_weather(3, Duration::hours(1));
    let weather = resample_weather(&hourly, quarter_hour()).unwrap();
    assert_eq!(weather.len(), (hourly.len() - 1) * 4 + 1);

    let input = single_node(weather, wall("Wall-S", 1e6, Circuit::split_evenly(0.02)), 20.0);
    let table = run_rc_network(&input, &EngineConfig::default()).unwrap();

    assert_eq!(table.timestep_s, Some(900));
    assert!(table.records.iter().all(|r| r.heating_demand_w >= 0.0));
}
