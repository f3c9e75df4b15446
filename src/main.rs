use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use heatload::analysis::{relative_change, DemandSummary};
use heatload::config::EngineConfig;
use heatload::domain::{ResultTable, WeatherColumns, WeatherTable};
use heatload::scenario::ScenarioFile;
use heatload::simulation::{run_batch, NamedScenario, Scenario};
use heatload::telemetry::init_tracing;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "heatload")]
#[command(about = "Building heating and cooling demand from weather and envelope data", long_about = None)]
struct Cli {
    /// Engine configuration (TOML); HEATLOAD__* env vars override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs one scenario and prints its demand summary as JSON
    Run {
        /// Scenario file (TOML)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Column-oriented weather file (JSON)
        #[arg(short, long)]
        weather: PathBuf,

        #[arg(short, long, value_enum, default_value_t = EngineChoice::Steady)]
        engine: EngineChoice,

        /// Include every result row in the output
        #[arg(long)]
        full_table: bool,
    },
    /// Runs two scenarios in parallel and reports the change in heating energy
    Compare {
        #[arg(long)]
        baseline: PathBuf,

        #[arg(long)]
        variant: PathBuf,

        #[arg(short, long)]
        weather: PathBuf,

        #[arg(short, long, value_enum, default_value_t = EngineChoice::Rc)]
        engine: EngineChoice,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineChoice {
    Steady,
    Rc,
}

#[derive(Serialize)]
struct RunReport<'a> {
    scenario: &'a str,
    summary: DemandSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    specific_heating_kwh_m2: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    table: Option<&'a ResultTable>,
}

#[derive(Serialize)]
struct CompareReport {
    baseline: DemandSummary,
    variant: DemandSummary,
    relative_heating_change: Option<f64>,
}

fn load_weather(path: &Path) -> Result<WeatherTable> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read weather file {}", path.display()))?;
    let columns: WeatherColumns = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse weather file {}", path.display()))?;
    let table = columns.into_table()?;
    info!(rows = table.len(), cadence_s = table.cadence().map(|c| c.num_seconds()), "Loaded weather");
    Ok(table)
}

fn build(scenario: &ScenarioFile, weather: &WeatherTable, engine: EngineChoice, config: &EngineConfig) -> Result<Scenario> {
    Ok(match engine {
        EngineChoice::Steady => Scenario::SteadyState(scenario.steady_state_input(weather.clone())?),
        EngineChoice::Rc => Scenario::RcNetwork(scenario.rc_input(weather, config)?),
    })
}

fn warmup(engine: EngineChoice, config: &EngineConfig) -> chrono::Duration {
    match engine {
        EngineChoice::Steady => chrono::Duration::zero(),
        EngineChoice::Rc => config.rc.warmup(),
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = EngineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            scenario,
            weather,
            engine,
            full_table,
        } => {
            let scenario = ScenarioFile::load(&scenario)?;
            let weather = load_weather(&weather)?;
            let table = build(&scenario, &weather, engine, &config)?.run(&config)?;
            let summary = DemandSummary::from_table(&table, warmup(engine, &config))?;

            let report = RunReport {
                scenario: &scenario.name,
                specific_heating_kwh_m2: scenario
                    .floor_area_m2
                    .and_then(|area| summary.specific_heating_kwh_m2(area)),
                summary,
                table: full_table.then_some(&table),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Compare {
            baseline,
            variant,
            weather,
            engine,
        } => {
            let weather = load_weather(&weather)?;
            let mut scenarios = Vec::new();
            for path in [&baseline, &variant] {
                let file = ScenarioFile::load(path)?;
                scenarios.push(NamedScenario::new(
                    file.name.clone(),
                    build(&file, &weather, engine, &config)?,
                ));
            }

            let mut summaries = Vec::new();
            for outcome in run_batch(&scenarios, &config) {
                let table = outcome
                    .result()
                    .map_err(|e| anyhow::anyhow!("Scenario '{}' failed: {e}", outcome.name))?;
                summaries.push(DemandSummary::from_table(table, warmup(engine, &config))?);
            }
            let [baseline, variant]: [DemandSummary; 2] = summaries
                .try_into()
                .map_err(|_| anyhow::anyhow!("Expected two scenario results"))?;

            let report = CompareReport {
                relative_heating_change: relative_change(&baseline, &variant),
                baseline,
                variant,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
