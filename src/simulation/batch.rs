//! Parallel execution of independent scenarios.
//!
//! Both engines are pure functions of their inputs, so scenarios share
//! nothing and run on the rayon pool. Results come back in input order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::EngineConfig;
use crate::domain::ResultTable;
use crate::error::EngineError;
use crate::simulation::rc_network::{run_rc_network, RcNetworkInput};
use crate::simulation::steady_state::{run_steady_state, SteadyStateInput};

/// One labelled engine invocation.
#[derive(Debug, Clone)]
pub enum Scenario {
    SteadyState(SteadyStateInput),
    RcNetwork(RcNetworkInput),
}

impl Scenario {
    pub fn run(&self, config: &EngineConfig) -> Result<ResultTable, EngineError> {
        match self {
            Scenario::SteadyState(input) => run_steady_state(input, config),
            Scenario::RcNetwork(input) => run_rc_network(input, config),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamedScenario {
    pub name: String,
    pub scenario: Scenario,
}

impl NamedScenario {
    pub fn new(name: impl Into<String>, scenario: Scenario) -> Self {
        Self {
            name: name.into(),
            scenario,
        }
    }
}

/// Either the result table or the rendered error of one scenario.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Table(ResultTable),
    Error(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

impl ScenarioOutcome {
    pub fn result(&self) -> Result<&ResultTable, &str> {
        match &self.outcome {
            RunOutcome::Table(table) => Ok(table),
            RunOutcome::Error(error) => Err(error.as_str()),
        }
    }

    pub fn is_err(&self) -> bool {
        matches!(self.outcome, RunOutcome::Error(_))
    }
}

/// Runs every scenario; one failing scenario does not stop the others.
#[instrument(skip_all, fields(scenarios = scenarios.len()))]
pub fn run_batch(scenarios: &[NamedScenario], config: &EngineConfig) -> Vec<ScenarioOutcome> {
    info!(scenarios = scenarios.len(), "Running scenario batch");
    let outcomes: Vec<ScenarioOutcome> = scenarios
        .par_iter()
        .map(|named| {
            let outcome = match named.scenario.run(config) {
                Ok(table) => RunOutcome::Table(table),
                Err(e) => {
                    warn!(scenario = %named.name, error = %e, "Scenario failed");
                    RunOutcome::Error(e.to_string())
                }
            };
            ScenarioOutcome {
                name: named.name.clone(),
                outcome,
            }
        })
        .collect();
    let failed = outcomes.iter().filter(|o| o.is_err()).count();
    info!(failed, "Scenario batch complete");
    outcomes
}
