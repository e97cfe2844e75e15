//! Multi-run analysis: side-by-side scenarios and one-parameter sweeps.
//!
//! Runs share the validated model read-only and are independent, so they
//! execute in parallel; outputs keep the caller's order.
use crate::compute::{Engine, SimulationError, SimulationResult};
use crate::config::EngineConfig;
use crate::validation::ValidatedModel;
use rayon::prelude::*;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("model has no parameter '{0}'")]
    UnknownParameter(String),
    #[error("a sweep needs at least one step")]
    NoSteps,
    #[error("sweep bounds must be finite, got {min}..{max}")]
    InvalidRange { min: f64, max: f64 },
}

/// A named set of parameter overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub name: String,
    /// The overrides this run was given, as requested.
    pub parameters: BTreeMap<String, f64>,
    pub outcome: Result<SimulationResult, SimulationError>,
}

// `{"name": .., "parameters": {..}}` plus `"results": {..}` or `"error": ".."`.
impl Serialize for ScenarioOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ScenarioOutcome", 3)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("parameters", &self.parameters)?;
        match &self.outcome {
            Ok(result) => s.serialize_field("results", result)?,
            Err(e) => s.serialize_field("error", &e.to_string())?,
        }
        s.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityReport {
    pub parameter: String,
    pub values: Vec<f64>,
    pub runs: Vec<ScenarioOutcome>,
}

/// Simulates each scenario independently.
pub fn compare(model: &ValidatedModel, scenarios: &[Scenario], config: &EngineConfig) -> Vec<ScenarioOutcome> {
    scenarios
        .par_iter()
        .map(|scenario| {
            let outcome = Engine::simulate_with(model, Some(&scenario.parameters), config);
            match &outcome {
                Ok(_) => info!(event = "scenario.completed", scenario = %scenario.name),
                Err(e) => warn!(event = "scenario.failed", scenario = %scenario.name, error = %e),
            }
            ScenarioOutcome { name: scenario.name.clone(), parameters: scenario.parameters.clone(), outcome }
        })
        .collect()
}

/// `steps` evenly spaced values from `min` to `max` inclusive. One step is
/// just `min`.
pub fn sweep_values(min: f64, max: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![min],
        n => {
            let last = (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { max } else { min + (max - min) * (i as f64 / last) })
                .collect()
        }
    }
}

/// Runs `model` once per swept value of `parameter`, everything else fixed.
pub fn sensitivity(
    model: &ValidatedModel,
    parameter: &str,
    min: f64,
    max: f64,
    steps: usize,
    config: &EngineConfig,
) -> Result<SensitivityReport, AnalysisError> {
    if model.document().parameter(parameter).is_none() {
        return Err(AnalysisError::UnknownParameter(parameter.to_string()));
    }
    if steps == 0 {
        return Err(AnalysisError::NoSteps);
    }
    if !min.is_finite() || !max.is_finite() {
        return Err(AnalysisError::InvalidRange { min, max });
    }

    let values = sweep_values(min, max, steps);
    let scenarios: Vec<Scenario> = values
        .iter()
        .map(|&v| Scenario { name: format!("{}={}", parameter, v), parameters: BTreeMap::from([(parameter.to_string(), v)]) })
        .collect();
    let runs = compare(model, &scenarios, config);
    Ok(SensitivityReport { parameter: parameter.to_string(), values, runs })
}
