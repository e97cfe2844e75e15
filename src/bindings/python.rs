use crate::compute::{Engine, SimulationResult};
use crate::config::EngineConfig;
use crate::display::trace;
use crate::model::ModelDocument;
use crate::schema::{registry, Domain};
use crate::telemetry;
use crate::validation::{self, ValidatedModel, Violation};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::Level;

fn violations_json(violations: &[Violation]) -> PyResult<String> {
    serde_json::to_string(violations).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

fn parse_document(model_json: &str) -> PyResult<ModelDocument> {
    ModelDocument::from_json(model_json).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn run(model: &ValidatedModel, overrides: Option<HashMap<String, f64>>) -> PyResult<SimulationResult> {
    let overrides: Option<BTreeMap<String, f64>> = overrides.map(|o| o.into_iter().collect());
    Engine::simulate_with(model, overrides.as_ref(), &EngineConfig::from_env())
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// A model that passed validation for one domain.
#[pyclass(name = "_Model")]
#[derive(Debug, Clone)]
pub struct PyModel {
    inner: ValidatedModel,
}

#[pymethods]
impl PyModel {
    /// Raises `ValueError` carrying the JSON list of violations on rejection.
    #[new]
    pub fn new(domain: &str, model_json: &str) -> PyResult<Self> {
        let doc = parse_document(model_json)?;
        validation::validate(domain, &doc)
            .map(|inner| Self { inner })
            .map_err(|violations| match violations_json(&violations) {
                Ok(json) => PyValueError::new_err(json),
                Err(e) => e,
            })
    }

    #[getter]
    pub fn name(&self) -> String {
        self.inner.name().to_string()
    }

    #[getter]
    pub fn domain(&self) -> &'static str {
        self.inner.domain().as_str()
    }

    #[pyo3(signature = (overrides=None))]
    pub fn simulate(&self, overrides: Option<HashMap<String, f64>>) -> PyResult<String> {
        run(&self.inner, overrides)?.to_json_pretty().map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    #[pyo3(signature = (variable, index=0, overrides=None))]
    pub fn trace(&self, variable: &str, index: usize, overrides: Option<HashMap<String, f64>>) -> PyResult<String> {
        let result = run(&self.inner, overrides)?;
        Ok(trace::format_trace(&self.inner, &result, variable, index))
    }

    pub fn to_json(&self) -> PyResult<String> {
        self.inner.document().to_json_pretty().map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }
}

/// JSON list of violations; `[]` means the model is valid.
#[pyfunction]
fn validate_model(domain: &str, model_json: &str) -> PyResult<String> {
    let doc = parse_document(model_json)?;
    match validation::validate(domain, &doc) {
        Ok(_) => Ok("[]".to_string()),
        Err(violations) => violations_json(&violations),
    }
}

/// Validates then simulates, returning the result as JSON.
#[pyfunction]
#[pyo3(signature = (domain, model_json, overrides=None))]
fn simulate_model(domain: &str, model_json: &str, overrides: Option<HashMap<String, f64>>) -> PyResult<String> {
    PyModel::new(domain, model_json)?.simulate(overrides)
}

#[pyfunction]
fn domain_names() -> Vec<&'static str> {
    Domain::names()
}

#[pyfunction]
fn domain_schema(domain: &str) -> PyResult<String> {
    let schema = registry::get(domain).map_err(|e| PyValueError::new_err(e.to_string()))?;
    serde_json::to_string_pretty(schema).map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Routes engine logs to stderr. Returns `False` if logging was already set up.
#[pyfunction]
#[pyo3(signature = (verbose=false, json=false))]
fn init_logging(verbose: bool, json: bool) -> bool {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    telemetry::init_tracing(json, level)
}

/// The `stockflow._core` extension module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyModel>()?;
    m.add_function(wrap_pyfunction!(validate_model, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_model, m)?)?;
    m.add_function(wrap_pyfunction!(domain_names, m)?)?;
    m.add_function(wrap_pyfunction!(domain_schema, m)?)?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    Ok(())
}
