//! Runs a validated model over its time grid.
use super::error::SimulationError;
use super::grid;
use super::integrator::Rk4;
use super::ledger::{Ledger, RunMetadata, SimulationResult};
use super::program::{Program, TIME_SLOT};
use crate::config::EngineConfig;
use crate::expr::eval;
use crate::model::{ModelDocument, VariableKind};
use crate::validation::ValidatedModel;
use std::collections::BTreeMap;
use tracing::{debug, info, info_span};

/// Evaluates every auxiliary and flow for one `(time, stocks)` state.
struct Machine<'a> {
    program: &'a Program,
    doc: &'a ModelDocument,
    frame: Vec<f64>,
}

impl<'a> Machine<'a> {
    fn evaluate(&mut self, t: f64, stocks: &[f64]) -> Result<(), SimulationError> {
        let program = self.program;
        self.frame[TIME_SLOT.index()] = t;
        self.frame[program.stock_slots.clone()].copy_from_slice(stocks);
        for ins in &program.instructions {
            let value = eval(&ins.expr, self.frame.as_slice()).map_err(|source| {
                let equation = match ins.kind {
                    VariableKind::Flow => &self.doc.flows[ins.index].equation,
                    _ => &self.doc.auxiliaries[ins.index].equation,
                };
                SimulationError::Evaluation {
                    owner: program.names[ins.slot.index()].clone(),
                    equation: equation.clone(),
                    time: t,
                    source,
                }
            })?;
            self.frame[ins.slot.index()] = value;
        }
        Ok(())
    }
}

pub struct Engine;

impl Engine {
    /// Simulates with default limits.
    pub fn simulate(
        model: &ValidatedModel,
        overrides: Option<&BTreeMap<String, f64>>,
    ) -> Result<SimulationResult, SimulationError> {
        Self::simulate_with(model, overrides, &EngineConfig::default())
    }

    /// Deterministic: the same model, overrides and limits always produce a
    /// bit-identical result. Any evaluation failure aborts the run.
    pub fn simulate_with(
        model: &ValidatedModel,
        overrides: Option<&BTreeMap<String, f64>>,
        config: &EngineConfig,
    ) -> Result<SimulationResult, SimulationError> {
        let span = info_span!("sd.simulate", model = %model.name());
        let _enter = span.enter();

        let program = model.program();
        let doc = model.document();
        let time = *model.time();

        let parameters = Self::resolve_parameters(program, doc, overrides)?;
        let grid = grid::build(&time, config.max_grid_points)?;
        info!(event = "simulation.started", points = grid.len(), stocks = program.stock_count());

        let mut machine = Machine { program, doc, frame: program.frame(&parameters) };
        let mut state = program.initial_stocks.clone();
        let mut rk = Rk4::new(state.len());
        let mut ledger = Ledger::new(program.slot_count(), grid.len());

        for (i, &t) in grid.iter().enumerate() {
            machine.evaluate(t, &state)?;
            ledger.record(i, &machine.frame);

            if let Some(&next) = grid.get(i + 1) {
                rk.step(t, next - t, &mut state, |t, stocks, out| {
                    machine.evaluate(t, stocks)?;
                    program.derivatives(&machine.frame, out);
                    Ok(())
                })?;
            }
        }

        let metadata = RunMetadata {
            model_name: doc.name.clone(),
            parameters: doc.parameters.iter().map(|p| p.id.clone()).zip(parameters.iter().copied()).collect(),
            time_config: time,
        };
        info!(event = "simulation.finished", points = ledger.points());
        Ok(SimulationResult::from_ledger(program, ledger, metadata))
    }

    /// Declared parameter values with `overrides` applied. Keys that name no
    /// parameter are ignored.
    fn resolve_parameters(
        program: &Program,
        doc: &ModelDocument,
        overrides: Option<&BTreeMap<String, f64>>,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut values = program.parameters.clone();
        let Some(overrides) = overrides else { return Ok(values) };
        for (id, &value) in overrides {
            if !value.is_finite() {
                return Err(SimulationError::InvalidOverride { id: id.clone() });
            }
            match doc.parameters.iter().position(|p| &p.id == id) {
                Some(i) => values[i] = value,
                None => debug!(event = "simulation.override_ignored", parameter = %id),
            }
        }
        Ok(values)
    }
}

/// Runs `model` with default limits. See [`Engine::simulate_with`].
pub fn simulate(
    model: &ValidatedModel,
    overrides: Option<&BTreeMap<String, f64>>,
) -> Result<SimulationResult, SimulationError> {
    Engine::simulate(model, overrides)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::EvalErrorKind;
    use crate::model::{AuxiliaryDecl, FlowDecl, ParameterDecl, StockDecl, TimeConfig, TimeUnit};
    use crate::validation::validate;

    fn workforce(time: TimeConfig) -> ModelDocument {
        ModelDocument {
            name: "Workforce".into(),
            description: "Hiring into juniors, training into seniors".into(),
            stocks: vec![
                StockDecl { id: "junior_engineers".into(), name: "J".into(), initial_value: Some(0.0), ..Default::default() },
                StockDecl { id: "skilled_engineers".into(), name: "S".into(), initial_value: Some(100.0), ..Default::default() },
            ],
            flows: vec![
                FlowDecl {
                    id: "hiring_rate".into(),
                    name: "Hiring".into(),
                    to_stock: Some("junior_engineers".into()),
                    equation: "hiring_target".into(),
                    ..Default::default()
                },
                FlowDecl {
                    id: "training_completion".into(),
                    name: "Training".into(),
                    from_stock: Some("junior_engineers".into()),
                    to_stock: Some("skilled_engineers".into()),
                    equation: "junior_engineers / training_time".into(),
                    ..Default::default()
                },
            ],
            parameters: vec![
                ParameterDecl { id: "hiring_target".into(), name: "H".into(), value: Some(4.0), ..Default::default() },
                ParameterDecl { id: "training_time".into(), name: "T".into(), value: Some(2.0), ..Default::default() },
            ],
            auxiliaries: vec![AuxiliaryDecl {
                id: "total_workforce".into(),
                name: "Total".into(),
                equation: "junior_engineers + skilled_engineers".into(),
                ..Default::default()
            }],
            time: Some(time),
            ..Default::default()
        }
    }

    #[test]
    fn test_series_shapes_and_metadata() {
        let model = validate("aerodin", &workforce(TimeConfig::new(0.0, 5.0, 0.5, TimeUnit::Months))).unwrap();
        let result = simulate(&model, None).unwrap();

        assert_eq!(result.time.len(), 11);
        assert_eq!(result.time[0], 0.0);
        assert_eq!(*result.time.last().unwrap(), 5.0);
        for series in result.stocks.values().chain(result.flows.values()).chain(result.auxiliaries.values()) {
            assert_eq!(series.len(), 11);
        }
        assert_eq!(result.metadata.parameters["hiring_target"], 4.0);
        assert_eq!(result.metadata.time_config.dt, 0.5);

        // Hiring is constant, so total workforce grows linearly.
        let total = &result.auxiliaries["total_workforce"];
        for (t, v) in result.time.iter().zip(total) {
            assert!((v - (100.0 + 4.0 * t)).abs() < 1e-9, "t={} v={}", t, v);
        }
    }

    #[test]
    fn test_overrides_apply_and_ignore_unknown() {
        let model = validate("aerodin", &workforce(TimeConfig::new(0.0, 3.0, 1.0, TimeUnit::Months))).unwrap();
        let overrides: BTreeMap<String, f64> =
            [("hiring_target".to_string(), 10.0), ("not_a_parameter".to_string(), 1.0)].into_iter().collect();
        let result = simulate(&model, Some(&overrides)).unwrap();
        assert_eq!(result.flows["hiring_rate"], vec![10.0; 4]);
        assert_eq!(result.metadata.parameters.len(), 2);

        let bad: BTreeMap<String, f64> = [("hiring_target".to_string(), f64::NAN)].into_iter().collect();
        assert_eq!(
            simulate(&model, Some(&bad)).unwrap_err(),
            SimulationError::InvalidOverride { id: "hiring_target".into() }
        );
    }

    #[test]
    fn test_evaluation_failure_names_equation() {
        let mut doc = workforce(TimeConfig::new(0.0, 3.0, 1.0, TimeUnit::Months));
        doc.parameters[1].value = Some(0.0);
        let model = validate("aerodin", &doc).unwrap();
        let err = simulate(&model, None).unwrap_err();
        match &err {
            SimulationError::Evaluation { owner, equation, time, .. } => {
                assert_eq!(owner, "training_completion");
                assert_eq!(equation, "junior_engineers / training_time");
                assert_eq!(*time, 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(err.eval_kind(), Some(EvalErrorKind::DomainError));
    }

    #[test]
    fn test_grid_limit() {
        let model = validate("aerodin", &workforce(TimeConfig::new(0.0, 100.0, 0.5, TimeUnit::Months))).unwrap();
        let err = Engine::simulate_with(&model, None, &EngineConfig::default().with_max_grid_points(50)).unwrap_err();
        assert_eq!(err, SimulationError::GridTooLarge { points: 201, limit: 50 });
    }
}
