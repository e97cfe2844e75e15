use crate::expr::{EvalError, EvalErrorKind};
use thiserror::Error;

/// Raised while lowering a validated model to a [`super::program::Program`].
/// Validation rules out both cases; seeing one means the two disagree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("equation of '{owner}' does not parse: {source}")]
    Parse {
        owner: String,
        #[source]
        source: EvalError,
    },
    #[error("equation of '{owner}' names '{name}', which is not declared")]
    UnresolvedName { owner: String, name: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("evaluating '{owner}' = `{equation}` at time {time}: {source}")]
    Evaluation {
        owner: String,
        equation: String,
        time: f64,
        #[source]
        source: EvalError,
    },
    #[error("time grid would have {points} points, limit is {limit}")]
    GridTooLarge { points: usize, limit: usize },
    #[error("override for parameter '{id}' is not a finite number")]
    InvalidOverride { id: String },
}

impl SimulationError {
    /// The underlying evaluation failure kind, if this is one.
    pub fn eval_kind(&self) -> Option<EvalErrorKind> {
        match self {
            SimulationError::Evaluation { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
