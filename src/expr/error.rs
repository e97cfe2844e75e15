use serde::Serialize;
use thiserror::Error;

/// Fieldless classification of an [`EvalError`], used for programmatic
/// inspection without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalErrorKind {
    SyntaxError,
    UnknownIdentifier,
    DomainError,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },
    #[error("unknown identifier '{name}'")]
    UnknownIdentifier { name: String },
    #[error("math domain error in {operation}: {message}")]
    Domain { operation: String, message: String },
}

impl EvalError {
    pub fn kind(&self) -> EvalErrorKind {
        match self {
            EvalError::Syntax { .. } => EvalErrorKind::SyntaxError,
            EvalError::UnknownIdentifier { .. } => EvalErrorKind::UnknownIdentifier,
            EvalError::Domain { .. } => EvalErrorKind::DomainError,
        }
    }

    pub(crate) fn syntax(position: usize, message: impl Into<String>) -> Self {
        EvalError::Syntax { position, message: message.into() }
    }

    pub(crate) fn domain(operation: impl Into<String>, message: impl Into<String>) -> Self {
        EvalError::Domain { operation: operation.into(), message: message.into() }
    }
}
