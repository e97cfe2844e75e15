//! Closed-world validation of candidate models.
pub mod error;
pub mod rules;
pub mod validator;

pub use error::{Violation, ViolationKind};
pub use validator::{validate, ValidatedModel, Validator};
