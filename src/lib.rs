//! Closed-world validation and deterministic simulation of stock-flow
//! models for a fixed set of company domains.
//!
//! A model arrives as a [`ModelDocument`], is checked against its domain's
//! schema by a [`Validator`] and, once accepted, is integrated with RK4 by
//! the [`Engine`]. The Python facade is built with the `python` feature.

pub mod analysis;
pub mod catalog;
pub mod compute;
pub mod config;
pub mod display;
pub mod expr;
pub mod model;
pub mod scenario;
pub mod schema;
pub mod telemetry;
pub mod validation;

#[cfg(feature = "python")]
pub mod bindings;

pub use compute::{simulate, Engine, SimulationError, SimulationResult};
pub use config::EngineConfig;
pub use model::{ModelDocument, TimeConfig, VariableKind};
pub use scenario::{compare, sensitivity, Scenario};
pub use schema::{Domain, DomainSchema};
pub use validation::{validate, ValidatedModel, Validator, Violation, ViolationKind};
