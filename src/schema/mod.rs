//! Per-domain closed worlds: which identifiers a model may declare and which
//! causal structures it may not contain.
pub mod aerodin;
pub mod domain;
pub mod euromotion;
pub mod registry;

pub use domain::{Domain, DomainSchema, MandatoryIntermediate, RequiredDependency, SchemaError};
pub use registry::{all, get};
