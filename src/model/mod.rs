//! Model declarations: stocks, flows, parameters, auxiliaries and the time
//! horizon, as exchanged at the JSON boundary.
pub mod document;
pub mod types;

pub use document::{DocumentError, ModelDocument};
pub use types::{AuxiliaryDecl, FlowDecl, ParameterDecl, StockDecl, TimeConfig, TimeUnit, VariableKind};
