//! Compilation and deterministic integration of validated models.
pub mod engine;
pub mod error;
pub mod grid;
pub mod integrator;
pub mod ledger;
pub mod program;

pub use engine::{simulate, Engine};
pub use error::{CompileError, SimulationError};
pub use ledger::{RunMetadata, SimulationResult};
pub use program::{Program, Slot};
