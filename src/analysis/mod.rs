//! Structural analysis of a model's variable dependencies.
pub mod topology;

pub use topology::{Computed, DependencyGraph, VarNode};
