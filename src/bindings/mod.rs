//! Python facade over validation and simulation.
pub mod python;
