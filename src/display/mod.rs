//! Human-readable renderings of validation outcomes and simulation state.
pub mod report;
pub mod trace;

pub use report::{format_series_table, format_violations};
pub use trace::format_trace;
