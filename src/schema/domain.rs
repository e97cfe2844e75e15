use super::{aerodin, euromotion};
use crate::model::{TimeConfig, VariableKind};
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown domain '{name}' (expected one of: {})", Domain::names().join(", "))]
    UnknownDomain { name: String },
}

/// Flows into `target` must originate from `via`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MandatoryIntermediate {
    pub target: &'static str,
    pub via: &'static str,
}

/// `flow`'s equation must depend, directly or through other equations, on
/// every stock in `stocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequiredDependency {
    pub flow: &'static str,
    pub stocks: &'static [&'static str],
}

/// The closed world of one domain. Defined statically and never mutated.
#[derive(Debug, Serialize)]
pub struct DomainSchema {
    pub name: &'static str,
    pub description: &'static str,
    /// Conceptual sub-areas for guidance only; not consulted by validation.
    pub areas: &'static [&'static str],
    pub stock_ids: &'static [&'static str],
    pub flow_ids: &'static [&'static str],
    pub parameter_ids: &'static [&'static str],
    pub auxiliary_ids: &'static [&'static str],
    /// `(from_stock, to_stock)` pairs no flow may connect.
    pub forbidden_edges: &'static [(&'static str, &'static str)],
    pub mandatory_intermediates: &'static [MandatoryIntermediate],
    pub required_dependencies: &'static [RequiredDependency],
    pub default_time: TimeConfig,
}

impl DomainSchema {
    pub fn allowed_ids(&self, kind: VariableKind) -> &'static [&'static str] {
        match kind {
            VariableKind::Stock => self.stock_ids,
            VariableKind::Flow => self.flow_ids,
            VariableKind::Parameter => self.parameter_ids,
            VariableKind::Auxiliary => self.auxiliary_ids,
        }
    }

    pub fn allows(&self, kind: VariableKind, id: &str) -> bool {
        self.allowed_ids(kind).contains(&id)
    }

    pub fn is_forbidden_edge(&self, from: &str, to: &str) -> bool {
        self.forbidden_edges.iter().any(|&(f, t)| f == from && t == to)
    }

    /// Upper bound on how many variables of `kind` a model may declare.
    pub fn max_count(&self, kind: VariableKind) -> usize {
        self.allowed_ids(kind).len()
    }
}

/// A supported business domain. Adding a domain means adding a variant and
/// its static schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Aerodin,
    Euromotion,
}

impl Domain {
    pub const ALL: [Domain; 2] = [Domain::Aerodin, Domain::Euromotion];

    pub fn schema(self) -> &'static DomainSchema {
        match self {
            Domain::Aerodin => &aerodin::SCHEMA,
            Domain::Euromotion => &euromotion::SCHEMA,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.schema().name
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|d| d.as_str()).collect()
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = SchemaError;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == wanted)
            .ok_or_else(|| SchemaError::UnknownDomain { name: s.to_string() })
    }
}
