use serde::{Deserialize, Serialize};

fn default_stock_unit() -> String {
    "units".to_string()
}

fn default_flow_unit() -> String {
    "units/time".to_string()
}

fn default_start() -> f64 {
    0.0
}

fn default_dt() -> f64 {
    1.0
}

/// An accumulation. `initial_value` is optional on the wire so that a missing
/// value is reported with the other structural problems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StockDecl {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initial_value: Option<f64>,
    #[serde(default = "default_stock_unit")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A rate moving quantity out of `from_stock` and into `to_stock`. A missing
/// endpoint is the model boundary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlowDecl {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub from_stock: Option<String>,
    #[serde(default)]
    pub to_stock: Option<String>,
    #[serde(default)]
    pub equation: String,
    #[serde(default = "default_flow_unit")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDecl {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuxiliaryDecl {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub equation: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Weeks,
    #[default]
    Months,
    Quarters,
    Years,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Days => "days",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Months => "months",
            TimeUnit::Quarters => "quarters",
            TimeUnit::Years => "years",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The simulation horizon. Bounds (`start >= 0`, `end > start`,
/// `0 < dt <= 1`) are checked by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeConfig {
    #[serde(default = "default_start")]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub unit: TimeUnit,
}

impl TimeConfig {
    pub const fn new(start: f64, end: f64, dt: f64, unit: TimeUnit) -> Self {
        Self { start, end, dt, unit }
    }
}

/// Which declaration list a variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    Stock,
    Flow,
    Parameter,
    Auxiliary,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Stock => "stock",
            VariableKind::Flow => "flow",
            VariableKind::Parameter => "parameter",
            VariableKind::Auxiliary => "auxiliary",
        }
    }
}

impl std::fmt::Display for VariableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
