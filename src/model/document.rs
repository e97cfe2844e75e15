//! The interchange model document and its JSON boundary.
use super::types::{AuxiliaryDecl, FlowDecl, ParameterDecl, StockDecl, TimeConfig, VariableKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("malformed model document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A candidate model as submitted by a caller. Nothing about it is trusted
/// until it has passed the validator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stocks: Vec<StockDecl>,
    #[serde(default)]
    pub flows: Vec<FlowDecl>,
    #[serde(default)]
    pub parameters: Vec<ParameterDecl>,
    #[serde(default)]
    pub auxiliaries: Vec<AuxiliaryDecl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeConfig>,
}

impl ModelDocument {
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, DocumentError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_pretty()?)
            .map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })
    }

    /// Every declared id with its kind, in declaration order: stocks, flows,
    /// parameters, auxiliaries.
    pub fn declared_ids(&self) -> impl Iterator<Item = (VariableKind, &str)> + '_ {
        let stocks = self.stocks.iter().map(|s| (VariableKind::Stock, s.id.as_str()));
        let flows = self.flows.iter().map(|f| (VariableKind::Flow, f.id.as_str()));
        let params = self.parameters.iter().map(|p| (VariableKind::Parameter, p.id.as_str()));
        let auxes = self.auxiliaries.iter().map(|a| (VariableKind::Auxiliary, a.id.as_str()));
        stocks.chain(flows).chain(params).chain(auxes)
    }

    /// Every `(owner id, equation)` pair: flows first, then auxiliaries.
    pub fn equations(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let flows = self.flows.iter().map(|f| (f.id.as_str(), f.equation.as_str()));
        let auxes = self.auxiliaries.iter().map(|a| (a.id.as_str(), a.equation.as_str()));
        flows.chain(auxes)
    }

    pub fn stock(&self, id: &str) -> Option<&StockDecl> {
        self.stocks.iter().find(|s| s.id == id)
    }

    pub fn flow(&self, id: &str) -> Option<&FlowDecl> {
        self.flows.iter().find(|f| f.id == id)
    }

    pub fn parameter(&self, id: &str) -> Option<&ParameterDecl> {
        self.parameters.iter().find(|p| p.id == id)
    }

    pub fn auxiliary(&self, id: &str) -> Option<&AuxiliaryDecl> {
        self.auxiliaries.iter().find(|a| a.id == id)
    }
}
