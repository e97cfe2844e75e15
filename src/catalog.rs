//! Built-in example models, one per domain.
use crate::model::{DocumentError, ModelDocument};
use crate::schema::Domain;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub domain: Domain,
    pub title: &'static str,
    #[serde(skip)]
    source: &'static str,
}

impl CatalogEntry {
    pub fn document(&self) -> Result<ModelDocument, DocumentError> {
        ModelDocument::from_json(self.source)
    }

    pub fn json(&self) -> &'static str {
        self.source
    }
}

static ENTRIES: [CatalogEntry; 2] = [
    CatalogEntry {
        id: "aerodin_workforce",
        domain: Domain::Aerodin,
        title: "Engineering workforce feeding a regulated program pipeline",
        source: include_str!("../models/aerodin_workforce.json"),
    },
    CatalogEntry {
        id: "euromotion_growth",
        domain: Domain::Euromotion,
        title: "Supply-constrained vehicle output and market growth",
        source: include_str!("../models/euromotion_growth.json"),
    },
];

pub fn list() -> &'static [CatalogEntry] {
    &ENTRIES
}

pub fn get(id: &str) -> Option<&'static CatalogEntry> {
    ENTRIES.iter().find(|e| e.id == id)
}
