//! Individual validation rules. Each rule appends every violation it finds
//! and never stops early.
pub mod closed_world;
pub mod graph;
pub mod references;
pub mod safety;
pub mod structure;

use crate::analysis::topology::DependencyGraph;
use crate::model::ModelDocument;
use crate::schema::DomainSchema;

/// Shared, read-only inputs for one validation pass.
pub(crate) struct RuleContext<'a> {
    pub doc: &'a ModelDocument,
    pub schema: &'static DomainSchema,
    pub graph: &'a DependencyGraph,
}
