//! The central validator that runs every rule against a candidate model.
use super::error::{Violation, ViolationKind};
use super::rules::{closed_world, graph, references, safety, structure, RuleContext};
use crate::analysis::topology::DependencyGraph;
use crate::compute::program::{Compiler, Program};
use crate::model::{ModelDocument, TimeConfig};
use crate::schema::{Domain, DomainSchema, SchemaError};
use tracing::{debug, info};

type Rule = fn(&RuleContext<'_>, &mut Vec<Violation>);

/// Rules in reporting order. All of them always run.
const RULES: [(&str, Rule); 9] = [
    ("structure", structure::check),
    ("closed_world", closed_world::check),
    ("flow_endpoints", references::check_flow_endpoints),
    ("equation_references", references::check_equations),
    ("forbidden_functions", safety::check),
    ("forbidden_edges", graph::check_forbidden_edges),
    ("mandatory_intermediates", graph::check_mandatory_intermediates),
    ("required_dependencies", graph::check_required_dependencies),
    ("dependency_cycles", graph::check_cycles),
];

/// A model that passed every rule for its domain, together with its compiled
/// evaluation program. Only [`Validator::validate`] can make one.
#[derive(Debug, Clone)]
pub struct ValidatedModel {
    domain: Domain,
    document: ModelDocument,
    time: TimeConfig,
    program: Program,
}

impl ValidatedModel {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// The accepted document, with `company` and `time` filled in.
    pub fn document(&self) -> &ModelDocument {
        &self.document
    }

    pub fn name(&self) -> &str {
        &self.document.name
    }

    pub fn time(&self) -> &TimeConfig {
        &self.time
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn into_document(self) -> ModelDocument {
        self.document
    }
}

/// Checks candidate models against one domain's closed world.
///
/// Like a linter, it collects every violation before reporting.
pub struct Validator {
    domain: Domain,
}

impl Validator {
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }

    pub fn for_domain(name: &str) -> Result<Self, SchemaError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn schema(&self) -> &'static DomainSchema {
        self.domain.schema()
    }

    /// # Returns
    /// - `Ok(ValidatedModel)` when no rule reports anything.
    /// - `Err(Vec<Violation>)` with every violation found, in rule order.
    pub fn validate(&self, doc: &ModelDocument) -> Result<ValidatedModel, Vec<Violation>> {
        let schema = self.schema();
        let dependencies = DependencyGraph::build(doc);
        let ctx = RuleContext { doc, schema, graph: &dependencies };

        let mut violations = Vec::new();
        for (rule, check) in RULES {
            let before = violations.len();
            check(&ctx, &mut violations);
            let found = violations.len() - before;
            if found > 0 {
                debug!(event = "validation.rule_failed", rule, found, domain = schema.name);
            }
        }

        if !violations.is_empty() {
            info!(
                event = "model.rejected",
                domain = schema.name,
                model = %doc.name,
                violations = violations.len()
            );
            return Err(violations);
        }

        let model = self.finish(doc, &dependencies).map_err(|v| vec![v])?;
        info!(
            event = "model.validated",
            domain = schema.name,
            model = %doc.name,
            stocks = doc.stocks.len(),
            flows = doc.flows.len(),
            parameters = doc.parameters.len(),
            auxiliaries = doc.auxiliaries.len()
        );
        Ok(model)
    }

    fn finish(&self, doc: &ModelDocument, dependencies: &DependencyGraph) -> Result<ValidatedModel, Violation> {
        let schema = self.schema();
        let order = dependencies.evaluation_order().map_err(|cycles| {
            Violation::new(ViolationKind::DependencyCycle, "equations depend on each other in a cycle")
                .with_related(cycles.concat())
        })?;
        let program = Compiler::new(doc)
            .compile(&order)
            .map_err(|e| Violation::new(ViolationKind::StructuralError, e.to_string()))?;

        let time = doc.time.unwrap_or(schema.default_time);
        let mut document = doc.clone();
        document.company = Some(schema.name.to_string());
        document.time = Some(time);

        Ok(ValidatedModel { domain: self.domain, document, time, program })
    }
}

/// Validates `doc` against the domain named `domain_name`. An unknown domain
/// is reported as a single violation.
pub fn validate(domain_name: &str, doc: &ModelDocument) -> Result<ValidatedModel, Vec<Violation>> {
    match Validator::for_domain(domain_name) {
        Ok(validator) => validator.validate(doc),
        Err(e) => Err(vec![Violation::new(ViolationKind::UnknownDomain, e.to_string())
            .at(domain_name)
            .with_related(Domain::names())]),
    }
}
