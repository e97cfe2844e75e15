//! Causal-structure constraints: forbidden stock-to-stock edges, mandatory
//! intermediate stocks, required flow dependencies and dependency cycles.
use super::RuleContext;
use crate::validation::error::{Violation, ViolationKind};

pub(crate) fn check_forbidden_edges(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for f in &ctx.doc.flows {
        let (Some(from), Some(to)) = (&f.from_stock, &f.to_stock) else { continue };
        if ctx.schema.is_forbidden_edge(from, to) {
            out.push(
                Violation::new(
                    ViolationKind::ForbiddenEdge,
                    format!("flow '{}' connects '{}' to '{}', which the {} domain forbids", f.id, from, to, ctx.schema.name),
                )
                .at(&f.id)
                .with_related([from.as_str(), to.as_str()]),
            );
        }
    }
}

pub(crate) fn check_mandatory_intermediates(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for rule in ctx.schema.mandatory_intermediates {
        for f in ctx.doc.flows.iter().filter(|f| f.to_stock.as_deref() == Some(rule.target)) {
            if f.from_stock.as_deref() == Some(rule.via) {
                continue;
            }
            let source = f.from_stock.as_deref().unwrap_or("outside the model");
            out.push(
                Violation::new(
                    ViolationKind::MissingMandatoryIntermediate,
                    format!(
                        "flow '{}' fills '{}' from {}; it must pass through '{}'",
                        f.id, rule.target, source, rule.via
                    ),
                )
                .at(&f.id)
                .with_related([rule.target, rule.via]),
            );
        }
    }
}

pub(crate) fn check_required_dependencies(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for rule in ctx.schema.required_dependencies {
        if ctx.doc.flow(rule.flow).is_none() {
            continue;
        }
        let missing: Vec<&str> = rule.stocks.iter().copied().filter(|s| !ctx.graph.depends_on(rule.flow, s)).collect();
        if missing.is_empty() {
            continue;
        }
        out.push(
            Violation::new(
                ViolationKind::MissingRequiredDependency,
                format!("flow '{}' must depend on {}", rule.flow, missing.join(", ")),
            )
            .at(rule.flow)
            .with_related(missing),
        );
    }
}

pub(crate) fn check_cycles(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for cycle in ctx.graph.cycles() {
        let head = cycle[0].clone();
        out.push(
            Violation::new(
                ViolationKind::DependencyCycle,
                format!("equations depend on each other in a cycle: {}", cycle.join(" -> ")),
            )
            .at(head)
            .with_related(cycle),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::topology::DependencyGraph;
    use crate::model::{AuxiliaryDecl, FlowDecl, ModelDocument, StockDecl};
    use crate::schema::Domain;

    fn stock(id: &str) -> StockDecl {
        StockDecl { id: id.into(), ..Default::default() }
    }

    fn flow(id: &str, from: Option<&str>, to: Option<&str>, equation: &str) -> FlowDecl {
        FlowDecl {
            id: id.into(),
            from_stock: from.map(Into::into),
            to_stock: to.map(Into::into),
            equation: equation.into(),
            ..Default::default()
        }
    }

    fn run(doc: &ModelDocument, domain: Domain) -> Vec<Violation> {
        let graph = DependencyGraph::build(doc);
        let ctx = RuleContext { doc, schema: domain.schema(), graph: &graph };
        let mut out = Vec::new();
        check_forbidden_edges(&ctx, &mut out);
        check_mandatory_intermediates(&ctx, &mut out);
        check_required_dependencies(&ctx, &mut out);
        check_cycles(&ctx, &mut out);
        out
    }

    #[test]
    fn test_forbidden_edge() {
        let doc = ModelDocument {
            stocks: vec![stock("rd_knowledge"), stock("cash_reserves")],
            flows: vec![
                flow("revenue", Some("rd_knowledge"), Some("cash_reserves"), "1"),
                flow("rd_investment", Some("cash_reserves"), Some("rd_knowledge"), "1"),
            ],
            ..Default::default()
        };
        let out = run(&doc, Domain::Aerodin);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::ForbiddenEdge);
        assert_eq!(out[0].offending_id.as_deref(), Some("revenue"));
        assert_eq!(out[0].related, vec!["rd_knowledge".to_string(), "cash_reserves".to_string()]);
    }

    #[test]
    fn test_programs_must_come_through_backlog() {
        let doc = ModelDocument {
            stocks: vec![stock("regulatory_backlog"), stock("active_defense_programs")],
            flows: vec![
                flow("program_approval_rate", Some("regulatory_backlog"), Some("active_defense_programs"), "1"),
                flow("ethical_clearance_rate", None, Some("active_defense_programs"), "1"),
            ],
            ..Default::default()
        };
        let out = run(&doc, Domain::Aerodin);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::MissingMandatoryIntermediate);
        assert_eq!(out[0].offending_id.as_deref(), Some("ethical_clearance_rate"));
    }

    #[test]
    fn test_vehicle_output_dependencies_through_auxiliaries() {
        let mut doc = ModelDocument {
            stocks: vec![
                stock("battery_inventory"),
                stock("semiconductor_inventory"),
                stock("installed_production_capacity"),
                stock("customer_base"),
            ],
            flows: vec![flow("vehicle_output_rate", None, Some("customer_base"), "production_constraint")],
            auxiliaries: vec![AuxiliaryDecl {
                id: "production_constraint".into(),
                equation: "min(installed_production_capacity, battery_inventory)".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let out = run(&doc, Domain::Euromotion);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::MissingRequiredDependency);
        assert_eq!(out[0].related, vec!["semiconductor_inventory".to_string()]);

        doc.auxiliaries[0].equation =
            "min(installed_production_capacity, battery_inventory, semiconductor_inventory / 2)".into();
        assert!(run(&doc, Domain::Euromotion).is_empty());
    }

    #[test]
    fn test_cycle() {
        let doc = ModelDocument {
            stocks: vec![stock("customer_base")],
            flows: vec![flow("customer_acquisition", None, Some("customer_base"), "demand")],
            auxiliaries: vec![
                AuxiliaryDecl { id: "demand".into(), equation: "growth_momentum * 2".into(), ..Default::default() },
                AuxiliaryDecl { id: "growth_momentum".into(), equation: "demand / 2".into(), ..Default::default() },
            ],
            ..Default::default()
        };
        let out = run(&doc, Domain::Euromotion);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, ViolationKind::DependencyCycle);
        assert_eq!(out[0].related, vec!["demand".to_string(), "growth_momentum".to_string()]);
    }
}
