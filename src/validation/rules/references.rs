//! Reference closure: flow endpoints name declared stocks, and every word in
//! an equation names something the equation can actually read.
use super::structure::TIME_NAMES;
use super::RuleContext;
use crate::expr;
use crate::validation::error::{Violation, ViolationKind};
use std::collections::HashSet;

pub(crate) fn check_flow_endpoints(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let stocks: HashSet<&str> = ctx.doc.stocks.iter().map(|s| s.id.as_str()).collect();
    for f in &ctx.doc.flows {
        for (side, endpoint) in [("from_stock", &f.from_stock), ("to_stock", &f.to_stock)] {
            if let Some(stock) = endpoint {
                if !stocks.contains(stock.as_str()) {
                    out.push(
                        Violation::new(
                            ViolationKind::UnknownReference,
                            format!("flow '{}' {} '{}' is not a declared stock", f.id, side, stock),
                        )
                        .at(&f.id)
                        .with_related([stock.as_str()]),
                    );
                }
            }
        }
    }
}

pub(crate) fn check_equations(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let declared: HashSet<&str> = ctx.doc.declared_ids().map(|(_, id)| id).collect();
    for (owner, equation) in ctx.doc.equations() {
        // Unlexable equations are reported by the structure rule.
        let Ok(names) = expr::identifiers(equation) else { continue };
        let unknown: Vec<String> = names
            .into_iter()
            .filter(|n| !declared.contains(n.as_str()) && !TIME_NAMES.contains(&n.as_str()) && !expr::is_builtin(n))
            .collect();
        if !unknown.is_empty() {
            out.push(
                Violation::new(
                    ViolationKind::UnknownReference,
                    format!("equation of '{}' references unknown identifiers: {}", owner, unknown.join(", ")),
                )
                .at(owner)
                .with_related(unknown),
            );
        }

        // A function name read as a value never resolves to a slot.
        let Ok(parsed) = expr::parse(equation) else { continue };
        let misused: Vec<&str> = parsed
            .variables()
            .into_iter()
            .filter(|v| expr::is_builtin(v) && !declared.contains(v))
            .collect();
        if !misused.is_empty() {
            out.push(
                Violation::new(
                    ViolationKind::UnknownReference,
                    format!("equation of '{}' uses functions as values: {}", owner, misused.join(", ")),
                )
                .at(owner)
                .with_related(misused),
            );
        }
    }
}
