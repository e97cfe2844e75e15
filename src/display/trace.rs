use crate::analysis::topology::{DependencyGraph, VarNode};
use crate::compute::SimulationResult;
use crate::model::VariableKind;
use crate::validation::ValidatedModel;
use std::collections::HashMap;
use std::fmt::Write;

/// Renders the dependency tree of `target` with every value taken at grid
/// point `index`.
///
/// Stocks expand into the flows that fill and drain them; auxiliaries and
/// flows expand into the variables their equation reads.
pub fn format_trace(model: &ValidatedModel, result: &SimulationResult, target: &str, index: usize) -> String {
    let graph = DependencyGraph::build(model.document());
    let mut tracer = Tracer { model, result, graph: &graph, index, visited_at_level: HashMap::new(), output: String::new() };

    match (graph.node(target), result.time.get(index)) {
        (Some(node), Some(t)) => {
            let _ = writeln!(tracer.output, "TRACE for '{}' at time {}:", target, t);
            let _ = writeln!(tracer.output, "--------------------------------------------------");
            tracer.trace_node(node, 1, "");
        }
        (None, _) => {
            let _ = writeln!(tracer.output, "Error: '{}' is not declared in this model", target);
        }
        (_, None) => {
            let _ = writeln!(tracer.output, "Error: grid point {} is out of range (0..{})", index, result.time.len());
        }
    }
    tracer.output
}

struct Tracer<'a> {
    model: &'a ValidatedModel,
    result: &'a SimulationResult,
    graph: &'a DependencyGraph,
    index: usize,
    visited_at_level: HashMap<String, usize>,
    output: String,
}

impl<'a> Tracer<'a> {
    fn trace_node(&mut self, node: &VarNode, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(&node.id) {
            let _ = writeln!(self.output, "{}{} -> (Ref to L{})", prefix, node.id, first_seen);
            return;
        }
        self.visited_at_level.insert(node.id.clone(), level);

        let doc = self.model.document();
        let header = format!("[L{}] {}{}", level, node.id, self.format_value(&node.id));

        match node.kind {
            VariableKind::Parameter => {
                let _ = writeln!(self.output, "{}{} -> Param", prefix, header);
            }
            VariableKind::Stock => {
                let inflows: Vec<&str> = doc
                    .flows
                    .iter()
                    .filter(|f| f.to_stock.as_deref() == Some(node.id.as_str()))
                    .map(|f| f.id.as_str())
                    .collect();
                let outflows: Vec<&str> = doc
                    .flows
                    .iter()
                    .filter(|f| f.from_stock.as_deref() == Some(node.id.as_str()))
                    .map(|f| f.id.as_str())
                    .collect();
                let mut rate = String::new();
                for id in &inflows {
                    let _ = write!(rate, " + {}", id);
                }
                for id in &outflows {
                    let _ = write!(rate, " - {}", id);
                }
                if rate.is_empty() {
                    rate.push_str(" 0");
                }
                let _ = writeln!(self.output, "{}{} -> Stock, d/dt ={}", prefix, header, rate);

                let children: Vec<&VarNode> =
                    inflows.iter().chain(&outflows).filter_map(|id| self.graph.node(id)).collect();
                self.recurse_children(prefix, &children, level);
            }
            VariableKind::Auxiliary | VariableKind::Flow => {
                let equation = match node.kind {
                    VariableKind::Flow => &doc.flows[node.index].equation,
                    _ => &doc.auxiliaries[node.index].equation,
                };
                let _ = writeln!(self.output, "{}{} = {}", prefix, header, equation);
                let children = self.graph.dependencies(&node.id);
                self.recurse_children(prefix, &children, level);
            }
        }
    }

    fn recurse_children(&mut self, prefix: &str, children: &[&VarNode], level: usize) {
        let stem = self.build_child_stem(prefix);
        for (i, &child) in children.iter().enumerate() {
            let connector = if i == children.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            self.trace_node(child, level + 1, &full_prefix);
        }
    }

    fn format_value(&self, id: &str) -> String {
        let value = self
            .result
            .series(id)
            .and_then(|s| s.get(self.index).copied())
            .or_else(|| self.result.metadata.parameters.get(id).copied());
        match value {
            Some(v) => format!("[{:.3}]", v),
            None => "[?]".to_string(),
        }
    }

    fn build_child_stem(&self, current_prefix: &str) -> String {
        current_prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::compute::simulate;
    use crate::validation::Validator;

    fn run() -> (ValidatedModel, SimulationResult) {
        let entry = catalog::get("aerodin_workforce").unwrap();
        let model = Validator::new(entry.domain).validate(&entry.document().unwrap()).unwrap();
        let result = simulate(&model, None).unwrap();
        (model, result)
    }

    #[test]
    fn test_trace_expands_stock_and_equations() {
        let (model, result) = run();
        let out = format_trace(&model, &result, "junior_engineers", 0);
        assert!(out.starts_with("TRACE for 'junior_engineers' at time 0:"));
        assert!(out.contains("[L1] junior_engineers[120.000] -> Stock, d/dt = + hiring_rate - training_completion"));
        assert!(out.contains("hiring_rate"));
        assert!(out.contains("= max(0, hiring_target * workforce_gap / max_workforce)"));
        assert!(out.contains("hiring_target[20.000] -> Param"));
        // junior_engineers is read again by total_workforce and training_completion.
        assert!(out.contains("junior_engineers -> (Ref to L1)"));
    }

    #[test]
    fn test_trace_errors() {
        let (model, result) = run();
        assert!(format_trace(&model, &result, "ghost", 0).starts_with("Error: 'ghost'"));
        assert!(format_trace(&model, &result, "junior_engineers", 10_000).starts_with("Error: grid point"));
    }
}
