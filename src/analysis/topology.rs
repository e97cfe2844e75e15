//! Dependency ordering of the per-step computed variables.
//!
//! Every declared variable becomes a node; an edge runs from an equation's
//! owner to each declared variable its equation names. Stocks and parameters
//! have no equation, so only auxiliaries and flows can take part in a cycle.
use crate::expr;
use crate::model::{ModelDocument, VariableKind};
use petgraph::algo::{has_path_connecting, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarNode {
    pub id: String,
    pub kind: VariableKind,
    /// Position within the declaration list of `kind`.
    pub index: usize,
}

/// A variable recomputed at every evaluation, by declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Computed {
    Auxiliary(usize),
    Flow(usize),
}

pub struct DependencyGraph {
    graph: DiGraph<VarNode, ()>,
    lookup: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Builds the graph. Names that are not declared (builtins, `time`,
    /// unknown references) add no edge; a repeated id resolves to its first
    /// declaration.
    pub fn build(doc: &ModelDocument) -> Self {
        let mut graph = DiGraph::new();
        let mut lookup = HashMap::new();

        // Node order doubles as tie-break order: leaves, then auxiliaries, then flows.
        let stocks = doc.stocks.iter().map(|s| (VariableKind::Stock, s.id.as_str()));
        let params = doc.parameters.iter().map(|p| (VariableKind::Parameter, p.id.as_str()));
        let auxes = doc.auxiliaries.iter().map(|a| (VariableKind::Auxiliary, a.id.as_str()));
        let flows = doc.flows.iter().map(|f| (VariableKind::Flow, f.id.as_str()));

        let mut counters: HashMap<VariableKind, usize> = HashMap::new();
        for (kind, id) in stocks.chain(params).chain(auxes).chain(flows) {
            let counter = counters.entry(kind).or_insert(0);
            let node = graph.add_node(VarNode { id: id.to_string(), kind, index: *counter });
            *counter += 1;
            lookup.entry(id.to_string()).or_insert(node);
        }

        let mut this = Self { graph, lookup };
        let owners: Vec<(NodeIndex, String)> = this
            .graph
            .node_indices()
            .filter_map(|n| {
                let node = &this.graph[n];
                let equation = match node.kind {
                    VariableKind::Auxiliary => &doc.auxiliaries[node.index].equation,
                    VariableKind::Flow => &doc.flows[node.index].equation,
                    _ => return None,
                };
                Some((n, equation.clone()))
            })
            .collect();

        for (owner, equation) in owners {
            // Unlexable equations are reported by the structure rule.
            let Ok(names) = expr::identifiers(&equation) else { continue };
            for name in names {
                if let Some(&dep) = this.lookup.get(&name) {
                    this.graph.update_edge(owner, dep, ());
                }
            }
        }
        this
    }

    pub fn node(&self, id: &str) -> Option<&VarNode> {
        self.lookup.get(id).map(|&n| &self.graph[n])
    }

    /// Declared variables `id`'s equation names directly, in declaration order.
    pub fn dependencies(&self, id: &str) -> Vec<&VarNode> {
        let Some(&n) = self.lookup.get(id) else { return Vec::new() };
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(n).collect();
        deps.sort();
        deps.into_iter().map(|d| &self.graph[d]).collect()
    }

    /// Whether `id` depends on `target`, directly or transitively.
    pub fn depends_on(&self, id: &str, target: &str) -> bool {
        match (self.lookup.get(id), self.lookup.get(target)) {
            (Some(&from), Some(&to)) => from != to && has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Every dependency cycle, each listed in declaration order.
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<NodeIndex>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc
            })
            .collect();
        cycles.sort();
        cycles
            .into_iter()
            .map(|scc| scc.into_iter().map(|n| self.graph[n].id.clone()).collect())
            .collect()
    }

    /// Returns auxiliaries and flows so that every variable follows the ones
    /// its equation reads.
    ///
    /// Depth-first post-order over the dependency edges, seeded in
    /// declaration order (auxiliaries, then flows) and visiting dependencies
    /// in declaration order, so the result is fully reproducible.
    pub fn evaluation_order(&self) -> Result<Vec<Computed>, Vec<Vec<String>>> {
        let cycles = self.cycles();
        if !cycles.is_empty() {
            return Err(cycles);
        }

        let count = self.graph.node_count();
        let mut order = Vec::new();
        let mut state = vec![VisitState::None; count];
        for n in self.graph.node_indices() {
            if state[n.index()] == VisitState::None {
                self.visit(n, &mut state, &mut order);
            }
        }
        Ok(order)
    }

    fn visit(&self, node: NodeIndex, state: &mut Vec<VisitState>, order: &mut Vec<Computed>) {
        if state[node.index()] != VisitState::None {
            return;
        }
        state[node.index()] = VisitState::Visiting;

        let mut deps: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        deps.sort();
        for dep in deps {
            self.visit(dep, state, order);
        }

        state[node.index()] = VisitState::Visited;
        let var = &self.graph[node];
        match var.kind {
            VariableKind::Auxiliary => order.push(Computed::Auxiliary(var.index)),
            VariableKind::Flow => order.push(Computed::Flow(var.index)),
            VariableKind::Stock | VariableKind::Parameter => {}
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    None,
    Visiting,
    Visited,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AuxiliaryDecl, FlowDecl, StockDecl};

    fn aux(id: &str, equation: &str) -> AuxiliaryDecl {
        AuxiliaryDecl { id: id.into(), equation: equation.into(), ..Default::default() }
    }

    fn flow(id: &str, equation: &str) -> FlowDecl {
        FlowDecl { id: id.into(), equation: equation.into(), ..Default::default() }
    }

    fn doc(auxiliaries: Vec<AuxiliaryDecl>, flows: Vec<FlowDecl>) -> ModelDocument {
        ModelDocument {
            stocks: vec![StockDecl { id: "s".into(), ..Default::default() }],
            auxiliaries,
            flows,
            ..Default::default()
        }
    }

    #[test]
    fn test_order_respects_forward_references() {
        // `a` is declared first but reads `b`.
        let d = doc(vec![aux("a", "b * 2"), aux("b", "s + 1")], vec![flow("f", "a + g"), flow("g", "b")]);
        let order = DependencyGraph::build(&d).evaluation_order().unwrap();
        assert_eq!(
            order,
            vec![Computed::Auxiliary(1), Computed::Auxiliary(0), Computed::Flow(1), Computed::Flow(0)]
        );
    }

    #[test]
    fn test_independent_variables_keep_declaration_order() {
        let d = doc(vec![aux("a", "s"), aux("b", "1")], vec![flow("f", "2")]);
        let order = DependencyGraph::build(&d).evaluation_order().unwrap();
        assert_eq!(order, vec![Computed::Auxiliary(0), Computed::Auxiliary(1), Computed::Flow(0)]);
    }

    #[test]
    fn test_cycles_are_reported() {
        let d = doc(vec![aux("a", "b"), aux("b", "a + s"), aux("c", "c * 2")], vec![flow("f", "a")]);
        let cycles = DependencyGraph::build(&d).evaluation_order().unwrap_err();
        assert_eq!(cycles, vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]);
    }

    #[test]
    fn test_transitive_dependency() {
        let d = doc(vec![aux("a", "s * 2")], vec![flow("f", "max(a, 0)"), flow("g", "time")]);
        let graph = DependencyGraph::build(&d);
        assert!(graph.depends_on("f", "s"));
        assert!(!graph.depends_on("g", "s"));
        assert!(!graph.depends_on("s", "s"));
        assert_eq!(graph.dependencies("f").iter().map(|n| n.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
    }
}
