//! Compiles a model into a flat evaluation program.
//!
//! Every variable gets a fixed slot in a dense frame:
//! - slot 0 is the current time,
//! - then stocks, parameters, auxiliaries and flows in declaration order.
//!
//! Equations are rewritten from names to slots once, so evaluating a frame
//! never hashes a string.
use super::error::CompileError;
use crate::analysis::topology::Computed;
use crate::expr::{self, Expr, Scope};
use crate::model::{ModelDocument, VariableKind};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(pub u32);

impl Slot {
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub const TIME_SLOT: Slot = Slot(0);

impl Scope<Slot> for [f64] {
    #[inline(always)]
    fn lookup(&self, slot: &Slot) -> Option<f64> {
        self.get(slot.index()).copied()
    }
}

/// One equation to evaluate, writing its result to `slot`.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub kind: VariableKind,
    /// Declaration index within `kind`.
    pub index: usize,
    pub slot: Slot,
    pub expr: Expr<Slot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Name of each slot; slot 0 is `time`.
    pub names: Vec<String>,
    pub stock_slots: Range<usize>,
    pub parameter_slots: Range<usize>,
    pub auxiliary_slots: Range<usize>,
    pub flow_slots: Range<usize>,
    /// Declared initial stock values, by stock index.
    pub initial_stocks: Vec<f64>,
    /// Declared parameter values, by parameter index.
    pub parameters: Vec<f64>,
    /// Auxiliaries and flows in dependency order.
    pub instructions: Vec<Instruction>,
    /// Flow indices filling each stock.
    pub inflows: Vec<SmallVec<[usize; 4]>>,
    /// Flow indices draining each stock.
    pub outflows: Vec<SmallVec<[usize; 4]>>,
}

impl Program {
    pub fn slot_count(&self) -> usize {
        self.names.len()
    }

    pub fn stock_count(&self) -> usize {
        self.stock_slots.len()
    }

    pub fn stock_slot(&self, i: usize) -> Slot {
        Slot((self.stock_slots.start + i) as u32)
    }

    pub fn parameter_slot(&self, i: usize) -> Slot {
        Slot((self.parameter_slots.start + i) as u32)
    }

    pub fn auxiliary_slot(&self, i: usize) -> Slot {
        Slot((self.auxiliary_slots.start + i) as u32)
    }

    pub fn flow_slot(&self, i: usize) -> Slot {
        Slot((self.flow_slots.start + i) as u32)
    }

    /// Fresh frame with time at zero, stocks at their initial values and
    /// parameters at `parameters`. Computed slots start at zero.
    pub fn frame(&self, parameters: &[f64]) -> Vec<f64> {
        let mut frame = vec![0.0; self.slot_count()];
        frame[self.stock_slots.clone()].copy_from_slice(&self.initial_stocks);
        frame[self.parameter_slots.clone()].copy_from_slice(parameters);
        frame
    }

    /// Net rate of change of every stock given a fully evaluated frame.
    pub fn derivatives(&self, frame: &[f64], out: &mut [f64]) {
        let flows = &frame[self.flow_slots.clone()];
        for (i, d) in out.iter_mut().enumerate() {
            let gain: f64 = self.inflows[i].iter().map(|&f| flows[f]).sum();
            let loss: f64 = self.outflows[i].iter().map(|&f| flows[f]).sum();
            *d = gain - loss;
        }
    }
}

fn push_section<'s>(names: &mut Vec<String>, ids: impl Iterator<Item = &'s str>) -> Range<usize> {
    let start = names.len();
    names.extend(ids.map(str::to_string));
    start..names.len()
}

pub struct Compiler<'a> {
    doc: &'a ModelDocument,
}

impl<'a> Compiler<'a> {
    pub fn new(doc: &'a ModelDocument) -> Self {
        Self { doc }
    }

    /// Lays out slots and compiles each equation in `order`.
    pub fn compile(&self, order: &[Computed]) -> Result<Program, CompileError> {
        let doc = self.doc;
        let mut names = vec!["time".to_string()];
        let stock_slots = push_section(&mut names, doc.stocks.iter().map(|s| s.id.as_str()));
        let parameter_slots = push_section(&mut names, doc.parameters.iter().map(|p| p.id.as_str()));
        let auxiliary_slots = push_section(&mut names, doc.auxiliaries.iter().map(|a| a.id.as_str()));
        let flow_slots = push_section(&mut names, doc.flows.iter().map(|f| f.id.as_str()));

        let mut lookup: HashMap<&str, Slot> = HashMap::with_capacity(names.len() + 1);
        for (i, name) in names.iter().enumerate() {
            lookup.entry(name.as_str()).or_insert(Slot(i as u32));
        }
        lookup.insert("t", TIME_SLOT);

        let mut instructions = Vec::with_capacity(order.len());
        for &item in order {
            let (kind, index, id, equation, slot) = match item {
                Computed::Auxiliary(i) => {
                    let a = &doc.auxiliaries[i];
                    (VariableKind::Auxiliary, i, &a.id, &a.equation, auxiliary_slots.start + i)
                }
                Computed::Flow(i) => {
                    let f = &doc.flows[i];
                    (VariableKind::Flow, i, &f.id, &f.equation, flow_slots.start + i)
                }
            };
            let parsed = expr::parse(equation).map_err(|source| CompileError::Parse { owner: id.clone(), source })?;
            let expr = parsed.try_map_vars(&mut |name: &String| {
                lookup.get(name.as_str()).copied().ok_or_else(|| CompileError::UnresolvedName {
                    owner: id.clone(),
                    name: name.clone(),
                })
            })?;
            instructions.push(Instruction { kind, index, slot: Slot(slot as u32), expr });
        }

        let stock_index: HashMap<&str, usize> =
            doc.stocks.iter().enumerate().map(|(i, s)| (s.id.as_str(), i)).collect();
        let mut inflows = vec![SmallVec::new(); doc.stocks.len()];
        let mut outflows = vec![SmallVec::new(); doc.stocks.len()];
        for (fi, f) in doc.flows.iter().enumerate() {
            if let Some(&si) = f.to_stock.as_deref().and_then(|s| stock_index.get(s)) {
                inflows[si].push(fi);
            }
            if let Some(&si) = f.from_stock.as_deref().and_then(|s| stock_index.get(s)) {
                outflows[si].push(fi);
            }
        }

        Ok(Program {
            initial_stocks: doc.stocks.iter().map(|s| s.initial_value.unwrap_or(0.0)).collect(),
            parameters: doc.parameters.iter().map(|p| p.value.unwrap_or(0.0)).collect(),
            names,
            stock_slots,
            parameter_slots,
            auxiliary_slots,
            flow_slots,
            instructions,
            inflows,
            outflows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::topology::DependencyGraph;
    use crate::model::{AuxiliaryDecl, FlowDecl, ParameterDecl, StockDecl};

    fn doc() -> ModelDocument {
        ModelDocument {
            stocks: vec![
                StockDecl { id: "a".into(), initial_value: Some(10.0), ..Default::default() },
                StockDecl { id: "b".into(), initial_value: Some(0.0), ..Default::default() },
            ],
            flows: vec![FlowDecl {
                id: "transfer".into(),
                from_stock: Some("a".into()),
                to_stock: Some("b".into()),
                equation: "a * k + t * 0".into(),
                ..Default::default()
            }],
            parameters: vec![ParameterDecl { id: "k".into(), value: Some(0.5), ..Default::default() }],
            auxiliaries: vec![AuxiliaryDecl { id: "total".into(), equation: "a + b".into(), ..Default::default() }],
            ..Default::default()
        }
    }

    #[test]
    fn test_layout_and_flow_wiring() {
        let d = doc();
        let order = DependencyGraph::build(&d).evaluation_order().unwrap();
        let program = Compiler::new(&d).compile(&order).unwrap();

        assert_eq!(program.names, vec!["time", "a", "b", "k", "total", "transfer"]);
        assert_eq!(program.stock_slots, 1..3);
        assert_eq!(program.flow_slot(0), Slot(5));
        assert_eq!(program.inflows[1].as_slice(), &[0]);
        assert_eq!(program.outflows[0].as_slice(), &[0]);
        assert!(program.inflows[0].is_empty());

        let flow = program.instructions.iter().find(|i| i.kind == VariableKind::Flow).unwrap();
        let mut slots = Vec::new();
        flow.expr.for_each_var(&mut |s| slots.push(*s));
        assert_eq!(slots, vec![Slot(1), Slot(3), TIME_SLOT]);
    }

    #[test]
    fn test_frame_and_derivatives() {
        let d = doc();
        let order = DependencyGraph::build(&d).evaluation_order().unwrap();
        let program = Compiler::new(&d).compile(&order).unwrap();

        let mut frame = program.frame(&program.parameters);
        assert_eq!(frame, vec![0.0, 10.0, 0.0, 0.5, 0.0, 0.0]);
        frame[program.flow_slot(0).index()] = 2.0;
        let mut out = vec![0.0; 2];
        program.derivatives(&frame, &mut out);
        assert_eq!(out, vec![-2.0, 2.0]);
    }

    #[test]
    fn test_unresolved_name() {
        let mut d = doc();
        d.auxiliaries[0].equation = "a + ghost".into();
        let order = [Computed::Auxiliary(0)];
        let err = Compiler::new(&d).compile(&order).unwrap_err();
        assert_eq!(err, CompileError::UnresolvedName { owner: "total".into(), name: "ghost".into() });
    }
}
