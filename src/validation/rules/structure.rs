//! Field-level well-formedness: presence, patterns, bounds, duplicates and
//! equation syntax.
use super::RuleContext;
use crate::expr::{self, EvalError};
use crate::model::{TimeConfig, VariableKind};
use crate::validation::error::{Violation, ViolationKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const ID_PATTERN: &str = "^[a-z][a-z0-9_]*$";
pub const MAX_ID_LEN: usize = 50;
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_UNIT_LEN: usize = 30;
pub const MAX_DESCRIPTION_LEN: usize = 200;
pub const MAX_EQUATION_LEN: usize = 500;
pub const MIN_MODEL_DESCRIPTION_LEN: usize = 10;
pub const MAX_MODEL_DESCRIPTION_LEN: usize = 500;

/// Names every equation can read without declaring them.
pub const TIME_NAMES: [&str; 2] = ["time", "t"];

static ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(ID_PATTERN).expect("identifier pattern must compile"));

fn structural(message: String) -> Violation {
    Violation::new(ViolationKind::StructuralError, message)
}

pub(crate) fn check(ctx: &RuleContext, out: &mut Vec<Violation>) {
    check_model_fields(ctx, out);
    check_counts(ctx, out);
    check_declarations(ctx, out);
    check_duplicates(ctx, out);
    check_flow_shape(ctx, out);
    check_equations(ctx, out);
    if let Some(time) = &ctx.doc.time {
        check_time(time, out);
    }
}

fn check_model_fields(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let doc = ctx.doc;
    if let Some(company) = &doc.company {
        if !company.trim().eq_ignore_ascii_case(ctx.schema.name) {
            out.push(
                structural(format!("model declares company '{}' but is validated as '{}'", company, ctx.schema.name))
                    .at("company"),
            );
        }
    }
    let name_len = doc.name.chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
        out.push(structural(format!("model name must be 1-{} characters, got {}", MAX_NAME_LEN, name_len)).at("name"));
    }
    let desc_len = doc.description.chars().count();
    if !(MIN_MODEL_DESCRIPTION_LEN..=MAX_MODEL_DESCRIPTION_LEN).contains(&desc_len) {
        out.push(
            structural(format!(
                "model description must be {}-{} characters, got {}",
                MIN_MODEL_DESCRIPTION_LEN, MAX_MODEL_DESCRIPTION_LEN, desc_len
            ))
            .at("description"),
        );
    }
}

fn check_counts(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let doc = ctx.doc;
    let counts = [
        (VariableKind::Stock, doc.stocks.len(), 1),
        (VariableKind::Flow, doc.flows.len(), 1),
        (VariableKind::Parameter, doc.parameters.len(), 0),
        (VariableKind::Auxiliary, doc.auxiliaries.len(), 0),
    ];
    for (kind, count, min) in counts {
        let max = ctx.schema.max_count(kind);
        if count < min || count > max {
            out.push(structural(format!(
                "a {} model declares {}-{} {} entries, got {}",
                ctx.schema.name, min, max, kind, count
            )));
        }
    }
}

/// Checks shared by every declaration kind.
fn check_common(
    kind: VariableKind,
    id: &str,
    name: &str,
    unit: &str,
    description: Option<&str>,
    out: &mut Vec<Violation>,
) {
    let label = if id.is_empty() { "<missing id>" } else { id };
    let id_len = id.chars().count();
    if id_len == 0 || id_len > MAX_ID_LEN {
        out.push(structural(format!("{} id must be 1-{} characters, got {}", kind, MAX_ID_LEN, id_len)).at(label));
    } else if !ID_REGEX.is_match(id) {
        out.push(structural(format!("{} id '{}' does not match {}", kind, id, ID_PATTERN)).at(label));
    }
    if TIME_NAMES.contains(&id) || expr::is_builtin(id) {
        out.push(structural(format!("{} id '{}' is a reserved name", kind, id)).at(label));
    }
    let name_len = name.chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
        out.push(structural(format!("{} '{}' name must be 1-{} characters", kind, label, MAX_NAME_LEN)).at(label));
    }
    if unit.chars().count() > MAX_UNIT_LEN {
        out.push(structural(format!("{} '{}' unit exceeds {} characters", kind, label, MAX_UNIT_LEN)).at(label));
    }
    if description.is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN) {
        out.push(
            structural(format!("{} '{}' description exceeds {} characters", kind, label, MAX_DESCRIPTION_LEN))
                .at(label),
        );
    }
}

fn check_declarations(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let doc = ctx.doc;
    for s in &doc.stocks {
        check_common(VariableKind::Stock, &s.id, &s.name, &s.unit, s.description.as_deref(), out);
        match s.initial_value {
            None => out.push(structural(format!("stock '{}' has no initial_value", s.id)).at(&s.id)),
            Some(v) if !v.is_finite() || v < 0.0 => out.push(
                structural(format!("stock '{}' initial_value must be finite and >= 0, got {}", s.id, v)).at(&s.id),
            ),
            Some(_) => {}
        }
    }
    for f in &doc.flows {
        check_common(VariableKind::Flow, &f.id, &f.name, &f.unit, f.description.as_deref(), out);
    }
    for p in &doc.parameters {
        check_common(VariableKind::Parameter, &p.id, &p.name, &p.unit, p.description.as_deref(), out);
        match p.value {
            None => out.push(structural(format!("parameter '{}' has no value", p.id)).at(&p.id)),
            Some(v) if !v.is_finite() => {
                out.push(structural(format!("parameter '{}' value must be finite, got {}", p.id, v)).at(&p.id))
            }
            Some(_) => {}
        }
    }
    for a in &doc.auxiliaries {
        check_common(VariableKind::Auxiliary, &a.id, &a.name, &a.unit, a.description.as_deref(), out);
    }
}

fn check_duplicates(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let mut seen: HashMap<&str, VariableKind> = HashMap::new();
    for (kind, id) in ctx.doc.declared_ids() {
        if id.is_empty() {
            continue;
        }
        if let Some(first) = seen.get(id) {
            out.push(
                structural(format!("id '{}' is declared more than once (as {} and as {})", id, first, kind)).at(id),
            );
        } else {
            seen.insert(id, kind);
        }
    }
}

fn check_flow_shape(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for f in &ctx.doc.flows {
        match (&f.from_stock, &f.to_stock) {
            (None, None) => out.push(
                structural(format!("flow '{}' has neither from_stock nor to_stock and would move nothing", f.id))
                    .at(&f.id),
            ),
            (Some(from), Some(to)) if from == to => out.push(
                structural(format!("flow '{}' drains and fills the same stock '{}'", f.id, from)).at(&f.id),
            ),
            _ => {}
        }
    }
}

fn check_equations(ctx: &RuleContext, out: &mut Vec<Violation>) {
    let doc = ctx.doc;
    for (owner, equation) in doc.equations() {
        let len = equation.chars().count();
        if equation.trim().is_empty() || len > MAX_EQUATION_LEN {
            out.push(
                structural(format!("equation of '{}' must be 1-{} characters, got {}", owner, MAX_EQUATION_LEN, len))
                    .at(owner),
            );
            continue;
        }
        match expr::parse(equation) {
            Ok(_) => {}
            // A call to an undeclared name is left to the reference and
            // safety rules; a call to a declared variable is malformed here.
            Err(EvalError::UnknownIdentifier { name }) => {
                if doc.declared_ids().any(|(_, id)| id == name) {
                    out.push(
                        structural(format!("equation of '{}' calls '{}', which is a variable, not a function", owner, name))
                            .at(owner),
                    );
                }
            }
            Err(e) => out.push(structural(format!("equation of '{}' is malformed: {}", owner, e)).at(owner)),
        }
    }
}

fn check_time(time: &TimeConfig, out: &mut Vec<Violation>) {
    let mut bad = |message: String| out.push(structural(message).at("time"));
    if ![time.start, time.end, time.dt].iter().all(|v| v.is_finite()) {
        bad(format!("time bounds must be finite, got start={} end={} dt={}", time.start, time.end, time.dt));
        return;
    }
    if time.start < 0.0 {
        bad(format!("time.start must be >= 0, got {}", time.start));
    }
    if time.end <= time.start {
        bad(format!("time.end ({}) must be greater than time.start ({})", time.end, time.start));
    }
    if time.dt <= 0.0 || time.dt > 1.0 {
        bad(format!("time.dt must be in (0, 1], got {}", time.dt));
    }
}
