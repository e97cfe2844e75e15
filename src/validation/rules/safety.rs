//! Denylist scan over raw equation text.
//!
//! The grammar already has no way to reach these names; the scan runs on the
//! unparsed string so it still holds if the grammar ever grows.
use super::RuleContext;
use crate::validation::error::{Violation, ViolationKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

pub const FORBIDDEN_WORDS: [&str; 15] = [
    "random",
    "rand",
    "randint",
    "uniform",
    "normal",
    "gauss",
    "eval",
    "exec",
    "compile",
    "import",
    "__import__",
    "open",
    "read",
    "write",
    "file",
];

static FORBIDDEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", FORBIDDEN_WORDS.map(regex::escape).join("|"));
    Regex::new(&pattern).expect("forbidden word pattern must compile")
});

/// Forbidden words occurring as whole tokens in `equation`, lowercased and
/// deduplicated.
pub fn forbidden_words(equation: &str) -> BTreeSet<String> {
    FORBIDDEN_REGEX.find_iter(equation).map(|m| m.as_str().to_ascii_lowercase()).collect()
}

pub(crate) fn check(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for (owner, equation) in ctx.doc.equations() {
        let found = forbidden_words(equation);
        if found.is_empty() {
            continue;
        }
        let found: Vec<String> = found.into_iter().collect();
        out.push(
            Violation::new(
                ViolationKind::ForbiddenFunction,
                format!("equation of '{}' uses forbidden names: {}", owner, found.join(", ")),
            )
            .at(owner)
            .with_related(found),
        );
    }
}
