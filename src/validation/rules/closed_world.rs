//! Closed-world membership: every declared id must come from the domain's
//! whitelist for its kind.
use super::RuleContext;
use crate::validation::error::{Violation, ViolationKind};

pub(crate) fn check(ctx: &RuleContext, out: &mut Vec<Violation>) {
    for (kind, id) in ctx.doc.declared_ids() {
        // Missing ids are already structural errors.
        if id.is_empty() || ctx.schema.allows(kind, id) {
            continue;
        }
        let allowed = ctx.schema.allowed_ids(kind);
        out.push(
            Violation::new(
                ViolationKind::IdentifierNotAllowed,
                format!("{} '{}' is not allowed in the {} domain", kind, id, ctx.schema.name),
            )
            .at(id)
            .with_related(allowed.iter().copied()),
        );
    }
}
