//! The restricted equation language: numeric literals, identifiers,
//! arithmetic, comparisons and calls into a fixed builtin set.
//!
//! Equations are parsed into an explicit [`Expr`] tree and interpreted; no
//! host code is ever executed.
pub mod ast;
pub mod error;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{EvalError, EvalErrorKind};
pub use eval::{eval, Scope};
pub use functions::{is_builtin, Arity, Builtin};
pub use parser::parse;

use std::collections::{BTreeSet, HashMap};

/// Parses and evaluates `equation` against `environment` in one call.
pub fn evaluate(equation: &str, environment: &HashMap<String, f64>) -> Result<f64, EvalError> {
    eval(&parse(equation)?, environment)
}

/// Every distinct word token in `equation`, function names included.
///
/// Lexer based, so it works on equations that do not parse; used to report
/// references independently of syntax errors.
pub fn identifiers(equation: &str) -> Result<BTreeSet<String>, EvalError> {
    Ok(lexer::identifiers(equation)?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_with_time() {
        let env: HashMap<String, f64> =
            [("time".to_string(), 4.0), ("base".to_string(), 10.0)].into_iter().collect();
        assert_eq!(evaluate("base + step(time, 3, 5)", &env).unwrap(), 15.0);
        assert_eq!(evaluate("ramp(time, 2, 0.5)", &env).unwrap(), 1.0);
    }

    #[test]
    fn test_error_kinds() {
        let env = HashMap::new();
        assert_eq!(evaluate("1 +* 2", &env).unwrap_err().kind(), EvalErrorKind::SyntaxError);
        assert_eq!(evaluate("nope * 2", &env).unwrap_err().kind(), EvalErrorKind::UnknownIdentifier);
        assert_eq!(evaluate("log(-1)", &env).unwrap_err().kind(), EvalErrorKind::DomainError);
    }

    #[test]
    fn test_identifiers_survive_syntax_errors() {
        let ids = identifiers("max(a, b +) * c").unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c", "max"]);
    }
}
