//! Tree-walking evaluation of a parsed expression against a scope.
use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::EvalError;
use super::functions::Builtin;
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::hash::BuildHasher;

/// Resolves a variable reference to its current value.
pub trait Scope<V: ?Sized> {
    fn lookup(&self, var: &V) -> Option<f64>;
}

impl<S: BuildHasher> Scope<String> for HashMap<String, f64, S> {
    fn lookup(&self, var: &String) -> Option<f64> {
        self.get(var).copied()
    }
}

impl Scope<String> for BTreeMap<String, f64> {
    fn lookup(&self, var: &String) -> Option<f64> {
        self.get(var).copied()
    }
}

/// Evaluates `expr`, failing on the first unresolved variable or math domain
/// violation. Never yields NaN or an infinity.
pub fn eval<V, S>(expr: &Expr<V>, scope: &S) -> Result<f64, EvalError>
where
    V: Display,
    S: Scope<V> + ?Sized,
{
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Var(v) => {
            let value = scope.lookup(v).ok_or_else(|| EvalError::UnknownIdentifier { name: v.to_string() })?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(EvalError::domain(v.to_string(), format!("variable holds non-finite value {}", value)))
            }
        }
        Expr::Unary { op, operand } => {
            let x = eval(operand, scope)?;
            Ok(match op {
                UnaryOp::Neg => -x,
                UnaryOp::Plus => x,
            })
        }
        Expr::Binary { op, left, right } => {
            let a = eval(left, scope)?;
            let b = eval(right, scope)?;
            binary(*op, a, b)
        }
        Expr::Call { func: Builtin::IfThenElse, args } => {
            // Only the selected branch is evaluated.
            let cond = eval(&args[0], scope)?;
            eval(if cond != 0.0 { &args[1] } else { &args[2] }, scope)
        }
        Expr::Call { func, args } => {
            let mut values: SmallVec<[f64; 4]> = SmallVec::with_capacity(args.len());
            for arg in args {
                values.push(eval(arg, scope)?);
            }
            func.apply(&values)
        }
    }
}

fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64, EvalError> {
    let truth = |c: bool| if c { 1.0 } else { 0.0 };
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(EvalError::domain("/", format!("division of {} by zero", a)));
            }
            a / b
        }
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Lt => truth(a < b),
        BinaryOp::Le => truth(a <= b),
        BinaryOp::Gt => truth(a > b),
        BinaryOp::Ge => truth(a >= b),
        BinaryOp::Eq => truth(a == b),
        BinaryOp::Ne => truth(a != b),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::domain(op.symbol(), format!("{} {} {} is not finite", a, op.symbol(), b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;
    use rstest::rstest;

    fn env(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn run(src: &str, scope: &HashMap<String, f64>) -> Result<f64, EvalError> {
        eval(&parse(src)?, scope)
    }

    #[rstest]
    #[case("1 + 2 * 3", 7.0)]
    #[case("(1 + 2) * 3", 9.0)]
    #[case("-2 ** 2", -4.0)]
    #[case("2 ** 3 ** 2", 512.0)]
    #[case("10 / 4", 2.5)]
    #[case("3 > 2", 1.0)]
    #[case("3 <= 2", 0.0)]
    #[case("2 == 2.0", 1.0)]
    #[case("1 + 1 != 2", 0.0)]
    #[case("--3", 3.0)]
    #[case("+4 - -1", 5.0)]
    #[case("clip(15, 0, 10)", 10.0)]
    fn test_arithmetic(#[case] src: &str, #[case] expected: f64) {
        assert_eq!(run(src, &HashMap::new()).unwrap(), expected);
    }

    #[test]
    fn test_variables_resolve_from_scope() {
        let scope = env(&[("a", 2.0), ("b", 3.0)]);
        assert_eq!(run("a * b + 1", &scope).unwrap(), 7.0);
    }

    #[test]
    fn test_if_then_else_is_lazy() {
        let scope = env(&[("x", 0.0)]);
        assert_eq!(run("if_then_else(x > 0, 1 / x, 42)", &scope).unwrap(), 42.0);
        assert_eq!(run("if_then_else(x, missing, 1)", &scope).unwrap(), 1.0);
    }

    #[test]
    fn test_unknown_variable() {
        assert_eq!(
            run("a + ghost", &env(&[("a", 1.0)])).unwrap_err(),
            EvalError::UnknownIdentifier { name: "ghost".into() }
        );
    }

    #[rstest]
    #[case("1 / 0")]
    #[case("1 / (a - a)")]
    #[case("log(0)")]
    #[case("sqrt(-a)")]
    #[case("10 ** 400")]
    #[case("exp(a * 1000)")]
    fn test_domain_errors(#[case] src: &str) {
        let err = run(src, &env(&[("a", 1.0)])).unwrap_err();
        assert!(matches!(err, EvalError::Domain { .. }), "{:?}", err);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let err = run("a + 1", &env(&[("a", f64::NAN)])).unwrap_err();
        assert!(matches!(err, EvalError::Domain { .. }));
    }
}
