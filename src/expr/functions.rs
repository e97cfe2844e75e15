//! The fixed, exhaustive set of functions an equation may call.
//!
//! Every function is a pure mapping from `f64` arguments to an `f64` result.
//! There is no access to the host environment, the clock, or any source of
//! randomness from here.
use super::error::EvalError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Builtin {
    Min,
    Max,
    Abs,
    Sqrt,
    Exp,
    Log,
    Log10,
    Sin,
    Cos,
    Tan,
    Pow,
    Floor,
    Ceil,
    Clip,
    IfThenElse,
    Step,
    Pulse,
    Ramp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(1) => write!(f, "exactly 1 argument"),
            Arity::Exact(n) => write!(f, "exactly {} arguments", n),
            Arity::AtLeast(n) => write!(f, "at least {} arguments", n),
        }
    }
}

impl Builtin {
    pub const ALL: [Builtin; 18] = [
        Builtin::Min,
        Builtin::Max,
        Builtin::Abs,
        Builtin::Sqrt,
        Builtin::Exp,
        Builtin::Log,
        Builtin::Log10,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Pow,
        Builtin::Floor,
        Builtin::Ceil,
        Builtin::Clip,
        Builtin::IfThenElse,
        Builtin::Step,
        Builtin::Pulse,
        Builtin::Ramp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Abs => "abs",
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Log10 => "log10",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Pow => "pow",
            Builtin::Floor => "floor",
            Builtin::Ceil => "ceil",
            Builtin::Clip => "clip",
            Builtin::IfThenElse => "if_then_else",
            Builtin::Step => "step",
            Builtin::Pulse => "pulse",
            Builtin::Ramp => "ramp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    pub fn arity(self) -> Arity {
        match self {
            Builtin::Min | Builtin::Max => Arity::AtLeast(2),
            Builtin::Pow => Arity::Exact(2),
            Builtin::Clip | Builtin::IfThenElse | Builtin::Step | Builtin::Ramp => Arity::Exact(3),
            Builtin::Pulse => Arity::Exact(4),
            _ => Arity::Exact(1),
        }
    }

    /// Applies the function to already-evaluated arguments.
    ///
    /// The caller guarantees `args.len()` satisfies [`Builtin::arity`]; the
    /// parser rejects every other call shape.
    pub fn apply(self, args: &[f64]) -> Result<f64, EvalError> {
        let value = match self {
            Builtin::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Builtin::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Builtin::Abs => args[0].abs(),
            Builtin::Sqrt => {
                if args[0] < 0.0 {
                    return Err(EvalError::domain("sqrt", format!("square root of negative value {}", args[0])));
                }
                args[0].sqrt()
            }
            Builtin::Exp => args[0].exp(),
            Builtin::Log | Builtin::Log10 => {
                if args[0] <= 0.0 {
                    return Err(EvalError::domain(self.name(), format!("logarithm of non-positive value {}", args[0])));
                }
                if self == Builtin::Log { args[0].ln() } else { args[0].log10() }
            }
            Builtin::Sin => args[0].sin(),
            Builtin::Cos => args[0].cos(),
            Builtin::Tan => args[0].tan(),
            Builtin::Pow => args[0].powf(args[1]),
            Builtin::Floor => args[0].floor(),
            Builtin::Ceil => args[0].ceil(),
            Builtin::Clip => args[1].max(args[2].min(args[0])),
            Builtin::IfThenElse => if args[0] != 0.0 { args[1] } else { args[2] },
            Builtin::Step => if args[0] >= args[1] { args[2] } else { 0.0 },
            Builtin::Pulse => {
                let (t, start, duration, height) = (args[0], args[1], args[2], args[3]);
                if start <= t && t < start + duration { height } else { 0.0 }
            }
            Builtin::Ramp => args[2] * (args[0] - args[1]).max(0.0),
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EvalError::domain(self.name(), format!("result is not finite for arguments {:?}", args)))
        }
    }
}

pub fn is_builtin(name: &str) -> bool {
    Builtin::from_name(name).is_some()
}
