//! The expression tree produced by the parser.
//!
//! `Expr` is generic over how a variable is named. The parser produces
//! `Expr<String>`; the program compiler rewrites that into `Expr<Slot>` so the
//! simulation hot loop reads a dense frame instead of hashing names.
use super::functions::Builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "**",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<V = String> {
    Number(f64),
    Var(V),
    Unary { op: UnaryOp, operand: Box<Expr<V>> },
    Binary { op: BinaryOp, left: Box<Expr<V>>, right: Box<Expr<V>> },
    Call { func: Builtin, args: Vec<Expr<V>> },
}

impl<V> Expr<V> {
    /// Visits every variable reference, left to right.
    pub fn for_each_var<'a>(&'a self, f: &mut impl FnMut(&'a V)) {
        match self {
            Expr::Number(_) => {}
            Expr::Var(v) => f(v),
            Expr::Unary { operand, .. } => operand.for_each_var(f),
            Expr::Binary { left, right, .. } => {
                left.for_each_var(f);
                right.for_each_var(f);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.for_each_var(f);
                }
            }
        }
    }

    /// Rebuilds the tree with every variable mapped through `f`, stopping at
    /// the first failure.
    pub fn try_map_vars<W, E>(&self, f: &mut impl FnMut(&V) -> Result<W, E>) -> Result<Expr<W>, E> {
        Ok(match self {
            Expr::Number(n) => Expr::Number(*n),
            Expr::Var(v) => Expr::Var(f(v)?),
            Expr::Unary { op, operand } => Expr::Unary { op: *op, operand: Box::new(operand.try_map_vars(f)?) },
            Expr::Binary { op, left, right } => Expr::Binary {
                op: *op,
                left: Box::new(left.try_map_vars(f)?),
                right: Box::new(right.try_map_vars(f)?),
            },
            Expr::Call { func, args } => {
                let mut mapped = Vec::with_capacity(args.len());
                for arg in args {
                    mapped.push(arg.try_map_vars(f)?);
                }
                Expr::Call { func: *func, args: mapped }
            }
        })
    }
}

impl Expr<String> {
    /// Distinct variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        self.for_each_var(&mut |v| {
            if !names.contains(&v.as_str()) {
                names.push(v.as_str());
            }
        });
        names
    }
}
