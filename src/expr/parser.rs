//! Pratt parser for the equation language.
//!
//! Binding power, loosest first: comparisons, `+ -`, `* /`, unary sign, `**`.
//! `**` is right-associative and binds tighter than a leading sign, so
//! `-2 ** 2` is `-(2 ** 2)`. Comparisons do not chain.
use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::EvalError;
use super::functions::Builtin;
use super::lexer::{tokenize, Lexeme, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

const COMPARISON_PREC: u8 = 10;
const UNARY_PREC: u8 = 40;

fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::Lt => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Lt)),
        Token::Le => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Le)),
        Token::Gt => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Gt)),
        Token::Ge => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Ge)),
        Token::EqEq => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Eq)),
        Token::BangEq => Some((COMPARISON_PREC, Assoc::Left, BinaryOp::Ne)),
        Token::Plus => Some((20, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((20, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((30, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((30, Assoc::Left, BinaryOp::Div)),
        Token::StarStar => Some((50, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

/// Bound on both parser recursion and expression tree height. Evaluation
/// recurses over the tree, so this also bounds the evaluator's stack.
pub const MAX_DEPTH: usize = 200;

/// A parsed subtree and its height.
type Node = (Expr, usize);

struct Parser {
    tokens: Vec<Lexeme>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|l| &l.token)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map_or(self.end, |l| l.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|l| l.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: Token, context: &str) -> Result<(), EvalError> {
        let at = self.position();
        match self.advance() {
            Some(t) if t == expected => Ok(()),
            Some(t) => Err(EvalError::syntax(at, format!("expected {} {}, found {}", expected, context, t))),
            None => Err(EvalError::syntax(at, format!("expected {} {}, found end of input", expected, context))),
        }
    }

    fn too_deep(&self) -> EvalError {
        EvalError::syntax(self.position(), format!("expression nests deeper than {} levels", MAX_DEPTH))
    }

    fn check_height(&self, height: usize) -> Result<usize, EvalError> {
        if height > MAX_DEPTH {
            Err(self.too_deep())
        } else {
            Ok(height)
        }
    }

    fn parse_pratt(&mut self, min_prec: u8) -> Result<Node, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.too_deep());
        }
        self.depth += 1;
        let node = self.parse_binary(min_prec);
        self.depth -= 1;
        node
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Node, EvalError> {
        let (mut left, mut height) = self.parse_prefix()?;
        let mut compared = false;

        while let Some(token) = self.peek() {
            let Some((prec, assoc, op)) = binary_op_info(token) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            let at = self.position();
            if op.is_comparison() {
                if compared {
                    return Err(EvalError::syntax(at, format!("comparison '{}' cannot be chained", op.symbol())));
                }
                compared = true;
            }
            self.advance();

            let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
            let (right, right_height) = self.parse_pratt(next_prec)?;
            height = self.check_height(1 + height.max(right_height))?;
            left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
        }

        Ok((left, height))
    }

    fn parse_prefix(&mut self) -> Result<Node, EvalError> {
        let op = match self.peek() {
            Some(Token::Minus) => UnaryOp::Neg,
            Some(Token::Plus) => UnaryOp::Plus,
            _ => return self.parse_atom(),
        };
        self.advance();
        let (operand, height) = self.parse_pratt(UNARY_PREC)?;
        let height = self.check_height(height + 1)?;
        Ok((Expr::Unary { op, operand: Box::new(operand) }, height))
    }

    fn parse_atom(&mut self) -> Result<Node, EvalError> {
        let at = self.position();
        match self.advance() {
            Some(Token::Number(n)) => Ok((Expr::Number(n), 1)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.parse_call(name, at)
                } else {
                    Ok((Expr::Var(name), 1))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_pratt(0)?;
                self.expect(Token::RParen, "to close '('")?;
                Ok(inner)
            }
            Some(t) => Err(EvalError::syntax(at, format!("unexpected {}", t))),
            None => Err(EvalError::syntax(at, "unexpected end of input")),
        }
    }

    fn parse_call(&mut self, name: String, at: usize) -> Result<Node, EvalError> {
        let func = Builtin::from_name(&name).ok_or(EvalError::UnknownIdentifier { name })?;
        self.expect(Token::LParen, "after function name")?;
        let (args, args_height) = self.parse_call_args()?;

        let arity = func.arity();
        if !arity.accepts(args.len()) {
            return Err(EvalError::syntax(
                at,
                format!("{}() takes {}, got {}", func.name(), arity, args.len()),
            ));
        }
        let height = self.check_height(args_height + 1)?;
        Ok((Expr::Call { func, args }, height))
    }

    fn parse_call_args(&mut self) -> Result<(Vec<Expr>, usize), EvalError> {
        let mut args = Vec::new();
        let mut height = 0;
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok((args, height));
        }
        loop {
            let (arg, arg_height) = self.parse_pratt(0)?;
            args.push(arg);
            height = height.max(arg_height);
            let at = self.position();
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => return Ok((args, height)),
                Some(t) => return Err(EvalError::syntax(at, format!("expected ',' or ')' in argument list, found {}", t))),
                None => return Err(EvalError::syntax(at, "unclosed argument list")),
            }
        }
    }
}

/// Parses an equation into an expression tree.
///
/// Calls are resolved against [`Builtin`] here: an unknown function name is
/// an [`EvalError::UnknownIdentifier`], a wrong argument count is a syntax
/// error. Variable names are left unresolved. Nesting past [`MAX_DEPTH`],
/// whether through parentheses, signs, calls or operator chains, is a
/// syntax error.
pub fn parse(source: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(EvalError::syntax(0, "empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0, end: source.len(), depth: 0 };
    let (expr, _) = parser.parse_pratt(0)?;
    if let Some(t) = parser.peek() {
        let msg = format!("unexpected {} after end of expression", t);
        return Err(EvalError::syntax(parser.position(), msg));
    }
    Ok(expr)
}
