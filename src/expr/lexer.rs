//! Tokenizer for the equation language.
use super::error::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Lt,
    Le,
    Gt,
    Ge,
    EqEq,
    BangEq,
    LParen,
    RParen,
    Comma,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {}", n),
            Token::Ident(s) => write!(f, "identifier '{}'", s),
            Token::Plus => f.write_str("'+'"),
            Token::Minus => f.write_str("'-'"),
            Token::Star => f.write_str("'*'"),
            Token::StarStar => f.write_str("'**'"),
            Token::Slash => f.write_str("'/'"),
            Token::Lt => f.write_str("'<'"),
            Token::Le => f.write_str("'<='"),
            Token::Gt => f.write_str("'>'"),
            Token::Ge => f.write_str("'>='"),
            Token::EqEq => f.write_str("'=='"),
            Token::BangEq => f.write_str("'!='"),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
            Token::Comma => f.write_str("','"),
        }
    }
}

/// A token with the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub position: usize,
}

pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, EvalError> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;

        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit)) {
            i = scan_number(bytes, i)?;
            let text = &source[start..i];
            let value: f64 = text
                .parse()
                .map_err(|_| EvalError::syntax(start, format!("invalid numeric literal '{}'", text)))?;
            if !value.is_finite() {
                return Err(EvalError::syntax(start, format!("numeric literal '{}' is out of range", text)));
            }
            out.push(Lexeme { token: Token::Number(value), position: start });
            continue;
        }

        if c.is_ascii_alphabetic() || c == b'_' {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            out.push(Lexeme { token: Token::Ident(source[start..i].to_string()), position: start });
            continue;
        }

        let next = bytes.get(i + 1).copied();
        let (token, width) = match (c, next) {
            (b'*', Some(b'*')) => (Token::StarStar, 2),
            (b'<', Some(b'=')) => (Token::Le, 2),
            (b'>', Some(b'=')) => (Token::Ge, 2),
            (b'=', Some(b'=')) => (Token::EqEq, 2),
            (b'!', Some(b'=')) => (Token::BangEq, 2),
            (b'+', _) => (Token::Plus, 1),
            (b'-', _) => (Token::Minus, 1),
            (b'*', _) => (Token::Star, 1),
            (b'/', _) => (Token::Slash, 1),
            (b'<', _) => (Token::Lt, 1),
            (b'>', _) => (Token::Gt, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            (b',', _) => (Token::Comma, 1),
            _ => {
                let ch = source[start..].chars().next().unwrap_or('?');
                return Err(EvalError::syntax(start, format!("unexpected character '{}'", ch)));
            }
        };
        out.push(Lexeme { token, position: start });
        i += width;
    }

    Ok(out)
}

/// Scans `digits [. digits] [e [+-] digits]` and returns the end offset.
fn scan_number(bytes: &[u8], mut i: usize) -> Result<usize, EvalError> {
    let start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    // `2x` or `1.5e` is never a product; reject rather than guess.
    if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'_' || bytes[i] == b'.') {
        return Err(EvalError::syntax(start, "invalid numeric literal"));
    }
    Ok(i)
}

/// Every identifier token in `source`, in order of appearance, including
/// function names.
pub fn identifiers(source: &str) -> Result<Vec<String>, EvalError> {
    Ok(tokenize(source)?
        .into_iter()
        .filter_map(|l| match l.token {
            Token::Ident(name) => Some(name),
            _ => None,
        })
        .collect())
}
