// crates/simstream-expr/src/lexer.rs
// ============================================================================
// Module: Expression Tokenizer
// Description: Converts source text into a token stream for the parser.
// ============================================================================

use crate::ExprError;

/// A single lexical token with its byte offset in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// The kind of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    String(String),
    Ident(String),
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    AndAnd,
    OrOr,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    LParen,
    RParen,
    Comma,
    Eof,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::String(s) => format!("\"{s}\""),
            Self::Ident(name) => name.clone(),
            Self::True => "true".to_string(),
            Self::False => "false".to_string(),
            Self::Plus => "+".to_string(),
            Self::Minus => "-".to_string(),
            Self::Star => "*".to_string(),
            Self::Slash => "/".to_string(),
            Self::Bang => "!".to_string(),
            Self::AndAnd => "&&".to_string(),
            Self::OrOr => "||".to_string(),
            Self::EqEq => "==".to_string(),
            Self::NotEq => "!=".to_string(),
            Self::Lt => "<".to_string(),
            Self::LtEq => "<=".to_string(),
            Self::Gt => ">".to_string(),
            Self::GtEq => ">=".to_string(),
            Self::LParen => "(".to_string(),
            Self::RParen => ")".to_string(),
            Self::Comma => ",".to_string(),
            Self::Eof => "<eof>".to_string(),
        }
    }
}

/// Tokenizes `source` into a flat vector terminated by `TokenKind::Eof`.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let kind = match c {
            '+' => {
                i += 1;
                TokenKind::Plus
            }
            '-' => {
                i += 1;
                TokenKind::Minus
            }
            '*' => {
                i += 1;
                TokenKind::Star
            }
            '/' => {
                i += 1;
                TokenKind::Slash
            }
            '(' => {
                i += 1;
                TokenKind::LParen
            }
            ')' => {
                i += 1;
                TokenKind::RParen
            }
            ',' => {
                i += 1;
                TokenKind::Comma
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    TokenKind::NotEq
                } else {
                    i += 1;
                    TokenKind::Bang
                }
            }
            '=' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    TokenKind::EqEq
                } else {
                    return Err(ExprError::UnexpectedToken {
                        expected: "`==`",
                        found: "=".to_string(),
                        position: start,
                    });
                }
            }
            '<' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    TokenKind::LtEq
                } else {
                    i += 1;
                    TokenKind::Lt
                }
            }
            '>' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                    TokenKind::GtEq
                } else {
                    i += 1;
                    TokenKind::Gt
                }
            }
            '&' => {
                if bytes.get(i + 1) == Some(&b'&') {
                    i += 2;
                    TokenKind::AndAnd
                } else {
                    return Err(ExprError::UnexpectedToken {
                        expected: "`&&`",
                        found: "&".to_string(),
                        position: start,
                    });
                }
            }
            '|' => {
                if bytes.get(i + 1) == Some(&b'|') {
                    i += 2;
                    TokenKind::OrOr
                } else {
                    return Err(ExprError::UnexpectedToken {
                        expected: "`||`",
                        found: "|".to_string(),
                        position: start,
                    });
                }
            }
            '"' => {
                i += 1;
                let str_start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(ExprError::UnexpectedToken {
                        expected: "closing `\"`",
                        found: "<eof>".to_string(),
                        position: start,
                    });
                }
                let text = source[str_start..i].to_string();
                i += 1;
                TokenKind::String(text)
            }
            _ if c.is_ascii_digit() => {
                while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                    i += 1;
                }
                if i < bytes.len() && bytes[i] == b'.' {
                    i += 1;
                    while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                        i += 1;
                    }
                }
                let raw = &source[start..i];
                let value = raw.parse::<f64>().map_err(|_| ExprError::InvalidNumber {
                    raw: raw.to_string(),
                    position: start,
                })?;
                TokenKind::Number(value)
            }
            _ if c.is_alphabetic() || c == '_' => {
                while i < bytes.len() && ((bytes[i] as char).is_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                let raw = &source[start..i];
                match raw {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ => TokenKind::Ident(raw.to_string()),
                }
            }
            other => {
                return Err(ExprError::UnexpectedToken {
                    expected: "a valid expression token",
                    found: other.to_string(),
                    position: start,
                });
            }
        };

        tokens.push(Token { kind, position: start });
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        position: bytes.len(),
    });
    Ok(tokens)
}
