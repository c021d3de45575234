// crates/simstream-expr/src/lib.rs
// ============================================================================
// Module: Derived Expression Language
// Description: Safe arithmetic/boolean mini-language for `derived` generators.
// Purpose: Evaluate small expressions against a context without exposing any
//          host facility (no I/O, no reflection, no function definitions).
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//!
//! This crate implements the tiny expression language referenced by the
//! `derived` value generator: numeric/boolean arithmetic, comparisons, and a
//! single `sum(list)` helper, resolved against a flat variable context.
//! Unknown identifiers fail closed with [`ExprError::UnknownName`] rather
//! than falling back to a default value, so a misconfigured schema is
//! caught at generation time instead of silently producing `null`/`0`.
//!
//! ### Grammar (informal)
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( "||" and_expr )*
//! and_expr   := cmp_expr ( "&&" cmp_expr )*
//! cmp_expr   := add_expr ( ("==" | "!=" | "<" | "<=" | ">" | ">=") add_expr )?
//! add_expr   := mul_expr ( ("+" | "-") mul_expr )*
//! mul_expr   := unary ( ("*" | "/") unary )*
//! unary      := "!" unary | "-" unary | primary
//! primary    := number | string | "true" | "false" | ident | call | "(" expr ")"
//! call       := "sum" "(" expr ("," expr)* ")"
//! ```
//!
//! ### Example
//!
//! ```
//! use std::collections::HashMap;
//! use simstream_expr::{evaluate, MapResolver, Value};
//!
//! let mut vars = HashMap::new();
//! vars.insert("unit_price".to_string(), Value::Number(9.5));
//! vars.insert("quantity".to_string(), Value::Number(3.0));
//! let resolver = MapResolver::new(vars);
//!
//! let total = evaluate("unit_price * quantity", &resolver).unwrap();
//! assert_eq!(total, Value::Number(28.5));
//! ```

mod ast;
mod lexer;
mod parser;

use std::collections::HashMap;
use std::fmt;

pub use ast::Expr;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum allowed expression source size in bytes.
pub const MAX_EXPR_INPUT_BYTES: usize = 64 * 1024;
/// Maximum supported nesting depth for expressions.
pub const MAX_EXPR_NESTING: usize = 64;

// ============================================================================
// SECTION: Values
// ============================================================================

/// A runtime value produced or consumed by the expression evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// A 64-bit floating point number.
    Number(f64),
    /// A UTF-8 string.
    Text(String),
    /// A list of values, consumed by `sum`.
    List(Vec<Value>),
}

impl Value {
    /// Returns the value as a number, if it is numeric.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ============================================================================
// SECTION: Variable Resolution
// ============================================================================

/// Resolves identifiers referenced by an expression against a context.
///
/// Implementations must not perform I/O or reflection; resolution is
/// expected to be a pure, deterministic lookup.
pub trait VariableResolver {
    /// Looks up a variable by name. Returns `None` if the name is unbound.
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// A simple [`VariableResolver`] backed by an owned `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    vars: HashMap<String, Value>,
}

impl MapResolver {
    /// Creates a resolver from an existing variable map.
    #[must_use]
    pub const fn new(vars: HashMap<String, Value>) -> Self {
        Self { vars }
    }
}

impl VariableResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.vars.get(name).cloned()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that can occur while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    /// Input was empty or contained only whitespace.
    #[error("expression input is empty")]
    EmptyInput,
    /// Input exceeded the configured size limit.
    #[error("expression exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    InputTooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual input length in bytes.
        actual_bytes: usize,
    },
    /// Input exceeded the configured nesting depth.
    #[error("expression nesting exceeds limit: depth {actual_depth} (max {max_depth})")]
    NestingTooDeep {
        /// Maximum allowed nesting depth.
        max_depth: usize,
        /// Actual nesting depth reached.
        actual_depth: usize,
    },
    /// Unexpected token encountered during parsing.
    #[error("unexpected token `{found}` at {position}, expected {expected}")]
    UnexpectedToken {
        /// Human-friendly expectation summary.
        expected: &'static str,
        /// The token text that was actually seen.
        found: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Unexpected trailing input after a complete expression.
    #[error("unexpected trailing input at {position}")]
    TrailingInput {
        /// Byte offset where unexpected input begins.
        position: usize,
    },
    /// Numeric literal failed to parse.
    #[error("invalid numeric literal `{raw}` at {position}")]
    InvalidNumber {
        /// The raw numeric text.
        raw: String,
        /// Byte offset in the original input.
        position: usize,
    },
    /// Referenced a name that is not bound in the context.
    #[error("unknown name: {0}")]
    UnknownName(String),
    /// Referenced a function name that is not recognized.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
    /// An operator was applied to operands of the wrong type.
    #[error("type mismatch evaluating `{op}`: {detail}")]
    TypeMismatch {
        /// The operator or function being evaluated.
        op: &'static str,
        /// Human-readable detail about the mismatch.
        detail: String,
    },
    /// Division by zero.
    #[error("division by zero")]
    DivideByZero,
}

// ============================================================================
// SECTION: Public Entry Point
// ============================================================================

/// Parses and evaluates `source` against `resolver`, returning the result.
///
/// # Errors
///
/// Returns [`ExprError`] when the input is malformed, too large, too deeply
/// nested, references an unbound name, or applies an operator to
/// incompatible operand types.
pub fn evaluate(source: &str, resolver: &dyn VariableResolver) -> Result<Value, ExprError> {
    let expr = parse(source)?;
    eval_expr(&expr, resolver)
}

/// Parses `source` into an [`Expr`] tree without evaluating it.
///
/// # Errors
///
/// Returns [`ExprError`] on malformed, oversized, or over-nested input.
pub fn parse(source: &str) -> Result<Expr, ExprError> {
    if source.len() > MAX_EXPR_INPUT_BYTES {
        return Err(ExprError::InputTooLarge {
            max_bytes: MAX_EXPR_INPUT_BYTES,
            actual_bytes: source.len(),
        });
    }
    if source.trim().is_empty() {
        return Err(ExprError::EmptyInput);
    }
    parser::parse(source)
}

/// Evaluates a pre-parsed expression tree against `resolver`.
///
/// # Errors
///
/// Returns [`ExprError`] for unbound names or operator type mismatches.
pub fn eval_expr(expr: &Expr, resolver: &dyn VariableResolver) -> Result<Value, ExprError> {
    ast::eval(expr, resolver, 0)
}

/// Applies `params.precision` rounding semantics shared by `derived` and
/// `random_float`: round to `precision` decimal digits away from zero ties.
#[must_use]
pub fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions use unwrap/expect for clarity."
    )]

    use super::*;

    fn resolver(pairs: &[(&str, Value)]) -> MapResolver {
        let mut map = HashMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        MapResolver::new(map)
    }

    #[test]
    fn arithmetic_and_precedence() {
        let r = resolver(&[]);
        assert_eq!(evaluate("2 + 3 * 4", &r).unwrap(), Value::Number(14.0));
        assert_eq!(evaluate("(2 + 3) * 4", &r).unwrap(), Value::Number(20.0));
    }

    #[test]
    fn boolean_and_comparison() {
        let r = resolver(&[("n", Value::Number(5.0))]);
        assert_eq!(evaluate("n > 3 && n < 10", &r).unwrap(), Value::Bool(true));
        assert_eq!(evaluate("!(n > 3)", &r).unwrap(), Value::Bool(false));
    }

    #[test]
    fn sum_helper_over_list() {
        let r = resolver(&[(
            "items",
            Value::List(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.5)]),
        )]);
        assert_eq!(evaluate("sum(items)", &r).unwrap(), Value::Number(6.5));
    }

    #[test]
    fn unknown_name_fails_closed() {
        let r = resolver(&[]);
        let err = evaluate("missing + 1", &r).unwrap_err();
        assert_eq!(err, ExprError::UnknownName("missing".to_string()));
    }

    #[test]
    fn unknown_function_rejected() {
        let r = resolver(&[]);
        let err = evaluate("exec(1)", &r).unwrap_err();
        assert!(matches!(err, ExprError::UnknownFunction(name) if name == "exec"));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let r = resolver(&[]);
        assert_eq!(evaluate("1 / 0", &r).unwrap_err(), ExprError::DivideByZero);
    }

    #[test]
    fn rounding_matches_precision() {
        assert!((round_to_precision(1.23456, 2) - 1.23).abs() < 1e-9);
    }
}
