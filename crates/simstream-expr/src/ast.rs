// crates/simstream-expr/src/ast.rs
// ============================================================================
// Module: Expression AST and Evaluator
// Description: Tree representation of a parsed expression and its
//              recursive, depth-limited evaluator.
// ============================================================================

use crate::{ExprError, Value, VariableResolver, MAX_EXPR_NESTING};

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// A parsed expression tree.
///
/// # Invariants
/// - Built only by the parser; depth is not pre-validated here and is
///   instead enforced during evaluation via a recursion counter.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal numeric value.
    Number(f64),
    /// A literal boolean value.
    Bool(bool),
    /// A literal string value.
    Str(String),
    /// A reference to a context variable.
    Name(String),
    /// `!expr`.
    Not(Box<Expr>),
    /// Unary minus.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary(BinOp, Box<Expr>, Box<Expr>),
    /// A call to the built-in `sum` helper.
    Sum(Vec<Expr>),
}

pub(crate) fn eval(expr: &Expr, resolver: &dyn VariableResolver, depth: usize) -> Result<Value, ExprError> {
    if depth > MAX_EXPR_NESTING {
        return Err(ExprError::NestingTooDeep {
            max_depth: MAX_EXPR_NESTING,
            actual_depth: depth,
        });
    }

    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Str(s) => Ok(Value::Text(s.clone())),
        Expr::Name(name) => resolver.resolve(name).ok_or_else(|| ExprError::UnknownName(name.clone())),
        Expr::Not(inner) => {
            let v = eval(inner, resolver, depth + 1)?;
            let b = v.as_bool().ok_or_else(|| type_mismatch("!", &v))?;
            Ok(Value::Bool(!b))
        }
        Expr::Neg(inner) => {
            let v = eval(inner, resolver, depth + 1)?;
            let n = v.as_number().ok_or_else(|| type_mismatch("-", &v))?;
            Ok(Value::Number(-n))
        }
        Expr::Binary(op, lhs, rhs) => {
            let l = eval(lhs, resolver, depth + 1)?;
            let r = eval(rhs, resolver, depth + 1)?;
            eval_binary(*op, l, r)
        }
        Expr::Sum(items) => {
            let mut total = 0.0;
            for item in items {
                let v = eval(item, resolver, depth + 1)?;
                total += sum_term(v)?;
            }
            Ok(Value::Number(total))
        }
    }
}

fn sum_term(value: Value) -> Result<f64, ExprError> {
    match value {
        Value::Number(n) => Ok(n),
        Value::List(items) => {
            let mut total = 0.0;
            for item in items {
                total += sum_term(item)?;
            }
            Ok(total)
        }
        other => Err(ExprError::TypeMismatch {
            op: "sum",
            detail: format!("expected a number or list of numbers, found `{other}`"),
        }),
    }
}

fn eval_binary(op: BinOp, l: Value, r: Value) -> Result<Value, ExprError> {
    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => eval_arith(op, l, r),
        BinOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
        BinOp::NotEq => Ok(Value::Bool(!values_equal(&l, &r))),
        BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => eval_ordering(op, l, r),
        BinOp::And => {
            let lb = l.as_bool().ok_or_else(|| type_mismatch("&&", &l))?;
            let rb = r.as_bool().ok_or_else(|| type_mismatch("&&", &r))?;
            Ok(Value::Bool(lb && rb))
        }
        BinOp::Or => {
            let lb = l.as_bool().ok_or_else(|| type_mismatch("||", &l))?;
            let rb = r.as_bool().ok_or_else(|| type_mismatch("||", &r))?;
            Ok(Value::Bool(lb || rb))
        }
    }
}

fn eval_arith(op: BinOp, l: Value, r: Value) -> Result<Value, ExprError> {
    let op_name = match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        _ => unreachable!("eval_arith only called for arithmetic operators"),
    };
    let ln = l.as_number().ok_or_else(|| type_mismatch(op_name, &l))?;
    let rn = r.as_number().ok_or_else(|| type_mismatch(op_name, &r))?;
    let result = match op {
        BinOp::Add => ln + rn,
        BinOp::Sub => ln - rn,
        BinOp::Mul => ln * rn,
        BinOp::Div => {
            if rn == 0.0 {
                return Err(ExprError::DivideByZero);
            }
            ln / rn
        }
        _ => unreachable!("eval_arith only called for arithmetic operators"),
    };
    Ok(Value::Number(result))
}

fn eval_ordering(op: BinOp, l: Value, r: Value) -> Result<Value, ExprError> {
    let op_name = match op {
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        _ => unreachable!("eval_ordering only called for ordering operators"),
    };
    let ln = l.as_number().ok_or_else(|| type_mismatch(op_name, &l))?;
    let rn = r.as_number().ok_or_else(|| type_mismatch(op_name, &r))?;
    let result = match op {
        BinOp::Lt => ln < rn,
        BinOp::LtEq => ln <= rn,
        BinOp::Gt => ln > rn,
        BinOp::GtEq => ln >= rn,
        _ => unreachable!("eval_ordering only called for ordering operators"),
    };
    Ok(Value::Bool(result))
}

fn values_equal(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => (a - b).abs() < f64::EPSILON,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        _ => false,
    }
}

fn type_mismatch(op: &'static str, value: &Value) -> ExprError {
    ExprError::TypeMismatch {
        op,
        detail: format!("unsupported operand `{value}`"),
    }
}
