//! Binary operator semantics.
//!
//! The interpreter and the native backend both route every binary operation
//! through [`apply_binop`], so the two cannot disagree on a result.

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};

use crate::{ast::BinOp, error::RuntimeError, value::Value};

/// Numeric view of an operand.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn of(value: &Value) -> Number {
        match value {
            Value::Integer(n) => Number::Int(*n),
            Value::Float(n) => Number::Float(*n),
            Value::Boolean(b) => Number::Int(*b as i64),
            Value::Null | Value::List(_) => Number::Int(0),
            Value::String(_) => match Value::from_number(value.as_number()) {
                Value::Integer(n) => Number::Int(n),
                _ => Number::Float(value.as_number()),
            },
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Float(n) => n == 0.0,
        }
    }
}

/// Applies `op` to two already-evaluated operands.
///
/// `and`/`or` are accepted here for completeness and produce a boolean;
/// evaluators short-circuit them before reaching this point.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, RuntimeError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
                "{}{}",
                left.as_string(),
                right.as_string()
            ))),
            _ => arithmetic(op, Number::of(left), Number::of(right)),
        },
        BinOp::Subtract | BinOp::Multiply | BinOp::Divide => {
            arithmetic(op, Number::of(left), Number::of(right))
        }
        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan => Ok(Value::Boolean(left.as_number() < right.as_number())),
        BinOp::GreaterThan => Ok(Value::Boolean(left.as_number() > right.as_number())),
        BinOp::LessEqual => Ok(Value::Boolean(left.as_number() <= right.as_number())),
        BinOp::GreaterEqual => Ok(Value::Boolean(left.as_number() >= right.as_number())),
        BinOp::And => Ok(Value::Boolean(left.as_bool() && right.as_bool())),
        BinOp::Or => Ok(Value::Boolean(left.as_bool() || right.as_bool())),
    }
}

/// Structural for two strings or two lists, numeric otherwise.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::List(a), Value::List(b)) => a == b,
        _ => left.as_number() == right.as_number(),
    }
}

fn arithmetic(op: BinOp, left: Number, right: Number) -> Result<Value, RuntimeError> {
    if op == BinOp::Divide && right.is_zero() {
        return Err(RuntimeError::DivisionByZero);
    }

    match (left, right) {
        (Number::Int(a), Number::Int(b)) => {
            let exact = match op {
                BinOp::Add => a.checked_add(b),
                BinOp::Subtract => a.checked_sub(b),
                BinOp::Multiply => a.checked_mul(b),
                // Check if division is exact; if not, return Float
                _ if a.checked_rem(b) == Some(0) => a.checked_div(b),
                _ => None,
            };
            match exact {
                Some(n) => Ok(Value::Integer(n)),
                None => Ok(Value::Float(float_op(op, a as f64, b as f64))),
            }
        }
        (Number::Float(a), Number::Float(b)) => Ok(Value::Float(float_op(op, a, b))),
        (a, b) => {
            if let Some(result) = decimal_op(op, a, b) {
                return Ok(result);
            }
            Ok(Value::Float(float_op(op, a.as_f64(), b.as_f64())))
        }
    }
}

/// Mixed integer/float arithmetic through `Decimal`, collapsing whole results
/// to integers. `None` when either side has no exact decimal form.
fn decimal_op(op: BinOp, a: Number, b: Number) -> Option<Value> {
    let to_decimal = |n: Number| match n {
        Number::Int(i) => Decimal::from_i64(i),
        Number::Float(f) => Decimal::from_f64(f),
    };
    let ad = to_decimal(a)?;
    let bd = to_decimal(b)?;

    let rd = match op {
        BinOp::Add => ad.checked_add(bd)?,
        BinOp::Subtract => ad.checked_sub(bd)?,
        BinOp::Multiply => ad.checked_mul(bd)?,
        BinOp::Divide => ad.checked_div(bd)?,
        _ => return None,
    };

    if rd.is_integer()
        && let Some(r) = rd.to_i64()
    {
        return Some(Value::Integer(r));
    }
    rd.to_f64().map(Value::Float)
}

fn float_op(op: BinOp, a: f64, b: f64) -> f64 {
    match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        _ => a / b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinOp, l: Value, r: Value) -> Value {
        apply_binop(op, &l, &r).unwrap()
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(eval(BinOp::Add, 2.into(), 3.into()), Value::Integer(5));
        assert_eq!(eval(BinOp::Divide, 10.into(), 2.into()), Value::Integer(5));
        assert_eq!(eval(BinOp::Divide, 7.into(), 2.into()), Value::Float(3.5));
        assert_eq!(
            eval(BinOp::Add, Value::Integer(i64::MAX), 1.into()),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn test_mixed_arithmetic_collapses() {
        assert_eq!(eval(BinOp::Add, Value::Float(0.5), Value::Float(0.5)), Value::Float(1.0));
        assert_eq!(eval(BinOp::Multiply, 2.into(), Value::Float(1.5)), Value::Integer(3));
        assert_eq!(eval(BinOp::Add, 1.into(), Value::Float(0.25)), Value::Float(1.25));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval(BinOp::Add, "a".into(), 1.into()), Value::from("a1"));
        assert_eq!(eval(BinOp::Add, Value::Null, "b".into()), Value::from("nullb"));
        assert_eq!(eval(BinOp::Subtract, "5".into(), 2.into()), Value::Integer(3));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            apply_binop(BinOp::Divide, &1.into(), &0.into()),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            apply_binop(BinOp::Divide, &Value::Float(1.0), &"0".into()),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval(BinOp::Equal, "1".into(), 1.into()), Value::Boolean(true));
        assert_eq!(eval(BinOp::Equal, "a".into(), "A".into()), Value::Boolean(false));
        assert_eq!(eval(BinOp::Equal, Value::Null, 0.into()), Value::Boolean(true));
        assert_eq!(
            eval(
                BinOp::Equal,
                Value::List(vec!["x".into()]),
                Value::List(vec!["x".into()])
            ),
            Value::Boolean(true)
        );
        assert_eq!(eval(BinOp::LessThan, "2".into(), Value::Float(2.5)), Value::Boolean(true));
    }
}
