//! Unary-operator evaluation.

use rug::Integer;
use std::ops::Range;
use winnow_error::{ErrKind, Error};
use winnow_parser::parser::ast::expr::{Unary, UnaryOp};

use crate::numeric::Exponential;
use crate::primitive::int_to_f64_exact;
use crate::symbolic::{simplify, MathObj};
use super::value::Value;
use super::{runtime, Interpreter};

pub(crate) fn eval(interp: &mut Interpreter, node: &Unary) -> Result<Value, Error> {
    let operand = interp.eval(&node.operand)?;
    match node.op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Pos => match operand {
            Value::Number(_)
            | Value::Big(_)
            | Value::Fraction(_)
            | Value::Exponential(_)
            | Value::Vector(_)
            | Value::Matrix(_)
            | Value::Math(_) => Ok(operand),
            other => Err(type_error("+", &other, &node.span, node.line)),
        },
        UnaryOp::Neg => match operand {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Big(n) => Ok(Value::Big(-n)),
            Value::Fraction(f) => Ok(Value::Fraction(f.neg())),
            Value::Exponential(e) => Ok(Value::Exponential(Exponential::new(-e.m, e.e))),
            Value::Vector(v) => Ok(Value::Vector(v.neg())),
            Value::Matrix(m) => Ok(Value::Matrix(m.neg())),
            Value::Math(m) => Ok(Value::Math(simplify(&MathObj::Product(vec![
                MathObj::integer(-1),
                m,
            ])))),
            other => Err(type_error("-", &other, &node.span, node.line)),
        },
        UnaryOp::Factorial => factorial(operand, &node.span, node.line),
    }
}

/// The largest operand `n!` will compute.
const MAX_FACTORIAL: u32 = 1 << 20;

/// `n!` for a non-negative integer operand. The result stays a plain number while it is exactly
/// representable and widens to a bignumber past that.
fn factorial(operand: Value, span: &Range<usize>, line: usize) -> Result<Value, Error> {
    let n = match &operand {
        Value::Number(n) if n.fract() == 0.0 && *n >= 0.0 => {
            if *n > MAX_FACTORIAL as f64 {
                return Err(ceiling_error(span, line));
            }
            *n as u32
        }
        Value::Big(n) if *n >= 0 => match n.to_u32() {
            Some(v) if v <= MAX_FACTORIAL => v,
            _ => return Err(ceiling_error(span, line)),
        },
        _ => {
            return Err(runtime(
                span.clone(),
                line,
                format!(
                    "factorial needs a non-negative integer, got {}",
                    operand.type_name()
                ),
            ));
        }
    };
    let result = Integer::from(Integer::factorial(n));
    match int_to_f64_exact(&result) {
        Some(f) => Ok(Value::Number(f)),
        None => Ok(Value::Big(result)),
    }
}

fn ceiling_error(span: &Range<usize>, line: usize) -> Error {
    runtime(
        span.clone(),
        line,
        format!("factorial exceeded the operand ceiling of {}", MAX_FACTORIAL),
    )
}

fn type_error(op: &str, operand: &Value, span: &Range<usize>, line: usize) -> Error {
    Error::new(
        span.clone(),
        line,
        ErrKind::Type,
        format!("cannot apply unary '{}' to {}", op, operand.type_name()),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn small_factorials_stay_plain_numbers() {
        let v = factorial(Value::Number(5.0), &(0..1), 1).unwrap();
        assert_eq!(v, Value::Number(120.0));
    }

    #[test]
    fn large_factorials_widen_to_bignumbers() {
        let v = factorial(Value::Number(25.0), &(0..1), 1).unwrap();
        assert!(matches!(v, Value::Big(_)));
        assert_eq!(v.to_string(), "15511210043330985984000000");
    }

    #[test]
    fn oversized_factorial_operands_are_rejected() {
        let err = factorial(Value::Number(1e100), &(0..1), 1).unwrap_err();
        assert_eq!(err.kind, ErrKind::Runtime);
        assert!(err.message.contains("operand ceiling"), "{}", err.message);
        let err = factorial(Value::Big(Integer::from(u64::MAX)), &(0..1), 1).unwrap_err();
        assert!(err.message.contains("operand ceiling"), "{}", err.message);
    }

    #[test]
    fn negative_factorial_is_a_runtime_error() {
        let err = factorial(Value::Number(-1.0), &(0..1), 1).unwrap_err();
        assert_eq!(err.kind, ErrKind::Runtime);
    }
}
