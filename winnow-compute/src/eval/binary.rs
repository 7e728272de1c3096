//! Binary-operator evaluation.
//!
//! Arithmetic is type-dispatched: exact kinds (fractions, bignumbers) stay exact when both
//! operands can be represented exactly, and fall back to floats otherwise. Algebra objects
//! build the corresponding symbolic node and simplify it. Everything else is a type error
//! naming both operand types and the operator.

use rug::Integer;
use rug::ops::Pow;
use std::ops::Range;
use winnow_error::{ErrKind, Error};
use winnow_parser::parser::ast::expr::{BinOpKind, Binary};

use crate::numeric::Fraction;
use crate::symbolic::{simplify, MathObj};
use super::value::Value;
use super::{runtime, Interpreter};

pub(crate) fn eval(interp: &mut Interpreter, node: &Binary) -> Result<Value, Error> {
    // and/or must not evaluate the right side eagerly
    match node.op.kind {
        BinOpKind::And => {
            let lhs = interp.eval(&node.lhs)?;
            if lhs.is_truthy() {
                interp.eval(&node.rhs)
            } else {
                Ok(lhs)
            }
        }
        BinOpKind::Or => {
            let lhs = interp.eval(&node.lhs)?;
            if lhs.is_truthy() {
                Ok(lhs)
            } else {
                interp.eval(&node.rhs)
            }
        }
        kind => {
            let lhs = interp.eval(&node.lhs)?;
            let rhs = interp.eval(&node.rhs)?;
            apply(kind, lhs, rhs, &node.span, node.line)
        }
    }
}

pub(crate) fn apply(
    kind: BinOpKind,
    lhs: Value,
    rhs: Value,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    match kind {
        BinOpKind::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinOpKind::NotEq => return Ok(Value::Bool(lhs != rhs)),
        BinOpKind::Concat => {
            return Ok(Value::Str(format!("{}{}", lhs, rhs)));
        }
        _ => {}
    }

    if matches!(kind, BinOpKind::Less | BinOpKind::LessEq | BinOpKind::Greater | BinOpKind::GreaterEq) {
        return compare(kind, &lhs, &rhs, span, line);
    }

    // symbolic operands pull the whole operation into the algebra system
    if matches!(lhs, Value::Math(_)) || matches!(rhs, Value::Math(_)) {
        return symbolic(kind, lhs, rhs, span, line);
    }

    match (&lhs, &rhs) {
        (Value::Fraction(a), Value::Fraction(b)) => {
            return fraction_arith(kind, *a, *b, span, line);
        }
        // an integral float joins a fraction exactly; anything else collapses to floats
        (Value::Fraction(a), Value::Number(n)) if n.fract() == 0.0 => {
            if kind == BinOpKind::Pow {
                return Value::from_fraction_pow(*a, *n as i64, span, line);
            }
            if let Some(b) = Fraction::new(*n as i64, 1) {
                return fraction_arith(kind, *a, b, span, line);
            }
        }
        (Value::Number(n), Value::Fraction(b)) if n.fract() == 0.0 && kind != BinOpKind::Pow => {
            if let Some(a) = Fraction::new(*n as i64, 1) {
                return fraction_arith(kind, a, *b, span, line);
            }
        }
        (Value::Big(a), Value::Big(b)) => {
            return big_arith(kind, a.clone(), b.clone(), span, line);
        }
        (Value::Big(a), Value::Number(n)) if n.fract() == 0.0 => {
            return big_arith(kind, a.clone(), Integer::from(*n as i64), span, line);
        }
        (Value::Number(n), Value::Big(b)) if n.fract() == 0.0 => {
            return big_arith(kind, Integer::from(*n as i64), b.clone(), span, line);
        }
        (Value::Vector(a), Value::Vector(b)) => {
            let result = match kind {
                BinOpKind::Add => a.add(b).map(Value::Vector),
                BinOpKind::Sub => a.sub(b).map(Value::Vector),
                BinOpKind::Mul => a.dot(b).map(Value::Number),
                _ => return Err(type_error(kind, &lhs, &rhs, span, line)),
            };
            return result.ok_or_else(|| {
                runtime(
                    span.clone(),
                    line,
                    format!("vector lengths differ: {} and {}", a.len(), b.len()),
                )
            });
        }
        (Value::Vector(v), Value::Number(k)) | (Value::Number(k), Value::Vector(v))
            if matches!(kind, BinOpKind::Mul) =>
        {
            return Ok(Value::Vector(v.scale(*k)));
        }
        (Value::Vector(v), Value::Number(k)) if kind == BinOpKind::Div => {
            return Ok(Value::Vector(v.scale(1.0 / k)));
        }
        (Value::Matrix(a), Value::Matrix(b)) => {
            let result = match kind {
                BinOpKind::Add => a.add(b),
                BinOpKind::Sub => a.sub(b),
                BinOpKind::Mul => a.mul(b),
                _ => return Err(type_error(kind, &lhs, &rhs, span, line)),
            };
            return result.map(Value::Matrix).ok_or_else(|| {
                runtime(
                    span.clone(),
                    line,
                    format!(
                        "matrix dimensions do not fit: {}x{} and {}x{}",
                        a.rows, a.cols, b.rows, b.cols
                    ),
                )
            });
        }
        (Value::Matrix(m), Value::Number(k)) | (Value::Number(k), Value::Matrix(m))
            if matches!(kind, BinOpKind::Mul) =>
        {
            return Ok(Value::Matrix(m.scale(*k)));
        }
        _ => {}
    }

    // everything numeric that remains collapses to floats
    match (lhs.coerce_number(), rhs.coerce_number()) {
        (Some(a), Some(b)) => Ok(Value::Number(match kind {
            BinOpKind::Add => a + b,
            BinOpKind::Sub => a - b,
            BinOpKind::Mul => a * b,
            BinOpKind::Div => a / b,
            BinOpKind::Mod => a % b,
            BinOpKind::Pow => a.powf(b),
            _ => unreachable!("comparison kinds are handled above"),
        })),
        _ => Err(type_error(kind, &lhs, &rhs, span, line)),
    }
}

fn compare(
    kind: BinOpKind,
    lhs: &Value,
    rhs: &Value,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    match (lhs.coerce_number(), rhs.coerce_number()) {
        (Some(a), Some(b)) => Ok(Value::Bool(match kind {
            BinOpKind::Less => a < b,
            BinOpKind::LessEq => a <= b,
            BinOpKind::Greater => a > b,
            BinOpKind::GreaterEq => a >= b,
            _ => unreachable!(),
        })),
        _ => match (lhs, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Bool(match kind {
                BinOpKind::Less => a < b,
                BinOpKind::LessEq => a <= b,
                BinOpKind::Greater => a > b,
                BinOpKind::GreaterEq => a >= b,
                _ => unreachable!(),
            })),
            _ => Err(type_error(kind, lhs, rhs, span, line)),
        },
    }
}

fn fraction_arith(
    kind: BinOpKind,
    a: Fraction,
    b: Fraction,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    let result = match kind {
        BinOpKind::Add => a.add(b),
        BinOpKind::Sub => a.sub(b),
        BinOpKind::Mul => a.mul(b),
        BinOpKind::Div => {
            return a.div(b).map(Value::Fraction).ok_or_else(|| {
                runtime(span.clone(), line, "division by a zero fraction".to_string())
            });
        }
        BinOpKind::Mod => return Ok(Value::Number(a.value() % b.value())),
        BinOpKind::Pow => {
            return if b.denominator() == 1 {
                Value::from_fraction_pow(a, b.numerator(), span, line)
            } else {
                Ok(Value::Number(a.value().powf(b.value())))
            };
        }
        _ => unreachable!(),
    };
    // overflow during cross-multiplication is not representable, collapse to floats
    match result {
        Some(f) => Ok(Value::Fraction(f)),
        None => Ok(Value::Number(match kind {
            BinOpKind::Add => a.value() + b.value(),
            BinOpKind::Sub => a.value() - b.value(),
            BinOpKind::Mul => a.value() * b.value(),
            _ => unreachable!(),
        })),
    }
}

impl Value {
    /// A fraction raised to an integer exponent, exactly when the result fits and as a float
    /// otherwise.
    fn from_fraction_pow(
        a: Fraction,
        exp: i64,
        span: &Range<usize>,
        line: usize,
    ) -> Result<Value, Error> {
        if a.numerator() == 0 && exp < 0 {
            return Err(runtime(
                span.clone(),
                line,
                "zero cannot be raised to a negative power exactly".to_string(),
            ));
        }
        Ok(a.pow(exp)
            .map(Value::Fraction)
            .unwrap_or_else(|| Value::Number(a.value().powi(exp as i32))))
    }
}

fn big_arith(
    kind: BinOpKind,
    a: Integer,
    b: Integer,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    match kind {
        BinOpKind::Add => Ok(Value::Big(a + b)),
        BinOpKind::Sub => Ok(Value::Big(a - b)),
        BinOpKind::Mul => Ok(Value::Big(a * b)),
        BinOpKind::Div => {
            if b == 0 {
                return Ok(Value::Number(a.to_f64() / 0.0));
            }
            if a.is_divisible(&b) {
                Ok(Value::Big(a / b))
            } else {
                Ok(Value::Number(a.to_f64() / b.to_f64()))
            }
        }
        BinOpKind::Mod => {
            if b == 0 {
                return Err(runtime(
                    span.clone(),
                    line,
                    "modulo by zero on bignumbers".to_string(),
                ));
            }
            Ok(Value::Big(a % b))
        }
        BinOpKind::Pow => match b.to_u32() {
            Some(exp) => Ok(Value::Big(a.pow(exp))),
            None => Ok(Value::Number(a.to_f64().powf(b.to_f64()))),
        },
        _ => unreachable!(),
    }
}

/// Lifts the value into the symbolic domain, builds the matching node, and simplifies.
fn symbolic(
    kind: BinOpKind,
    lhs: Value,
    rhs: Value,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    let (a, b) = match (lift(&lhs), lift(&rhs)) {
        (Some(a), Some(b)) => (a, b),
        _ => return Err(type_error(kind, &lhs, &rhs, span, line)),
    };
    let combined = match kind {
        BinOpKind::Add => MathObj::Sum(vec![a, b]),
        BinOpKind::Sub => MathObj::Difference(Box::new(a), Box::new(b)),
        BinOpKind::Mul => MathObj::Product(vec![a, b]),
        BinOpKind::Div => MathObj::Quotient(Box::new(a), Box::new(b)),
        BinOpKind::Pow => MathObj::Power(Box::new(a), Box::new(b)),
        _ => return Err(type_error(kind, &lhs, &rhs, span, line)),
    };
    Ok(Value::Math(simplify(&combined)))
}

fn lift(value: &Value) -> Option<MathObj> {
    match value {
        Value::Math(m) => Some(m.clone()),
        Value::Number(n) if n.fract() == 0.0 && n.is_finite() => {
            Some(MathObj::Int(Integer::from(*n as i64)))
        }
        Value::Number(n) => Some(MathObj::Float(*n)),
        Value::Big(n) => Some(MathObj::Int(n.clone())),
        Value::Fraction(f) => Some(MathObj::Fraction(
            Integer::from(f.numerator()),
            Integer::from(f.denominator()),
        )),
        Value::Exponential(e) => Some(MathObj::Float(e.value())),
        _ => None,
    }
}

fn type_error(
    kind: BinOpKind,
    lhs: &Value,
    rhs: &Value,
    span: &Range<usize>,
    line: usize,
) -> Error {
    Error::new(
        span.clone(),
        line,
        ErrKind::Type,
        format!(
            "cannot apply '{}' to {} and {}",
            kind.as_str(),
            lhs.type_name(),
            rhs.type_name()
        ),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn apply_at(kind: BinOpKind, lhs: Value, rhs: Value) -> Result<Value, Error> {
        apply(kind, lhs, rhs, &(0..1), 1)
    }

    fn frac(n: i64, d: i64) -> Value {
        Value::Fraction(Fraction::new(n, d).unwrap())
    }

    #[test]
    fn fraction_addition_stays_exact() {
        let sum = apply_at(BinOpKind::Add, frac(1, 3), frac(1, 6)).unwrap();
        assert_eq!(sum, frac(1, 2));
        assert_eq!(sum.to_string(), "1|2");
    }

    #[test]
    fn integral_floats_join_fractions_exactly() {
        let sum = apply_at(BinOpKind::Add, frac(1, 2), Value::Number(2.0)).unwrap();
        assert_eq!(sum, frac(5, 2));
    }

    #[test]
    fn overflowing_fractions_collapse_to_floats() {
        let tiny = frac(1, 4_000_000_000);
        let sum = apply_at(BinOpKind::Add, tiny.clone(), tiny).unwrap();
        assert_eq!(sum, Value::Number(1.0 / 2_000_000_000.0));
        let huge = frac(i64::MAX, 1);
        let product = apply_at(BinOpKind::Mul, huge.clone(), huge).unwrap();
        assert_eq!(product, Value::Number((i64::MAX as f64) * (i64::MAX as f64)));
    }

    #[test]
    fn non_integral_floats_collapse_fractions() {
        let sum = apply_at(BinOpKind::Add, frac(1, 2), Value::Number(0.25)).unwrap();
        assert_eq!(sum, Value::Number(0.75));
    }

    #[test]
    fn division_by_zero_is_infinity() {
        let quotient = apply_at(BinOpKind::Div, Value::Number(1.0), Value::Number(0.0)).unwrap();
        assert_eq!(quotient.to_string(), "Infinity");
    }

    #[test]
    fn dividing_by_a_zero_fraction_is_an_error() {
        let err = apply_at(BinOpKind::Div, frac(1, 2), frac(0, 5)).unwrap_err();
        assert_eq!(err.kind, ErrKind::Runtime);
    }

    #[test]
    fn concat_stringifies_both_sides() {
        let joined = apply_at(
            BinOpKind::Concat,
            Value::Str("x = ".to_string()),
            Value::Number(4.0),
        )
        .unwrap();
        assert_eq!(joined, Value::Str("x = 4".to_string()));
    }

    #[test]
    fn equality_compares_numerics_across_kinds() {
        let eq = apply_at(BinOpKind::Eq, frac(1, 2), Value::Number(0.5)).unwrap();
        assert_eq!(eq, Value::Bool(true));
    }

    #[test]
    fn adding_a_bool_to_a_number_is_a_type_error() {
        let err = apply_at(BinOpKind::Add, Value::Number(1.0), Value::Bool(true)).unwrap_err();
        assert_eq!(err.kind, ErrKind::Type);
        assert!(err.message.contains("'+'"), "{}", err.message);
    }

    #[test]
    fn symbolic_operands_simplify() {
        let x = Value::Math(MathObj::Sym("x".to_string()));
        let sum = apply_at(BinOpKind::Add, x.clone(), x).unwrap();
        assert_eq!(sum.to_string(), "2*x");
    }

    #[test]
    fn bignumber_arithmetic_stays_exact() {
        let a = Value::Big(Integer::from(10).pow(30));
        let b = Value::Big(Integer::from(1));
        let sum = apply_at(BinOpKind::Add, a, b).unwrap();
        assert_eq!(sum.to_string(), "1000000000000000000000000000001");
    }
}
