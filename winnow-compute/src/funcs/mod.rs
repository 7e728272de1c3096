//! The native function dictionary.
//!
//! These are the built-in functions the tokenizer recognizes by name. Most take one numeric
//! argument and collapse exact kinds to floats; `abs` and `gcd` keep exact kinds exact, and
//! the algebra bridges (`derive`, `simplify`, `subexs`) work on algebra objects.

use rug::Integer;
use std::ops::Range;
use winnow_error::{ErrKind, Error};

use crate::eval::value::Value;
use crate::primitive::int_to_f64_exact;
use crate::symbolic::{derive, simplify, MathObj};

/// Runs the named native on the given arguments. The parser only emits names from the fixed
/// dictionary, so an unknown name here is unreachable in practice.
pub fn dispatch(
    name: &str,
    args: Vec<Value>,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    match name {
        "abs" => abs(args, span, line),
        "acos" => float_unary(name, args, f64::acos, span, line),
        "asin" => float_unary(name, args, f64::asin, span, line),
        "atan" => float_unary(name, args, f64::atan, span, line),
        "avg" => {
            let numbers = floats(name, &args, 1, span, line)?;
            Ok(Value::Number(numbers.iter().sum::<f64>() / numbers.len() as f64))
        }
        "ceil" => float_unary(name, args, f64::ceil, span, line),
        "cos" => float_unary(name, args, f64::cos, span, line),
        "cosh" => float_unary(name, args, f64::cosh, span, line),
        "derive" => derive_native(args, span, line),
        "exp" => float_unary(name, args, f64::exp, span, line),
        "floor" => float_unary(name, args, f64::floor, span, line),
        "gcd" => gcd(args, span, line),
        "ln" => float_unary(name, args, f64::ln, span, line),
        "log" => log(args, span, line),
        "max" => {
            let numbers = floats(name, &args, 1, span, line)?;
            Ok(Value::Number(numbers.into_iter().fold(f64::NEG_INFINITY, f64::max)))
        }
        "min" => {
            let numbers = floats(name, &args, 1, span, line)?;
            Ok(Value::Number(numbers.into_iter().fold(f64::INFINITY, f64::min)))
        }
        "simplify" => {
            let m = algebra_arg("simplify", args, span, line)?;
            Ok(Value::Math(simplify(&m)))
        }
        "sin" => float_unary(name, args, f64::sin, span, line),
        "sinh" => float_unary(name, args, f64::sinh, span, line),
        "sqrt" => float_unary(name, args, f64::sqrt, span, line),
        "subexs" => {
            let m = algebra_arg("subexs", args, span, line)?;
            Ok(Value::Math(MathObj::List(m.subexpressions())))
        }
        "tan" => float_unary(name, args, f64::tan, span, line),
        "tanh" => float_unary(name, args, f64::tanh, span, line),
        _ => Err(Error::new(
            span.clone(),
            line,
            ErrKind::Runtime,
            format!("unknown native function '{}'", name),
        )),
    }
}

fn arity(
    name: &str,
    args: &[Value],
    expected: usize,
    span: &Range<usize>,
    line: usize,
) -> Result<(), Error> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::new(
            span.clone(),
            line,
            ErrKind::Runtime,
            format!("'{}' expected {} arguments but got {}", name, expected, args.len()),
        ))
    }
}

fn number_arg(name: &str, value: &Value, span: &Range<usize>, line: usize) -> Result<f64, Error> {
    value.coerce_number().ok_or_else(|| {
        Error::new(
            span.clone(),
            line,
            ErrKind::Type,
            format!("'{}' needs a number argument, got {}", name, value.type_name()),
        )
    })
}

fn float_unary(
    name: &str,
    args: Vec<Value>,
    f: fn(f64) -> f64,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    arity(name, &args, 1, span, line)?;
    let x = number_arg(name, &args[0], span, line)?;
    Ok(Value::Number(f(x)))
}

/// All arguments as floats, requiring at least `min` of them.
fn floats(
    name: &str,
    args: &[Value],
    min: usize,
    span: &Range<usize>,
    line: usize,
) -> Result<Vec<f64>, Error> {
    if args.len() < min {
        return Err(Error::new(
            span.clone(),
            line,
            ErrKind::Runtime,
            format!("'{}' expected at least {} argument, got {}", name, min, args.len()),
        ));
    }
    args.iter()
        .map(|arg| number_arg(name, arg, span, line))
        .collect()
}

fn algebra_arg(
    name: &str,
    mut args: Vec<Value>,
    span: &Range<usize>,
    line: usize,
) -> Result<MathObj, Error> {
    arity(name, &args, 1, span, line)?;
    match args.pop() {
        Some(Value::Math(m)) => Ok(m),
        Some(other) => Err(Error::new(
            span.clone(),
            line,
            ErrKind::Type,
            format!("'{}' needs an algebra object, got {}", name, other.type_name()),
        )),
        None => unreachable!("arity was checked"),
    }
}

/// `abs` keeps exact kinds exact instead of collapsing to floats.
fn abs(args: Vec<Value>, span: &Range<usize>, line: usize) -> Result<Value, Error> {
    arity("abs", &args, 1, span, line)?;
    match &args[0] {
        Value::Big(n) => Ok(Value::Big(n.clone().abs())),
        Value::Fraction(f) => Ok(Value::Fraction(if f.numerator() < 0 { f.neg() } else { *f })),
        other => Ok(Value::Number(number_arg("abs", other, span, line)?.abs())),
    }
}

fn gcd(args: Vec<Value>, span: &Range<usize>, line: usize) -> Result<Value, Error> {
    arity("gcd", &args, 2, span, line)?;
    let a = integer_arg("gcd", &args[0], span, line)?;
    let b = integer_arg("gcd", &args[1], span, line)?;
    let g = a.gcd(&b);
    match int_to_f64_exact(&g) {
        Some(f) => Ok(Value::Number(f)),
        None => Ok(Value::Big(g)),
    }
}

fn integer_arg(
    name: &str,
    value: &Value,
    span: &Range<usize>,
    line: usize,
) -> Result<Integer, Error> {
    match value {
        Value::Big(n) => Ok(n.clone()),
        Value::Number(n) if n.fract() == 0.0 && n.is_finite() => Ok(Integer::from(*n as i64)),
        other => Err(Error::new(
            span.clone(),
            line,
            ErrKind::Type,
            format!("'{}' needs integer arguments, got {}", name, other.type_name()),
        )),
    }
}

/// `log(x)` is base 10; `log(x, b)` uses base `b`.
fn log(args: Vec<Value>, span: &Range<usize>, line: usize) -> Result<Value, Error> {
    match args.len() {
        1 => {
            let x = number_arg("log", &args[0], span, line)?;
            Ok(Value::Number(x.log10()))
        }
        2 => {
            let x = number_arg("log", &args[0], span, line)?;
            let base = number_arg("log", &args[1], span, line)?;
            Ok(Value::Number(x.log(base)))
        }
        got => Err(Error::new(
            span.clone(),
            line,
            ErrKind::Runtime,
            format!("'log' expected 1 or 2 arguments but got {}", got),
        )),
    }
}

/// `derive(u, x)` differentiates the algebra object `u` with respect to the symbol `x`. The
/// variable may be an algebra symbol or a plain string.
fn derive_native(args: Vec<Value>, span: &Range<usize>, line: usize) -> Result<Value, Error> {
    arity("derive", &args, 2, span, line)?;
    let u = match &args[0] {
        Value::Math(m) => m.clone(),
        other => {
            return Err(Error::new(
                span.clone(),
                line,
                ErrKind::Type,
                format!("'derive' needs an algebra object, got {}", other.type_name()),
            ));
        }
    };
    let var = match &args[1] {
        Value::Math(MathObj::Sym(name)) => name.clone(),
        Value::Str(name) => name.clone(),
        other => {
            return Err(Error::new(
                span.clone(),
                line,
                ErrKind::Type,
                format!(
                    "'derive' needs a symbol to differentiate by, got {}",
                    other.type_name()
                ),
            ));
        }
    };
    Ok(Value::Math(derive(&u, &var)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use crate::numeric::Fraction;
    use super::*;

    fn call(name: &str, args: Vec<Value>) -> Result<Value, Error> {
        dispatch(name, args, &(0..1), 1)
    }

    #[test]
    fn every_dictionary_name_dispatches() {
        use winnow_parser::tokenizer::NATIVE_FUNCTIONS;
        for name in NATIVE_FUNCTIONS {
            // wrong arity everywhere, but never the unknown-name arm
            let err = call(name, vec![]).unwrap_err();
            assert!(
                !err.message.contains("unknown native"),
                "'{}' missing from dispatch",
                name
            );
        }
    }

    #[test]
    fn sqrt_of_a_fraction_collapses() {
        let v = call("sqrt", vec![Value::Fraction(Fraction::new(1, 4).unwrap())]).unwrap();
        assert_eq!(v, Value::Number(0.5));
    }

    #[test]
    fn abs_keeps_fractions_exact() {
        let v = call("abs", vec![Value::Fraction(Fraction::new(-1, 3).unwrap())]).unwrap();
        assert_eq!(v, Value::Fraction(Fraction::new(1, 3).unwrap()));
    }

    #[test]
    fn log_takes_an_optional_base() {
        assert_eq!(call("log", vec![Value::Number(100.0)]).unwrap(), Value::Number(2.0));
        assert_eq!(
            call("log", vec![Value::Number(8.0), Value::Number(2.0)]).unwrap(),
            Value::Number(3.0)
        );
    }

    #[test]
    fn gcd_of_bignumbers() {
        let v = call(
            "gcd",
            vec![Value::Number(48.0), Value::Number(18.0)],
        )
        .unwrap();
        assert_eq!(v, Value::Number(6.0));
    }

    #[test]
    fn derive_differentiates() {
        let u = crate::symbolic::parse_algebra("x^2").unwrap();
        let v = call(
            "derive",
            vec![Value::Math(u), Value::Str("x".to_string())],
        )
        .unwrap();
        assert_eq!(v.to_string(), "2*x");
    }

    #[test]
    fn avg_is_variadic() {
        let v = call(
            "avg",
            vec![Value::Number(1.0), Value::Number(2.0), Value::Number(6.0)],
        )
        .unwrap();
        assert_eq!(v, Value::Number(3.0));
    }
}
