//! Canonical text rendering for runtime values, used by the REPL and by the `&`
//! concatenation operator.

use std::fmt::{self, Display, Formatter};

use super::value::Value;

/// Renders a float the way the language shows numbers: integral values without a fractional
/// part, and the IEEE specials spelled `Infinity` and `NaN`.
pub fn number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{}", n)
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", number(*n)),
            Value::Big(n) => write!(f, "{}", n),
            Value::Fraction(fr) => write!(f, "{}", fr),
            Value::Exponential(e) => write!(f, "{}", e),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Nil => write!(f, "nil"),
            Value::Absent => write!(f, "absent"),
            Value::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            Value::Vector(v) => write!(f, "{}", v),
            Value::Matrix(m) => write!(f, "{}", m),
            Value::Fn(func) => write!(f, "<fn {}>", func.declaration.name),
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Obj(obj) => write!(f, "{} instance", obj.borrow().class.name),
            Value::Math(math) => write!(f, "{}", math),
        }
    }
}

/// Canonical text rendering of any runtime value.
pub fn strof(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(number(14.0), "14");
        assert_eq!(number(3.25), "3.25");
        assert_eq!(number(-2.0), "-2");
    }

    #[test]
    fn ieee_specials() {
        assert_eq!(number(f64::INFINITY), "Infinity");
        assert_eq!(number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(number(f64::NAN), "NaN");
    }
}
