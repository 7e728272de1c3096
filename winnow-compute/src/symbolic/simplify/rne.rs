//! Exact rational arithmetic over `Int`/`Fraction` leaves.

use crate::primitive::int;
use crate::symbolic::expr::MathObj;
use rug::ops::Pow;
use rug::Integer;

/// Builds the canonical constant for `n/d`: reduced, sign on the numerator, collapsing to an
/// integer when the denominator is 1. A zero denominator is `Undefined`.
pub fn make_rational(n: Integer, d: Integer) -> MathObj {
    if d == 0 {
        return MathObj::Undefined;
    }
    let g = n.clone().gcd(&d);
    let (mut n, mut d) = (n / &g, d / g);
    if d < 0 {
        n = -n;
        d = -d;
    }
    if d == 1 {
        MathObj::Int(n)
    } else {
        MathObj::Fraction(n, d)
    }
}

pub fn rational_add(a: &MathObj, b: &MathObj) -> Option<MathObj> {
    let ((an, ad), (bn, bd)) = (a.as_rational()?, b.as_rational()?);
    Some(make_rational(an * &bd + bn * &ad, ad * bd))
}

pub fn rational_mul(a: &MathObj, b: &MathObj) -> Option<MathObj> {
    let ((an, ad), (bn, bd)) = (a.as_rational()?, b.as_rational()?);
    Some(make_rational(an * bn, ad * bd))
}

pub fn rational_div(a: &MathObj, b: &MathObj) -> Option<MathObj> {
    let ((an, ad), (bn, bd)) = (a.as_rational()?, b.as_rational()?);
    Some(make_rational(an * bd, ad * bn))
}

/// Raises an exact rational to an integer power. `0^0` and `0^negative` are `Undefined`.
pub fn rational_pow(base: &MathObj, exp: i64) -> Option<MathObj> {
    let (n, d) = base.as_rational()?;
    if n == 0 && exp <= 0 {
        return Some(MathObj::Undefined);
    }
    let mag = u32::try_from(exp.unsigned_abs()).ok()?;
    let (np, dp) = (n.pow(mag), d.pow(mag));
    Some(if exp < 0 {
        make_rational(dp, np)
    } else {
        make_rational(np, dp)
    })
}

/// Combines two numeric constants with the given operation, staying exact when both sides are
/// rational and falling back to float arithmetic when either is a float.
pub fn combine(a: &MathObj, b: &MathObj, op: RationalOp) -> MathObj {
    debug_assert!(a.is_const() && b.is_const());
    let exact = match op {
        RationalOp::Add => rational_add(a, b),
        RationalOp::Mul => rational_mul(a, b),
        RationalOp::Div => rational_div(a, b),
    };
    if let Some(result) = exact {
        return result;
    }
    let (x, y) = match (a.const_value(), b.const_value()) {
        (Some(x), Some(y)) => (x, y),
        _ => return MathObj::Undefined,
    };
    MathObj::Float(match op {
        RationalOp::Add => x + y,
        RationalOp::Mul => x * y,
        RationalOp::Div => x / y,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RationalOp {
    Add,
    Mul,
    Div,
}

/// Recursively evaluates a tree restricted to rational leaves and arithmetic nodes into one
/// reduced constant. Any non-rational leaf, zero division, or non-integer exponent is
/// `Undefined`.
pub fn simplify_rne(u: &MathObj) -> MathObj {
    match u {
        MathObj::Int(_) => u.clone(),
        MathObj::Fraction(n, d) => make_rational(n.clone(), d.clone()),
        MathObj::Sum(ops) => fold(ops, RationalOp::Add),
        MathObj::Product(ops) => fold(ops, RationalOp::Mul),
        MathObj::Difference(a, b) => {
            let (a, b) = (simplify_rne(a), simplify_rne(b));
            let neg = combine(&MathObj::integer(-1), &b, RationalOp::Mul);
            rational_or_undefined(&a, &neg, RationalOp::Add)
        }
        MathObj::Quotient(a, b) => {
            let (a, b) = (simplify_rne(a), simplify_rne(b));
            rational_or_undefined(&a, &b, RationalOp::Div)
        }
        MathObj::Power(base, exp) => {
            let base = simplify_rne(base);
            match (&base, &**exp) {
                (MathObj::Undefined, _) => MathObj::Undefined,
                (_, MathObj::Int(n)) => match n.to_i64() {
                    Some(exp) => rational_pow(&base, exp).unwrap_or(MathObj::Undefined),
                    None => MathObj::Undefined,
                },
                _ => MathObj::Undefined,
            }
        }
        _ => MathObj::Undefined,
    }
}

fn fold(ops: &[MathObj], op: RationalOp) -> MathObj {
    let identity = match op {
        RationalOp::Add => MathObj::integer(0),
        _ => MathObj::integer(1),
    };
    ops.iter().map(simplify_rne).fold(identity, |acc, next| {
        rational_or_undefined(&acc, &next, op)
    })
}

fn rational_or_undefined(a: &MathObj, b: &MathObj, op: RationalOp) -> MathObj {
    if a.is_undefined() || b.is_undefined() || !a.is_const() || !b.is_const() {
        return MathObj::Undefined;
    }
    combine(a, b, op)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn exact_fraction_sum() {
        // 1/3 + 1/6 = 1/2
        let u = MathObj::Sum(vec![
            MathObj::Fraction(int(1), int(3)),
            MathObj::Fraction(int(1), int(6)),
        ]);
        assert_eq!(simplify_rne(&u), MathObj::Fraction(int(1), int(2)));
    }

    #[test]
    fn division_by_zero_is_undefined() {
        let u = MathObj::Quotient(
            Box::new(MathObj::integer(1)),
            Box::new(MathObj::integer(0)),
        );
        assert_eq!(simplify_rne(&u), MathObj::Undefined);
    }

    #[test]
    fn negative_powers_invert() {
        let u = MathObj::power(MathObj::integer(2), MathObj::integer(-2));
        assert_eq!(simplify_rne(&u), MathObj::Fraction(int(1), int(4)));
    }

    #[test]
    fn denominator_one_collapses_to_int() {
        assert_eq!(make_rational(int(6), int(3)), MathObj::Int(int(2)));
        assert_eq!(make_rational(int(1), int(-2)), MathObj::Fraction(int(-1), int(2)));
    }
}
