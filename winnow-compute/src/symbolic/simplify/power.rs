//! Power simplification: the base/exponent special cases, exact rational evaluation, nested
//! powers, and distribution of integer exponents over products.

use super::product::simplify_product;
use super::rne::rational_pow;
use crate::symbolic::expr::MathObj;

/// Simplifies `base ^ exp` with both parts already simplified.
pub fn simplify_power(base: MathObj, exp: MathObj) -> MathObj {
    if base.is_undefined() || exp.is_undefined() {
        return MathObj::Undefined;
    }

    if base.is_int_value(0) {
        // 0^positive = 0; 0^0 and 0^negative are undefined
        return match exp.const_value() {
            Some(v) if v > 0.0 => MathObj::integer(0),
            Some(_) => MathObj::Undefined,
            None => MathObj::power(base, exp),
        };
    }
    if base.is_int_value(1) {
        return MathObj::integer(1);
    }

    if let MathObj::Int(n) = &exp {
        if let Some(n) = n.to_i64() {
            return simplify_integer_power(base, n);
        }
    }

    // float on either side collapses numerically
    if let (Some(b), Some(e)) = (base.const_value(), exp.const_value()) {
        if matches!(base, MathObj::Float(_)) || matches!(exp, MathObj::Float(_)) {
            return MathObj::Float(b.powf(e));
        }
    }

    MathObj::power(base, exp)
}

fn simplify_integer_power(base: MathObj, exp: i64) -> MathObj {
    if base.is_const() {
        if let MathObj::Float(b) = base {
            return MathObj::Float(b.powi(exp.clamp(i32::MIN as i64, i32::MAX as i64) as i32));
        }
        return rational_pow(&base, exp).unwrap_or(MathObj::Undefined);
    }
    if exp == 0 {
        return MathObj::integer(1);
    }
    if exp == 1 {
        return base;
    }

    match base {
        // (v^s)^n = v^(s*n)
        MathObj::Power(inner_base, inner_exp) => {
            let product = simplify_product(vec![*inner_exp, MathObj::integer(exp)]);
            simplify_power(*inner_base, product)
        }
        // (a*b)^n distributes over the factors
        MathObj::Product(ops) => {
            let factors = ops
                .into_iter()
                .map(|op| simplify_integer_power(op, exp))
                .collect();
            simplify_product(factors)
        }
        other => MathObj::power(other, MathObj::integer(exp)),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;
    use crate::primitive::int;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    #[test]
    fn base_and_exponent_special_cases() {
        assert_eq!(
            simplify_power(MathObj::integer(0), MathObj::integer(3)),
            MathObj::integer(0)
        );
        assert_eq!(
            simplify_power(MathObj::integer(0), MathObj::integer(0)),
            MathObj::Undefined
        );
        assert_eq!(simplify_power(MathObj::integer(1), sym("x")), MathObj::integer(1));
        assert_eq!(simplify_power(sym("x"), MathObj::integer(0)), MathObj::integer(1));
        assert_eq!(simplify_power(sym("x"), MathObj::integer(1)), sym("x"));
    }

    #[test]
    fn exact_rational_evaluation() {
        assert_eq!(
            simplify_power(MathObj::integer(2), MathObj::integer(10)),
            MathObj::Int(int(1024))
        );
        assert_eq!(
            simplify_power(MathObj::integer(2), MathObj::integer(-2)),
            MathObj::Fraction(int(1), int(4))
        );
    }

    #[test]
    fn nested_powers_multiply_exponents() {
        let inner = MathObj::power(sym("x"), MathObj::integer(3));
        assert_eq!(
            simplify_power(inner, MathObj::integer(2)),
            MathObj::power(sym("x"), MathObj::integer(6))
        );
    }

    #[test]
    fn integer_exponents_distribute_over_products() {
        let base = MathObj::Product(vec![sym("x"), sym("y")]);
        assert_eq!(
            simplify_power(base, MathObj::integer(2)),
            MathObj::Product(vec![
                MathObj::power(sym("x"), MathObj::integer(2)),
                MathObj::power(sym("y"), MathObj::integer(2)),
            ])
        );
    }
}
