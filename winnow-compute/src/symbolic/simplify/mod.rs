//! Automatic simplification.
//!
//! Children simplify first (post-order), then one per-variant rule fires. Every rule builds
//! canonically ordered output, so running [`simplify`] on its own result is the identity.

pub mod function;
pub mod power;
pub mod product;
pub mod rne;
pub mod sum;

use super::expr::{MathObj, Relation};
use function::simplify_function;
use power::simplify_power;
use product::simplify_product;
use rne::make_rational;
use sum::simplify_sum;

/// Simplifies an expression into canonical form.
pub fn simplify(u: &MathObj) -> MathObj {
    match u {
        MathObj::Int(_)
        | MathObj::Float(_)
        | MathObj::Sym(_)
        | MathObj::Undefined
        | MathObj::Bool(_) => u.clone(),
        MathObj::Fraction(n, d) => make_rational(n.clone(), d.clone()),
        MathObj::Relation(rel) => MathObj::Relation(Box::new(Relation {
            op: rel.op,
            lhs: simplify(&rel.lhs),
            rhs: simplify(&rel.rhs),
        })),
        MathObj::List(ops) => MathObj::List(ops.iter().map(simplify).collect()),
        MathObj::Sum(ops) => simplify_sum(ops.iter().map(simplify).collect()),
        // u - v rewrites to u + (-1)*v
        MathObj::Difference(a, b) => {
            let neg = MathObj::Product(vec![MathObj::integer(-1), (**b).clone()]);
            simplify(&MathObj::Sum(vec![(**a).clone(), neg]))
        }
        MathObj::Product(ops) => simplify_product(ops.iter().map(simplify).collect()),
        // u / v rewrites to u * v^-1
        MathObj::Quotient(a, b) => {
            let inv = MathObj::power((**b).clone(), MathObj::integer(-1));
            simplify(&MathObj::Product(vec![(**a).clone(), inv]))
        }
        MathObj::Power(base, exp) => simplify_power(simplify(base), simplify(exp)),
        MathObj::Func(name, args) => {
            simplify_function(name.clone(), args.iter().map(simplify).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    #[test]
    fn x_plus_x_is_two_x() {
        let u = MathObj::Sum(vec![sym("x"), sym("x")]);
        assert_eq!(
            simplify(&u),
            MathObj::Product(vec![MathObj::integer(2), sym("x")])
        );
    }

    #[test]
    fn x_minus_x_is_zero() {
        let u = MathObj::Difference(Box::new(sym("x")), Box::new(sym("x")));
        assert_eq!(simplify(&u), MathObj::integer(0));
    }

    #[test]
    fn quotients_rewrite_to_negative_powers() {
        // x/x = 1
        let u = MathObj::Quotient(Box::new(sym("x")), Box::new(sym("x")));
        assert_eq!(simplify(&u), MathObj::integer(1));
    }

    #[test]
    fn simplify_is_idempotent() {
        let samples = vec![
            MathObj::Sum(vec![sym("x"), sym("x"), MathObj::integer(3)]),
            MathObj::Product(vec![sym("y"), sym("x"), MathObj::integer(2)]),
            MathObj::power(
                MathObj::power(sym("x"), MathObj::integer(2)),
                MathObj::integer(3),
            ),
            MathObj::Quotient(Box::new(MathObj::integer(4)), Box::new(MathObj::integer(6))),
            MathObj::Func("sin".to_string(), vec![sym("x")]),
        ];
        for u in samples {
            let once = simplify(&u);
            assert_eq!(simplify(&once), once, "not idempotent for {}", u);
        }
    }

    #[test]
    fn exact_rational_collapse() {
        // 1/3 + 1/6 = 1/2
        let u = MathObj::Sum(vec![
            MathObj::Quotient(Box::new(MathObj::integer(1)), Box::new(MathObj::integer(3))),
            MathObj::Quotient(Box::new(MathObj::integer(1)), Box::new(MathObj::integer(6))),
        ]);
        assert_eq!(
            simplify(&u),
            MathObj::Fraction(crate::primitive::int(1), crate::primitive::int(2))
        );
    }
}
