//! Symbolic differentiation.

use super::expr::MathObj;
use super::simplify::simplify;

/// Differentiates `u` with respect to the symbol `var`, returning a simplified result.
///
/// Shapes with no rule return the unevaluated marker `deriv(u, var)` rather than erroring.
pub fn derive(u: &MathObj, var: &str) -> MathObj {
    simplify(&derive_inner(&simplify(u), var))
}

fn derive_inner(u: &MathObj, var: &str) -> MathObj {
    let x = MathObj::sym(var);
    if *u == x {
        return MathObj::integer(1);
    }
    if u.free_of(&x) {
        return MathObj::integer(0);
    }

    match u {
        MathObj::Sum(ops) => {
            MathObj::Sum(ops.iter().map(|op| derive_inner(op, var)).collect())
        }
        MathObj::Difference(a, b) => MathObj::Difference(
            Box::new(derive_inner(a, var)),
            Box::new(derive_inner(b, var)),
        ),
        // (v*w)' = v'*w + v*w', with w the rest of the operand list
        MathObj::Product(ops) => {
            let Some((v, rest)) = ops.split_first() else {
                return MathObj::integer(0);
            };
            let w = if rest.len() == 1 {
                rest[0].clone()
            } else {
                MathObj::Product(rest.to_vec())
            };
            MathObj::Sum(vec![
                MathObj::Product(vec![derive_inner(v, var), w.clone()]),
                MathObj::Product(vec![v.clone(), derive_inner(&w, var)]),
            ])
        }
        // (v/w)' = (v'*w - v*w') / w^2
        MathObj::Quotient(v, w) => {
            let numerator = MathObj::Difference(
                Box::new(MathObj::Product(vec![derive_inner(v, var), (**w).clone()])),
                Box::new(MathObj::Product(vec![(**v).clone(), derive_inner(w, var)])),
            );
            MathObj::Quotient(
                Box::new(numerator),
                Box::new(MathObj::power((**w).clone(), MathObj::integer(2))),
            )
        }
        // (v^w)': the power rule when the exponent is free of the variable, otherwise the
        // general form v^w * (w'*ln(v) + w*v'/v)
        MathObj::Power(v, w) => {
            if w.free_of(&x) {
                let reduced = MathObj::power(
                    (**v).clone(),
                    MathObj::Difference(Box::new((**w).clone()), Box::new(MathObj::integer(1))),
                );
                MathObj::Product(vec![(**w).clone(), reduced, derive_inner(v, var)])
            } else {
                let ln_v = MathObj::Func("ln".to_string(), vec![(**v).clone()]);
                let inner = MathObj::Sum(vec![
                    MathObj::Product(vec![derive_inner(w, var), ln_v]),
                    MathObj::Quotient(
                        Box::new(MathObj::Product(vec![(**w).clone(), derive_inner(v, var)])),
                        Box::new((**v).clone()),
                    ),
                ]);
                MathObj::Product(vec![u.clone(), inner])
            }
        }
        MathObj::Func(name, args) if args.len() == 1 => {
            let arg = &args[0];
            let chain = derive_inner(arg, var);
            match name.as_str() {
                "sin" => MathObj::Product(vec![
                    MathObj::Func("cos".to_string(), vec![arg.clone()]),
                    chain,
                ]),
                "cos" => MathObj::Product(vec![
                    MathObj::integer(-1),
                    MathObj::Func("sin".to_string(), vec![arg.clone()]),
                    chain,
                ]),
                "ln" => MathObj::Quotient(Box::new(chain), Box::new(arg.clone())),
                _ => deriv_marker(u, var),
            }
        }
        _ => deriv_marker(u, var),
    }
}

/// The unevaluated `deriv(u, var)` marker for shapes with no differentiation rule.
fn deriv_marker(u: &MathObj, var: &str) -> MathObj {
    MathObj::Func("deriv".to_string(), vec![u.clone(), MathObj::sym(var)])
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    #[test]
    fn power_rule() {
        // d/dx x^2 = 2*x
        let u = MathObj::power(sym("x"), MathObj::integer(2));
        assert_eq!(
            derive(&u, "x"),
            MathObj::Product(vec![MathObj::integer(2), sym("x")])
        );
    }

    #[test]
    fn sine_rule() {
        let u = MathObj::Func("sin".to_string(), vec![sym("x")]);
        assert_eq!(
            derive(&u, "x"),
            MathObj::Func("cos".to_string(), vec![sym("x")])
        );
    }

    #[test]
    fn cosine_rule() {
        let u = MathObj::Func("cos".to_string(), vec![sym("x")]);
        assert_eq!(
            derive(&u, "x"),
            MathObj::Product(vec![
                MathObj::integer(-1),
                MathObj::Func("sin".to_string(), vec![sym("x")]),
            ])
        );
    }

    #[test]
    fn log_rule_with_chain() {
        // d/dx ln(x^2) = 2*x^-1 after simplification
        let u = MathObj::Func(
            "ln".to_string(),
            vec![MathObj::power(sym("x"), MathObj::integer(2))],
        );
        assert_eq!(
            derive(&u, "x"),
            MathObj::Product(vec![
                MathObj::integer(2),
                MathObj::power(sym("x"), MathObj::integer(-1)),
            ])
        );
    }

    #[test]
    fn expressions_free_of_the_variable_collapse_to_zero() {
        let u = MathObj::Sum(vec![sym("y"), MathObj::integer(4)]);
        assert_eq!(derive(&u, "x"), MathObj::integer(0));
    }

    #[test]
    fn sum_rule() {
        // d/dx (x^2 + x) = 1 + 2*x
        let u = MathObj::Sum(vec![
            MathObj::power(sym("x"), MathObj::integer(2)),
            sym("x"),
        ]);
        assert_eq!(
            derive(&u, "x"),
            MathObj::Sum(vec![
                MathObj::integer(1),
                MathObj::Product(vec![MathObj::integer(2), sym("x")]),
            ])
        );
    }

    #[test]
    fn unknown_shapes_return_a_marker() {
        let u = MathObj::Func("tan".to_string(), vec![sym("x")]);
        let result = derive(&u, "x");
        assert_eq!(
            result,
            MathObj::Func("deriv".to_string(), vec![u, sym("x")])
        );
    }
}
