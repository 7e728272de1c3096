//! General polynomial expression (GPE) predicates: monomial/polynomial tests, degree, and
//! coefficient extraction. All of them expect simplified input.

use super::expr::MathObj;
use super::simplify::simplify;

/// True when `u` is a monomial in the given generalized variables.
pub fn is_monomial(u: &MathObj, vars: &[MathObj]) -> bool {
    if vars.contains(u) {
        return true;
    }
    if let MathObj::Power(base, exp) = u {
        if vars.contains(base) {
            return matches!(&**exp, MathObj::Int(n) if *n > 1);
        }
    }
    if let MathObj::Product(ops) = u {
        return ops.iter().all(|op| is_monomial(op, vars));
    }
    vars.iter().all(|var| u.free_of(var))
}

/// True when `u` is a sum of monomials in the given generalized variables.
pub fn is_polynomial(u: &MathObj, vars: &[MathObj]) -> bool {
    match u {
        MathObj::Sum(ops) => {
            if vars.contains(u) {
                return true;
            }
            ops.iter().all(|op| is_monomial(op, vars))
        }
        _ => is_monomial(u, vars),
    }
}

/// The degree of a monomial: the sum of the exponents of the generalized variables in it.
/// `None` when `u` is not a monomial in `vars`.
fn monomial_degree(u: &MathObj, vars: &[MathObj]) -> Option<i64> {
    if vars.contains(u) {
        return Some(1);
    }
    if let MathObj::Power(base, exp) = u {
        if vars.contains(base) {
            if let MathObj::Int(n) = &**exp {
                if *n > 1 {
                    return n.to_i64();
                }
            }
            return None;
        }
    }
    if let MathObj::Product(ops) = u {
        return ops.iter().map(|op| monomial_degree(op, vars)).sum();
    }
    if vars.iter().all(|var| u.free_of(var)) {
        Some(0)
    } else {
        None
    }
}

/// The degree of a GPE: the maximum monomial degree across the sum. `None` when `u` is not a
/// polynomial in `vars`.
pub fn gpe_deg(u: &MathObj, vars: &[MathObj]) -> Option<i64> {
    match u {
        MathObj::Sum(ops) if !vars.contains(u) => ops
            .iter()
            .map(|op| monomial_degree(op, vars))
            .try_fold(i64::MIN, |acc, deg| deg.map(|d| acc.max(d))),
        _ => monomial_degree(u, vars),
    }
}

/// The coefficient and degree of a monomial in the single variable `x`: `7*x^2` in `x` is
/// `(7, 2)`. `None` when `u` is not a monomial in `x`.
fn monomial_coefficient(u: &MathObj, x: &MathObj) -> Option<(MathObj, i64)> {
    if u == x {
        return Some((MathObj::integer(1), 1));
    }
    if let MathObj::Power(base, exp) = u {
        if **base == *x {
            if let MathObj::Int(n) = &**exp {
                if *n > 1 {
                    return Some((MathObj::integer(1), n.to_i64()?));
                }
            }
            return None;
        }
    }
    if let MathObj::Product(ops) = u {
        let mut degree = 0;
        let mut coefficient_ops = Vec::new();
        for op in ops {
            let (_, d) = monomial_coefficient(op, x)?;
            if d == 0 {
                coefficient_ops.push(op.clone());
            } else {
                degree += d;
            }
        }
        let coefficient = match coefficient_ops.len() {
            0 => MathObj::integer(1),
            1 => coefficient_ops.into_iter().next()?,
            _ => MathObj::Product(coefficient_ops),
        };
        return Some((coefficient, degree));
    }
    if u.free_of(x) {
        Some((u.clone(), 0))
    } else {
        None
    }
}

/// The summed coefficient of `x^j` in the GPE `u`. `None` when `u` is not a polynomial in `x`.
pub fn coef_gpe(u: &MathObj, x: &MathObj, j: i64) -> Option<MathObj> {
    let monomials: Vec<&MathObj> = match u {
        MathObj::Sum(ops) if u != x => ops.iter().collect(),
        other => vec![other],
    };

    let mut matching = Vec::new();
    for monomial in monomials {
        let (coefficient, degree) = monomial_coefficient(monomial, x)?;
        if degree == j {
            matching.push(coefficient);
        }
    }
    Some(match matching.len() {
        0 => MathObj::integer(0),
        1 => matching.into_iter().next().unwrap_or(MathObj::integer(0)),
        _ => simplify(&MathObj::Sum(matching)),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    /// `3*x^2*y`, already in canonical form.
    fn sample_monomial() -> MathObj {
        MathObj::Product(vec![
            MathObj::integer(3),
            MathObj::power(sym("x"), MathObj::integer(2)),
            sym("y"),
        ])
    }

    #[test]
    fn monomial_predicate() {
        let vars = [sym("x"), sym("y")];
        assert!(is_monomial(&sample_monomial(), &vars));
        assert!(is_monomial(&MathObj::integer(5), &vars));
        // sin(x) depends on x without being a power of it
        let call = MathObj::Func("sin".to_string(), vec![sym("x")]);
        assert!(!is_monomial(&call, &[sym("x")]));
    }

    #[test]
    fn polynomial_predicate() {
        let poly = MathObj::Sum(vec![
            MathObj::power(sym("x"), MathObj::integer(2)),
            MathObj::Product(vec![MathObj::integer(2), sym("x")]),
            MathObj::integer(1),
        ]);
        assert!(is_polynomial(&poly, &[sym("x")]));

        let not_poly = MathObj::Sum(vec![
            MathObj::Func("sin".to_string(), vec![sym("x")]),
            MathObj::integer(1),
        ]);
        assert!(!is_polynomial(&not_poly, &[sym("x")]));
    }

    #[test]
    fn degree() {
        let vars = [sym("x"), sym("y")];
        assert_eq!(gpe_deg(&sample_monomial(), &vars), Some(3));

        let poly = MathObj::Sum(vec![
            MathObj::power(sym("x"), MathObj::integer(4)),
            sym("x"),
        ]);
        assert_eq!(gpe_deg(&poly, &[sym("x")]), Some(4));
    }

    #[test]
    fn coefficient_extraction() {
        // x^2 + 2*x + 1 in x
        let poly = MathObj::Sum(vec![
            MathObj::integer(1),
            MathObj::Product(vec![MathObj::integer(2), sym("x")]),
            MathObj::power(sym("x"), MathObj::integer(2)),
        ]);
        assert_eq!(coef_gpe(&poly, &sym("x"), 1), Some(MathObj::integer(2)));
        assert_eq!(coef_gpe(&poly, &sym("x"), 2), Some(MathObj::integer(1)));
        assert_eq!(coef_gpe(&poly, &sym("x"), 5), Some(MathObj::integer(0)));
    }

    #[test]
    fn non_polynomials_have_no_degree() {
        let call = MathObj::Func("sin".to_string(), vec![sym("x")]);
        assert_eq!(gpe_deg(&call, &[sym("x")]), None);
        assert_eq!(coef_gpe(&call, &sym("x"), 1), None);
    }
}
