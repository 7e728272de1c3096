//! Merge-based simplification of products: like bases combine by summing exponents, ones
//! drop, a zero factor collapses the whole product.

use super::power::simplify_power;
use super::rne::{combine, RationalOp};
use super::sum::simplify_sum;
use crate::symbolic::expr::MathObj;
use crate::symbolic::order::order;

/// Simplifies an n-ary product whose operands are already individually simplified.
pub fn simplify_product(ops: Vec<MathObj>) -> MathObj {
    if ops.iter().any(MathObj::is_undefined) {
        return MathObj::Undefined;
    }
    if ops.iter().any(|op| op.is_int_value(0)) {
        return MathObj::integer(0);
    }
    if ops.len() == 1 {
        return ops.into_iter().next().unwrap_or(MathObj::integer(1));
    }
    let merged = simplify_product_rec(ops);
    match merged.len() {
        0 => MathObj::integer(1),
        1 => merged.into_iter().next().unwrap_or(MathObj::integer(1)),
        _ => MathObj::Product(merged),
    }
}

fn simplify_product_rec(ops: Vec<MathObj>) -> Vec<MathObj> {
    if ops.len() == 2 {
        let mut it = ops.into_iter();
        let (u1, u2) = match (it.next(), it.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Vec::new(),
        };
        return match (&u1, &u2) {
            (MathObj::Product(p), MathObj::Product(q)) => merge_products(p.clone(), q.clone()),
            (MathObj::Product(p), _) => merge_products(p.clone(), vec![u2]),
            (_, MathObj::Product(q)) => merge_products(vec![u1], q.clone()),
            _ => combine_pair(u1, u2),
        };
    }

    let mut it = ops.into_iter();
    let Some(first) = it.next() else { return Vec::new() };
    let rest = simplify_product_rec(it.collect());
    match first {
        MathObj::Product(p) => merge_products(p, rest),
        other => merge_products(vec![other], rest),
    }
}

/// Simplifies a two-operand product with neither operand itself a product.
fn combine_pair(u1: MathObj, u2: MathObj) -> Vec<MathObj> {
    if u1.is_const() && u2.is_const() {
        let c = combine(&u1, &u2, RationalOp::Mul);
        return if c.is_int_value(1) { Vec::new() } else { vec![c] };
    }
    if u1.is_int_value(1) {
        return vec![u2];
    }
    if u2.is_int_value(1) {
        return vec![u1];
    }

    // like bases: exponents add
    if u1.base() == u2.base() {
        let exponent = simplify_sum(vec![u1.exponent(), u2.exponent()]);
        let combined = simplify_power(u1.base().clone(), exponent);
        return if combined.is_int_value(1) {
            Vec::new()
        } else {
            vec![combined]
        };
    }

    if order(&u2, &u1) {
        vec![u2, u1]
    } else {
        vec![u1, u2]
    }
}

/// Order-preserving merge of two canonical operand lists, combining elements pairwise.
fn merge_products(p: Vec<MathObj>, q: Vec<MathObj>) -> Vec<MathObj> {
    if q.is_empty() {
        return p;
    }
    if p.is_empty() {
        return q;
    }

    let p1 = p[0].clone();
    let q1 = q[0].clone();
    let merged_pair = simplify_product_rec(vec![p1.clone(), q1.clone()]);
    match merged_pair.len() {
        0 => merge_products(p[1..].to_vec(), q[1..].to_vec()),
        1 => {
            let mut out = merged_pair;
            out.extend(merge_products(p[1..].to_vec(), q[1..].to_vec()));
            out
        }
        _ => {
            if merged_pair[0] == p1 {
                let mut out = vec![p1];
                out.extend(merge_products(p[1..].to_vec(), q));
                out
            } else {
                let mut out = vec![q1];
                out.extend(merge_products(p, q[1..].to_vec()));
                out
            }
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
    fn like_bases_combine() {
        // x * x = x^2
        let result = simplify_product(vec![sym("x"), sym("x")]);
        assert_eq!(
            result,
            MathObj::power(sym("x"), MathObj::integer(2))
        );
    }

    #[test]
    fn reciprocal_factors_cancel() {
        // x * x^-1 = 1
        let inv = MathObj::power(sym("x"), MathObj::integer(-1));
        assert_eq!(simplify_product(vec![sym("x"), inv]), MathObj::integer(1));
    }

    #[test]
    fn zero_collapses_the_product() {
        assert_eq!(
            simplify_product(vec![MathObj::integer(0), sym("x")]),
            MathObj::integer(0)
        );
    }

    #[test]
    fn constants_fold_and_sort_first() {
        // y * 2 * x * 3 = 6*x*y
        let result = simplify_product(vec![
            sym("y"),
            MathObj::integer(2),
            sym("x"),
            MathObj::integer(3),
        ]);
        assert_eq!(
            result,
            MathObj::Product(vec![MathObj::integer(6), sym("x"), sym("y")])
        );
    }
}
