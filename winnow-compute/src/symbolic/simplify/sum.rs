//! Merge-based simplification of sums: like terms combine by summing coefficients, zeros
//! drop, and unlike operands land in canonical order.

use super::product::simplify_product;
use super::rne::{combine, RationalOp};
use crate::symbolic::expr::MathObj;
use crate::symbolic::order::order;

/// Simplifies an n-ary sum whose operands are already individually simplified.
pub fn simplify_sum(ops: Vec<MathObj>) -> MathObj {
    if ops.iter().any(MathObj::is_undefined) {
        return MathObj::Undefined;
    }
    if ops.len() == 1 {
        return ops.into_iter().next().unwrap_or(MathObj::integer(0));
    }
    let merged = simplify_sum_rec(ops);
    match merged.len() {
        0 => MathObj::integer(0),
        1 => merged.into_iter().next().unwrap_or(MathObj::integer(0)),
        _ => MathObj::Sum(merged),
    }
}

fn simplify_sum_rec(ops: Vec<MathObj>) -> Vec<MathObj> {
    if ops.len() == 2 {
        let mut it = ops.into_iter();
        let (u1, u2) = match (it.next(), it.next()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Vec::new(),
        };
        return match (&u1, &u2) {
            (MathObj::Sum(p), MathObj::Sum(q)) => merge_sums(p.clone(), q.clone()),
            (MathObj::Sum(p), _) => merge_sums(p.clone(), vec![u2]),
            (_, MathObj::Sum(q)) => merge_sums(vec![u1], q.clone()),
            _ => combine_pair(u1, u2),
        };
    }

    let mut it = ops.into_iter();
    let Some(first) = it.next() else { return Vec::new() };
    let rest = simplify_sum_rec(it.collect());
    match first {
        MathObj::Sum(p) => merge_sums(p, rest),
        other => merge_sums(vec![other], rest),
    }
}

/// Simplifies a two-operand sum with neither operand itself a sum.
fn combine_pair(u1: MathObj, u2: MathObj) -> Vec<MathObj> {
    if u1.is_const() && u2.is_const() {
        let c = combine(&u1, &u2, RationalOp::Add);
        return if c.is_int_value(0) || matches!(c, MathObj::Float(f) if f == 0.0) {
            Vec::new()
        } else {
            vec![c]
        };
    }
    if u1.is_int_value(0) {
        return vec![u2];
    }
    if u2.is_int_value(0) {
        return vec![u1];
    }

    // like terms: same term part, coefficients add
    if let (Some(t1), Some(t2)) = (u1.term(), u2.term()) {
        if t1 == t2 {
            let coefficient = combine(&u1.const_part(), &u2.const_part(), RationalOp::Add);
            let MathObj::Product(term_ops) = t1 else {
                return vec![];
            };
            let mut factors = vec![coefficient];
            factors.extend(term_ops);
            let combined = simplify_product(factors);
            return if combined.is_int_value(0) {
                Vec::new()
            } else {
                vec![combined]
            };
        }
    }

    if order(&u2, &u1) {
        vec![u2, u1]
    } else {
        vec![u1, u2]
    }
}

/// Order-preserving merge of two canonical operand lists, combining elements pairwise.
fn merge_sums(p: Vec<MathObj>, q: Vec<MathObj>) -> Vec<MathObj> {
    if q.is_empty() {
        return p;
    }
    if p.is_empty() {
        return q;
    }

    let p1 = p[0].clone();
    let q1 = q[0].clone();
    let merged_pair = simplify_sum_rec(vec![p1.clone(), q1.clone()]);
    match merged_pair.len() {
        0 => merge_sums(p[1..].to_vec(), q[1..].to_vec()),
        1 => {
            let mut out = merged_pair;
            out.extend(merge_sums(p[1..].to_vec(), q[1..].to_vec()));
            out
        }
        _ => {
            if merged_pair[0] == p1 {
                let mut out = vec![p1];
                out.extend(merge_sums(p[1..].to_vec(), q));
                out
            } else {
                let mut out = vec![q1];
                out.extend(merge_sums(p, q[1..].to_vec()));
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
    fn like_terms_combine() {
        // x + x = 2*x
        let result = simplify_sum(vec![sym("x"), sym("x")]);
        assert_eq!(
            result,
            MathObj::Product(vec![MathObj::integer(2), sym("x")])
        );
    }

    #[test]
    fn cancelling_terms_vanish() {
        // x + (-1)*x = 0
        let neg_x = MathObj::Product(vec![MathObj::integer(-1), sym("x")]);
        assert_eq!(simplify_sum(vec![sym("x"), neg_x]), MathObj::integer(0));
    }

    #[test]
    fn constants_fold_and_sort_first() {
        // y + 2 + x + 3 = 5 + x + y
        let result = simplify_sum(vec![
            sym("y"),
            MathObj::integer(2),
            sym("x"),
            MathObj::integer(3),
        ]);
        assert_eq!(
            result,
            MathObj::Sum(vec![MathObj::integer(5), sym("x"), sym("y")])
        );
    }

    #[test]
    fn nested_sums_flatten() {
        let inner = MathObj::Sum(vec![sym("a"), sym("b")]);
        let result = simplify_sum(vec![inner, sym("c")]);
        assert_eq!(result, MathObj::Sum(vec![sym("a"), sym("b"), sym("c")]));
    }
}
