//! The total canonical order over symbolic expressions.
//!
//! Used both for display and for the merge step of sum/product simplification. Any two
//! expressions are comparable: same-shape compounds compare operand-by-operand (reversed for
//! sums and products), and cross-variant comparisons lift the simpler operand into the richer
//! shape before recursing.

use super::expr::MathObj;
use std::cmp::Ordering;

/// True when `u` comes strictly before `v` in canonical order.
pub fn order(u: &MathObj, v: &MathObj) -> bool {
    use MathObj::*;

    match (u, v) {
        // constants order by numeric value
        _ if u.is_const() && v.is_const() => {
            const_cmp(u, v) == Ordering::Less
        }
        // constants come before everything else
        _ if u.is_const() => true,
        _ if v.is_const() => false,

        (Sym(a), Sym(b)) => a < b,

        (Sum(a), Sum(b)) | (Product(a), Product(b)) => order_reversed(a, b),

        (Power(ab, ae), Power(bb, be)) => {
            if ab != bb {
                order(ab, bb)
            } else {
                order(ae, be)
            }
        }

        (Func(an, aa), Func(bn, ba)) => {
            if an != bn {
                an < bn
            } else {
                order_forward(aa, ba)
            }
        }

        // lifting rules: wrap the simpler side in the richer shape and recurse
        (Product(a), _) => order_reversed(a, std::slice::from_ref(v)),
        (_, Product(b)) => order_reversed(std::slice::from_ref(u), b),

        (Power(..), _) => order(u, &MathObj::power(v.clone(), MathObj::integer(1))),
        (_, Power(..)) => order(&MathObj::power(u.clone(), MathObj::integer(1)), v),

        (Sum(a), _) => order_reversed(a, std::slice::from_ref(v)),
        (_, Sum(b)) => order_reversed(std::slice::from_ref(u), b),

        // a function call never comes before the bare symbol of the same name
        (Func(an, _), Sym(bn)) => an < bn,
        (Sym(an), Func(bn, _)) => an <= bn,

        // the remaining variants (booleans, relations, lists, unsimplified difference and
        // quotient forms) order by variant rank, then by rendered text
        _ => match rank(u).cmp(&rank(v)) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => u.to_string() < v.to_string(),
        },
    }
}

/// Sorts a list of expressions into canonical order.
pub fn sortex(mut list: Vec<MathObj>) -> Vec<MathObj> {
    list.sort_by(|a, b| {
        if order(a, b) {
            Ordering::Less
        } else if order(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    });
    list
}

fn const_cmp(u: &MathObj, v: &MathObj) -> Ordering {
    if let (Some((an, ad)), Some((bn, bd))) = (u.as_rational(), v.as_rational()) {
        // exact cross-multiplication; denominators are positive
        return (an * bd).cmp(&(bn * ad));
    }
    let a = u.const_value().unwrap_or(f64::NAN);
    let b = v.const_value().unwrap_or(f64::NAN);
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Compares operand lists from the last element backwards, the sum/product rule.
fn order_reversed(a: &[MathObj], b: &[MathObj]) -> bool {
    let mut i = a.len();
    let mut j = b.len();
    while i > 0 && j > 0 {
        if a[i - 1] != b[j - 1] {
            return order(&a[i - 1], &b[j - 1]);
        }
        i -= 1;
        j -= 1;
    }
    a.len() < b.len()
}

/// Compares argument lists front to back, the function-call rule.
fn order_forward(a: &[MathObj], b: &[MathObj]) -> bool {
    for (x, y) in a.iter().zip(b) {
        if x != y {
            return order(x, y);
        }
    }
    a.len() < b.len()
}

fn rank(u: &MathObj) -> u8 {
    match u {
        MathObj::Undefined => 0,
        MathObj::Bool(_) => 1,
        MathObj::Relation(_) => 2,
        MathObj::List(_) => 3,
        MathObj::Difference(..) => 4,
        MathObj::Quotient(..) => 5,
        _ => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> MathObj {
        MathObj::sym(s)
    }

    #[test]
    fn constants_order_by_value() {
        assert!(order(&MathObj::integer(2), &MathObj::integer(3)));
        assert!(order(
            &MathObj::Fraction(crate::primitive::int(1), crate::primitive::int(2)),
            &MathObj::integer(1)
        ));
    }

    #[test]
    fn constants_come_first() {
        assert!(order(&MathObj::integer(5), &sym("a")));
        assert!(!order(&sym("a"), &MathObj::integer(5)));
    }

    #[test]
    fn symbols_order_lexicographically() {
        assert!(order(&sym("a"), &sym("b")));
        assert!(!order(&sym("b"), &sym("a")));
    }

    #[test]
    fn sums_compare_by_reversed_operands() {
        // a + b vs a + c: compare last operands first
        let ab = MathObj::Sum(vec![sym("a"), sym("b")]);
        let ac = MathObj::Sum(vec![sym("a"), sym("c")]);
        assert!(order(&ab, &ac));
    }

    #[test]
    fn totality_over_a_sample_set() {
        let samples = vec![
            MathObj::integer(2),
            sym("x"),
            sym("y"),
            MathObj::power(sym("x"), MathObj::integer(2)),
            MathObj::Sum(vec![sym("x"), sym("y")]),
            MathObj::Product(vec![MathObj::integer(2), sym("x")]),
            MathObj::Func("sin".to_string(), vec![sym("x")]),
        ];
        for a in &samples {
            for b in &samples {
                if a == b {
                    assert!(!order(a, b) && !order(b, a));
                } else {
                    // exactly one direction holds
                    assert!(order(a, b) != order(b, a), "not antisymmetric: {} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn sortex_is_stable_under_resorting() {
        let list = vec![sym("y"), MathObj::integer(3), sym("x")];
        let sorted = sortex(list);
        assert_eq!(sortex(sorted.clone()), sorted);
        assert_eq!(sorted[0], MathObj::integer(3));
    }
}
