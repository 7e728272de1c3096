use crate::primitive::int;
use rug::Integer;
use std::fmt::{self, Display, Formatter};

/// A symbolic algebra expression.
///
/// Sums and products are n-ary with their operands kept in canonical order by the simplifier;
/// `Difference` and `Quotient` are surface forms the parser produces and the simplifier
/// eliminates. Equality is structural; commutative equivalence is only reached through
/// canonical construction, never through set comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum MathObj {
    /// An exact integer.
    Int(Integer),

    /// An inexact float.
    Float(f64),

    /// An exact reduced rational with a positive denominator. Produced by rational
    /// simplification, never directly by the parser.
    Fraction(Integer, Integer),

    /// A symbol, such as `x` or `pi`.
    Sym(String),

    /// The result of an undefined operation, such as division by zero. Absorbing: any
    /// operation over `Undefined` is `Undefined`.
    Undefined,

    Bool(bool),

    /// A relation between two expressions, such as `x < 1`.
    Relation(Box<Relation>),

    List(Vec<MathObj>),

    Sum(Vec<MathObj>),

    Difference(Box<MathObj>, Box<MathObj>),

    Product(Vec<MathObj>),

    Quotient(Box<MathObj>, Box<MathObj>),

    Power(Box<MathObj>, Box<MathObj>),

    /// A named function call, such as `sin(x)` or the unevaluated `deriv(u, x)` marker.
    Func(String, Vec<MathObj>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub op: RelOp,
    pub lhs: MathObj,
    pub rhs: MathObj,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl RelOp {
    pub fn as_str(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::NotEq => "!=",
            RelOp::Less => "<",
            RelOp::LessEq => "<=",
            RelOp::Greater => ">",
            RelOp::GreaterEq => ">=",
        }
    }
}

impl MathObj {
    /// Shorthand for a machine-integer constant.
    pub fn integer(n: i64) -> Self {
        MathObj::Int(int(n))
    }

    pub fn sym(name: &str) -> Self {
        MathObj::Sym(name.to_string())
    }

    pub fn power(base: MathObj, exp: MathObj) -> Self {
        MathObj::Power(Box::new(base), Box::new(exp))
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, MathObj::Undefined)
    }

    /// True for the numeric constant variants.
    pub fn is_const(&self) -> bool {
        matches!(self, MathObj::Int(_) | MathObj::Float(_) | MathObj::Fraction(..))
    }

    pub fn is_int_value(&self, v: i64) -> bool {
        matches!(self, MathObj::Int(n) if *n == v)
    }

    /// The constant's value as a float, for cross-kind comparison and float arithmetic.
    pub fn const_value(&self) -> Option<f64> {
        match self {
            MathObj::Int(n) => Some(n.to_f64()),
            MathObj::Float(f) => Some(*f),
            MathObj::Fraction(n, d) => Some(n.to_f64() / d.to_f64()),
            _ => None,
        }
    }

    /// The constant as an exact rational, when it is one.
    pub fn as_rational(&self) -> Option<(Integer, Integer)> {
        match self {
            MathObj::Int(n) => Some((n.clone(), int(1))),
            MathObj::Fraction(n, d) => Some((n.clone(), d.clone())),
            _ => None,
        }
    }

    /// The base part of the expression viewed as a power: `x^2` has base `x`, anything else is
    /// its own base.
    pub fn base(&self) -> &MathObj {
        match self {
            MathObj::Power(base, _) => base,
            other => other,
        }
    }

    /// The exponent part of the expression viewed as a power; non-powers have exponent 1.
    pub fn exponent(&self) -> MathObj {
        match self {
            MathObj::Power(_, exp) => (**exp).clone(),
            _ => MathObj::integer(1),
        }
    }

    /// The non-constant part of the expression viewed as a term, wrapped as a product so that
    /// `2*x` and `x` share the term `(x)`. Constants have no term.
    pub fn term(&self) -> Option<MathObj> {
        match self {
            _ if self.is_const() => None,
            MathObj::Product(ops) => match ops.split_first() {
                Some((first, rest)) if first.is_const() => {
                    Some(MathObj::Product(rest.to_vec()))
                }
                _ => Some(MathObj::Product(ops.clone())),
            },
            other => Some(MathObj::Product(vec![other.clone()])),
        }
    }

    /// The numeric coefficient of the expression viewed as a term; bare terms have
    /// coefficient 1.
    pub fn const_part(&self) -> MathObj {
        match self {
            _ if self.is_const() => self.clone(),
            MathObj::Product(ops) => match ops.first() {
                Some(first) if first.is_const() => first.clone(),
                _ => MathObj::integer(1),
            },
            _ => MathObj::integer(1),
        }
    }

    /// The expression's direct children, in display order.
    pub fn children(&self) -> Vec<&MathObj> {
        match self {
            MathObj::Int(_)
            | MathObj::Float(_)
            | MathObj::Fraction(..)
            | MathObj::Sym(_)
            | MathObj::Undefined
            | MathObj::Bool(_) => Vec::new(),
            MathObj::Relation(rel) => vec![&rel.lhs, &rel.rhs],
            MathObj::List(ops) | MathObj::Sum(ops) | MathObj::Product(ops) => ops.iter().collect(),
            MathObj::Difference(a, b) | MathObj::Quotient(a, b) | MathObj::Power(a, b) => {
                vec![a, b]
            }
            MathObj::Func(_, args) => args.iter().collect(),
        }
    }

    /// True if `target` occurs nowhere in the expression, not even as the whole of it.
    pub fn free_of(&self, target: &MathObj) -> bool {
        if self == target {
            return false;
        }
        self.children().into_iter().all(|child| child.free_of(target))
    }

    /// The complete sub-expression list: the expression itself followed by the
    /// sub-expressions of each child, depth first.
    pub fn subexpressions(&self) -> Vec<MathObj> {
        let mut out = vec![self.clone()];
        for child in self.children() {
            out.extend(child.subexpressions());
        }
        out
    }
}

/// Display precedence levels, loosest binding first.
fn precedence(u: &MathObj) -> u8 {
    match u {
        MathObj::Relation(_) => 0,
        MathObj::Sum(_) | MathObj::Difference(..) => 1,
        MathObj::Product(_) | MathObj::Quotient(..) => 2,
        MathObj::Power(..) => 3,
        _ => 4,
    }
}

fn fmt_at(u: &MathObj, ctx: u8, f: &mut Formatter<'_>) -> fmt::Result {
    let own = precedence(u);
    if own < ctx {
        write!(f, "(")?;
        fmt_inner(u, f)?;
        write!(f, ")")
    } else {
        fmt_inner(u, f)
    }
}

fn fmt_inner(u: &MathObj, f: &mut Formatter<'_>) -> fmt::Result {
    match u {
        MathObj::Int(n) => write!(f, "{}", n),
        MathObj::Float(x) => write!(f, "{}", crate::eval::fmt::number(*x)),
        MathObj::Fraction(n, d) => write!(f, "{}/{}", n, d),
        MathObj::Sym(name) => write!(f, "{}", name),
        MathObj::Undefined => write!(f, "Undefined"),
        MathObj::Bool(b) => write!(f, "{}", b),
        MathObj::Relation(rel) => {
            fmt_at(&rel.lhs, 1, f)?;
            write!(f, " {} ", rel.op.as_str())?;
            fmt_at(&rel.rhs, 1, f)
        }
        MathObj::List(ops) => {
            write!(f, "[")?;
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_inner(op, f)?;
            }
            write!(f, "]")
        }
        MathObj::Sum(ops) => {
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    write!(f, " + ")?;
                }
                fmt_at(op, 2, f)?;
            }
            Ok(())
        }
        MathObj::Difference(a, b) => {
            fmt_at(a, 1, f)?;
            write!(f, " - ")?;
            fmt_at(b, 2, f)
        }
        MathObj::Product(ops) => {
            for (i, op) in ops.iter().enumerate() {
                if i > 0 {
                    write!(f, "*")?;
                }
                fmt_at(op, 3, f)?;
            }
            Ok(())
        }
        MathObj::Quotient(a, b) => {
            fmt_at(a, 2, f)?;
            write!(f, "/")?;
            fmt_at(b, 3, f)
        }
        MathObj::Power(base, exp) => {
            fmt_at(base, 4, f)?;
            write!(f, "^")?;
            fmt_at(exp, 4, f)
        }
        MathObj::Func(name, args) => {
            write!(f, "{}(", name)?;
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                fmt_inner(arg, f)?;
            }
            write!(f, ")")
        }
    }
}

impl Display for MathObj {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_inner(self, f)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn rendering_parenthesizes_by_precedence() {
        let u = MathObj::Product(vec![
            MathObj::integer(2),
            MathObj::Sum(vec![MathObj::sym("x"), MathObj::integer(1)]),
        ]);
        assert_eq!(u.to_string(), "2*(x + 1)");

        let v = MathObj::power(MathObj::sym("x"), MathObj::integer(2));
        assert_eq!(v.to_string(), "x^2");
    }

    #[test]
    fn free_of_matches_whole_subtrees() {
        let u = MathObj::Sum(vec![
            MathObj::power(MathObj::sym("x"), MathObj::integer(2)),
            MathObj::integer(1),
        ]);
        assert!(!u.free_of(&MathObj::sym("x")));
        assert!(u.free_of(&MathObj::sym("y")));
    }

    #[test]
    fn subexpressions_are_complete() {
        let u = MathObj::Sum(vec![MathObj::sym("x"), MathObj::integer(1)]);
        let subs = u.subexpressions();
        assert_eq!(subs.len(), 3);
        assert_eq!(subs[0], u);
    }

    #[test]
    fn term_ignores_the_coefficient() {
        let two_x = MathObj::Product(vec![MathObj::integer(2), MathObj::sym("x")]);
        let x = MathObj::sym("x");
        assert_eq!(two_x.term(), x.term());
        assert_eq!(two_x.const_part(), MathObj::integer(2));
        assert_eq!(x.const_part(), MathObj::integer(1));
    }
}
