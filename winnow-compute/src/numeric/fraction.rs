use std::fmt::{self, Display, Formatter};

/// An exact rational number.
///
/// Fractions are always stored gcd-reduced with the sign carried on the numerator; the
/// denominator is strictly positive. Construction with a zero denominator is not representable
/// here at all: [`Fraction::new`] returns `None` for `d == 0`, and the evaluator turns that
/// into a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    n: i64,
    d: i64,
}

impl Fraction {
    /// Creates a reduced fraction, or `None` if the denominator is zero.
    pub fn new(n: i64, d: i64) -> Option<Self> {
        if d == 0 {
            return None;
        }
        let g = gcd(n.unsigned_abs(), d.unsigned_abs()) as i64;
        let sign = if d < 0 { -1 } else { 1 };
        Some(Self {
            n: sign * n / g,
            d: (d / g).abs(),
        })
    }

    pub fn numerator(self) -> i64 {
        self.n
    }

    pub fn denominator(self) -> i64 {
        self.d
    }

    /// The fraction's value as a float.
    pub fn value(self) -> f64 {
        self.n as f64 / self.d as f64
    }

    /// Adds `other`. Returns `None` when a cross-multiplication overflows `i64`.
    pub fn add(self, other: Self) -> Option<Self> {
        let n = self
            .n
            .checked_mul(other.d)?
            .checked_add(other.n.checked_mul(self.d)?)?;
        Self::new(n, self.d.checked_mul(other.d)?)
    }

    /// Subtracts `other`. Returns `None` when a cross-multiplication overflows `i64`.
    pub fn sub(self, other: Self) -> Option<Self> {
        let n = self
            .n
            .checked_mul(other.d)?
            .checked_sub(other.n.checked_mul(self.d)?)?;
        Self::new(n, self.d.checked_mul(other.d)?)
    }

    /// Multiplies by `other`. Returns `None` when either product overflows `i64`.
    pub fn mul(self, other: Self) -> Option<Self> {
        Self::new(self.n.checked_mul(other.n)?, self.d.checked_mul(other.d)?)
    }

    /// Divides by `other`. Returns `None` when dividing by a zero-numerator fraction or when
    /// a cross-multiplication overflows `i64`.
    pub fn div(self, other: Self) -> Option<Self> {
        Self::new(self.n.checked_mul(other.d)?, self.d.checked_mul(other.n)?)
    }

    pub fn neg(self) -> Self {
        Self { n: -self.n, d: self.d }
    }

    /// Raises the fraction to an integer power. A negative exponent on a zero-numerator
    /// fraction returns `None`.
    pub fn pow(self, exp: i64) -> Option<Self> {
        let mag = exp.unsigned_abs().try_into().ok()?;
        let n = self.n.checked_pow(mag)?;
        let d = self.d.checked_pow(mag)?;
        if exp < 0 {
            Self::new(d, n)
        } else {
            Self::new(n, d)
        }
    }
}

/// Binary gcd over magnitudes. `gcd(0, 0)` is 1 so that reduction never divides by zero.
fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

impl Display for Fraction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.n, self.d)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn reduction() {
        assert_eq!(Fraction::new(2, 4), Fraction::new(1, 2));
        assert_eq!(Fraction::new(6, 3).unwrap().to_string(), "2|1");
    }

    #[test]
    fn sign_is_carried_on_the_numerator() {
        let f = Fraction::new(1, -2).unwrap();
        assert_eq!((f.numerator(), f.denominator()), (-1, 2));
        let g = Fraction::new(-3, -6).unwrap();
        assert_eq!((g.numerator(), g.denominator()), (1, 2));
    }

    #[test]
    fn exact_addition() {
        let sum = Fraction::new(1, 3)
            .unwrap()
            .add(Fraction::new(1, 6).unwrap())
            .unwrap();
        assert_eq!(sum, Fraction::new(1, 2).unwrap());
    }

    #[test]
    fn reduction_is_idempotent() {
        let f = Fraction::new(1, 2).unwrap();
        assert_eq!(Fraction::new(f.numerator(), f.denominator()), Some(f));
    }

    #[test]
    fn overflowing_cross_multiplication_returns_none() {
        let tiny = Fraction::new(1, 4_000_000_000).unwrap();
        assert_eq!(tiny.add(tiny), None);
        assert_eq!(tiny.sub(tiny.neg()), None);
        assert_eq!(tiny.mul(tiny), None);
        assert_eq!(tiny.div(Fraction::new(4_000_000_000, 1).unwrap()), None);
        let huge = Fraction::new(i64::MAX, 1).unwrap();
        assert_eq!(huge.mul(huge), None);
    }

    #[test]
    fn zero_denominator_is_unrepresentable() {
        assert_eq!(Fraction::new(1, 0), None);
        let zero = Fraction::new(0, 5).unwrap();
        assert_eq!(Fraction::new(1, 2).unwrap().div(zero), None);
    }
}
