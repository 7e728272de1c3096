use std::fmt::{self, Display, Formatter};

/// A scientific-notation pair `m E e`, kept unexpanded so that `2E5` displays the way it was
/// written. Arithmetic collapses the pair with [`Exponential::value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    pub m: f64,
    pub e: i64,
}

impl Exponential {
    pub fn new(m: f64, e: i64) -> Self {
        Self { m, e }
    }

    /// Collapses the pair to a plain float.
    pub fn value(self) -> f64 {
        self.m * 10f64.powi(self.e.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }
}

impl Display for Exponential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}E{}", self.m, self.e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse() {
        assert_eq!(Exponential::new(2.0, 5).value(), 200000.0);
        assert_eq!(Exponential::new(1.5, -2).value(), 0.015);
    }

    #[test]
    fn display_round_trips_the_source_form() {
        assert_eq!(Exponential::new(2.0, 5).to_string(), "2E5");
    }
}
