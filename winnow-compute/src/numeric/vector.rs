use std::fmt::{self, Display, Formatter};

/// A numeric vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Vector(pub Vec<f64>);

impl Vector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 1-based element access. Out-of-range indices are absent, not an error.
    pub fn element(&self, i: i64) -> Option<f64> {
        if i < 1 {
            return None;
        }
        self.0.get(i as usize - 1).copied()
    }

    /// Elementwise sum. `None` if the lengths differ.
    pub fn add(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        Some(Self(
            self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect(),
        ))
    }

    /// Elementwise difference. `None` if the lengths differ.
    pub fn sub(&self, other: &Self) -> Option<Self> {
        if self.len() != other.len() {
            return None;
        }
        Some(Self(
            self.0.iter().zip(&other.0).map(|(a, b)| a - b).collect(),
        ))
    }

    pub fn scale(&self, k: f64) -> Self {
        Self(self.0.iter().map(|a| a * k).collect())
    }

    pub fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    /// Dot product. `None` if the lengths differ.
    pub fn dot(&self, other: &Self) -> Option<f64> {
        if self.len() != other.len() {
            return None;
        }
        Some(self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum())
    }
}

impl Display for Vector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, element) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", crate::eval::fmt::number(*element))?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_element_access() {
        let v = Vector(vec![10.0, 20.0, 30.0]);
        assert_eq!(v.element(1), Some(10.0));
        assert_eq!(v.element(3), Some(30.0));
        assert_eq!(v.element(0), None);
        assert_eq!(v.element(4), None);
    }

    #[test]
    fn dot_product() {
        let a = Vector(vec![1.0, 2.0]);
        let b = Vector(vec![3.0, 4.0]);
        assert_eq!(a.dot(&b), Some(11.0));
        assert_eq!(a.dot(&Vector(vec![1.0])), None);
    }
}
