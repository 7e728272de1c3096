use super::vector::Vector;
use std::fmt::{self, Display, Formatter};

/// A numeric matrix in row-major order. Row lengths are uniform; the parser rejects jagged
/// literals before one of these can be built.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Builds a matrix from uniform rows. `None` if the rows are jagged or empty.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first()?.len();
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// 1-based row access, returning the row as a vector. Out-of-range rows are absent.
    pub fn element(&self, i: i64) -> Option<Vector> {
        if i < 1 || i as usize > self.rows {
            return None;
        }
        let start = (i as usize - 1) * self.cols;
        Some(Vector(self.data[start..start + self.cols].to_vec()))
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Option<Self> {
        if self.rows != other.rows || self.cols != other.cols {
            return None;
        }
        Some(Self {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        })
    }

    pub fn add(&self, other: &Self) -> Option<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Option<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn scale(&self, k: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|a| a * k).collect(),
        }
    }

    pub fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    /// Matrix product. `None` when the inner dimensions disagree.
    pub fn mul(&self, other: &Self) -> Option<Self> {
        if self.cols != other.rows {
            return None;
        }
        let mut data = vec![0.0; self.rows * other.cols];
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                data[i * other.cols + j] = sum;
            }
        }
        Some(Self {
            rows: self.rows,
            cols: other.cols,
            data,
        })
    }
}

impl Display for Matrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..self.rows {
            if row > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", crate::eval::fmt::number(self.data[row * self.cols + col]))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_rows(rows).unwrap()
    }

    #[test]
    fn product() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = m(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let c = a.mul(&b).unwrap();
        assert_eq!(c.get(0, 0), Some(19.0));
        assert_eq!(c.get(1, 1), Some(50.0));
    }

    #[test]
    fn one_based_row_access() {
        let a = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(a.element(2), Some(Vector(vec![3.0, 4.0])));
        assert_eq!(a.element(3), None);
    }

    #[test]
    fn jagged_rows_are_rejected() {
        assert_eq!(Matrix::from_rows(vec![vec![1.0], vec![2.0, 3.0]]), None);
    }
}
