//! The numeric tower: exact fractions, scientific pairs, vectors, and matrices.
//!
//! Arbitrary-precision integers (bignumbers) come straight from [`rug::Integer`] and have no
//! wrapper here.

pub mod exponential;
pub mod fraction;
pub mod matrix;
pub mod vector;

pub use exponential::Exponential;
pub use fraction::Fraction;
pub use matrix::Matrix;
pub use vector::Vector;
