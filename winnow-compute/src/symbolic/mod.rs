//! The symbolic algebra subsystem.
//!
//! A separate expression model ([`expr::MathObj`]) with a total canonical order, merge-based
//! automatic simplification, exact rational arithmetic, symbolic differentiation, and the
//! polynomial predicates, fed either by algebra-string literals (through [`parser`]) or by
//! library calls.

pub mod derivative;
pub mod expr;
pub mod order;
pub mod parser;
pub mod polynomial;
pub mod simplify;

pub use derivative::derive;
pub use expr::MathObj;
pub use order::{order, sortex};
pub use parser::parse_algebra;
pub use polynomial::{coef_gpe, gpe_deg, is_monomial, is_polynomial};
pub use simplify::simplify;
