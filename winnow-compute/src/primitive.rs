//! Helpers to construct [`Integer`]s from various types.

use rug::Integer;

/// Creates an [`Integer`] with the given value.
pub fn int<T>(n: T) -> Integer
where
    Integer: From<T>,
{
    Integer::from(n)
}

/// Creates an [`Integer`] from a decimal digit string. The tokenizer guarantees the digits are
/// valid, so an unparsable string falls back to zero.
pub fn int_from_str(s: &str) -> Integer {
    Integer::from_str_radix(s, 10).unwrap_or_default()
}

/// Returns the integer as an `f64` if it is exactly representable below the safe integer
/// bound.
pub fn int_to_f64_exact(n: &Integer) -> Option<f64> {
    let f = n.to_f64();
    if f.abs() < 9_007_199_254_740_992.0 {
        Some(f)
    } else {
        None
    }
}
