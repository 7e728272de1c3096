//! The numeric-constant dictionary backing `pi`, `e`, and friends.

use once_cell::sync::Lazy;

pub static E: Lazy<f64> = Lazy::new(|| 1f64.exp());

/// The golden ratio.
pub static PHI: Lazy<f64> = Lazy::new(|| (1.0 + 5f64.sqrt()) / 2.0);

pub static PI: Lazy<f64> = Lazy::new(|| (-1f64).acos());

pub static TAU: Lazy<f64> = Lazy::new(|| 2.0 * *PI);

/// Looks up a numeric constant by its source-level name. The tokenizer only promotes names
/// present in its own dictionary, so `None` here indicates a tokenizer/evaluator disagreement.
pub fn constant(name: &str) -> Option<f64> {
    match name {
        "e" => Some(*E),
        "inf" => Some(f64::INFINITY),
        "nan" => Some(f64::NAN),
        "phi" => Some(*PHI),
        "pi" => Some(*PI),
        "tau" => Some(*TAU),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_matches_the_tokenizer() {
        for name in winnow_parser::tokenizer::CONSTANTS {
            assert!(constant(name).is_some(), "missing constant '{}'", name);
        }
    }
}
