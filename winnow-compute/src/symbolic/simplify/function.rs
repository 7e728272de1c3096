//! Simplification rules for the small set of named functions the algebra subsystem knows
//! exact identities for. Anything else stays an unevaluated call.

use crate::symbolic::expr::MathObj;

/// Simplifies `name(args)` with the arguments already simplified.
pub fn simplify_function(name: String, args: Vec<MathObj>) -> MathObj {
    if args.iter().any(MathObj::is_undefined) {
        return MathObj::Undefined;
    }

    if args.len() == 1 {
        let arg = &args[0];
        match name.as_str() {
            "sin" => {
                if arg.is_int_value(0) || *arg == MathObj::sym("pi") {
                    return MathObj::integer(0);
                }
                if let Some(v) = arg.const_value() {
                    return MathObj::Float(v.sin());
                }
            }
            "cos" => {
                if arg.is_int_value(0) {
                    return MathObj::integer(1);
                }
                if *arg == MathObj::sym("pi") {
                    return MathObj::integer(-1);
                }
                if let Some(v) = arg.const_value() {
                    return MathObj::Float(v.cos());
                }
            }
            "ln" => {
                if arg.is_int_value(1) {
                    return MathObj::integer(0);
                }
                if *arg == MathObj::sym("e") {
                    return MathObj::integer(1);
                }
                // ln(e^x) = x
                if let MathObj::Power(base, exp) = arg {
                    if **base == MathObj::sym("e") {
                        return (**exp).clone();
                    }
                }
                if let Some(v) = arg.const_value() {
                    return if v > 0.0 {
                        MathObj::Float(v.ln())
                    } else {
                        MathObj::Undefined
                    };
                }
            }
            _ => {}
        }
    }

    MathObj::Func(name, args)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn exact_angles() {
        assert_eq!(
            simplify_function("sin".to_string(), vec![MathObj::sym("pi")]),
            MathObj::integer(0)
        );
        assert_eq!(
            simplify_function("cos".to_string(), vec![MathObj::sym("pi")]),
            MathObj::integer(-1)
        );
    }

    #[test]
    fn log_identities() {
        assert_eq!(
            simplify_function("ln".to_string(), vec![MathObj::sym("e")]),
            MathObj::integer(1)
        );
        let e_to_x = MathObj::power(MathObj::sym("e"), MathObj::sym("x"));
        assert_eq!(
            simplify_function("ln".to_string(), vec![e_to_x]),
            MathObj::sym("x")
        );
    }

    #[test]
    fn symbolic_arguments_stay_unevaluated() {
        let call = simplify_function("sin".to_string(), vec![MathObj::sym("x")]);
        assert_eq!(call, MathObj::Func("sin".to_string(), vec![MathObj::sym("x")]));
    }

    #[test]
    fn numeric_arguments_evaluate_as_floats() {
        let MathObj::Float(v) = simplify_function("sin".to_string(), vec![MathObj::integer(2)])
        else {
            panic!("expected a float");
        };
        assert!((v - 2f64.sin()).abs() < 1e-12);
    }
}
