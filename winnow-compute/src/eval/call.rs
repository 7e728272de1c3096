//! Function and class calls.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use winnow_error::Error;
use winnow_parser::parser::ast::expr::Call;

use super::env::Environment;
use super::value::{Func, Obj, Value, INITIALIZER};
use super::{runtime, Flow, Interpreter, MAX_CALL_DEPTH};

pub(crate) fn eval(interp: &mut Interpreter, node: &Call) -> Result<Value, Error> {
    let callee = interp.eval(&node.callee)?;
    let args = node
        .args
        .iter()
        .map(|arg| interp.eval(arg))
        .collect::<Result<Vec<_>, _>>()?;

    match callee {
        Value::Fn(func) => call_function(interp, &func, args, &node.span, node.line),
        Value::Class(class) => {
            let instance = Value::Obj(Rc::new(RefCell::new(Obj {
                class: Rc::clone(&class),
                fields: HashMap::new(),
            })));
            match class.find_method(INITIALIZER) {
                Some(init) => {
                    let bound = init.bind(instance.clone());
                    call_function(interp, &bound, args, &node.span, node.line)?;
                }
                None if !args.is_empty() => {
                    return Err(runtime(
                        node.span.clone(),
                        node.line,
                        format!("expected 0 arguments but got {}", args.len()),
                    ));
                }
                None => {}
            }
            Ok(instance)
        }
        other => Err(runtime(
            node.span.clone(),
            node.line,
            format!("{} cannot be called", other.type_name()),
        )),
    }
}

/// Runs a function value to completion. The initializer always hands back its bound `this`,
/// whatever its body does.
pub(crate) fn call_function(
    interp: &mut Interpreter,
    func: &Func,
    args: Vec<Value>,
    span: &Range<usize>,
    line: usize,
) -> Result<Value, Error> {
    if args.len() != func.arity() {
        return Err(runtime(
            span.clone(),
            line,
            format!(
                "'{}' expected {} arguments but got {}",
                func.declaration.name,
                func.arity(),
                args.len()
            ),
        ));
    }
    if interp.call_depth() >= MAX_CALL_DEPTH {
        return Err(runtime(
            span.clone(),
            line,
            format!("recursion exceeded the depth ceiling of {}", MAX_CALL_DEPTH),
        ));
    }

    let mut frame = Environment::with_parent(Rc::clone(&func.closure));
    for (param, value) in func.declaration.params.iter().zip(args) {
        frame.declare(param.name.clone(), value, false);
    }

    interp.enter_call();
    let flow = interp.exec_in(&func.declaration.body, Rc::new(RefCell::new(frame)));
    interp.exit_call();

    let returned = match flow? {
        Flow::Return(value) => value,
        Flow::Normal(_) => Value::Nil,
    };
    if func.is_initializer {
        return Ok(func
            .closure
            .borrow()
            .get("this")
            .unwrap_or(Value::Nil));
    }
    Ok(returned)
}
