use crate::numeric::{Exponential, Fraction, Matrix, Vector};
use crate::symbolic::expr::MathObj;
use rug::Integer;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use winnow_parser::parser::ast::stmt::FnDecl;

use super::env::Environment;

/// Any value produced by a Winnow program.
///
/// There is no implicit coercion between variants except the float-to-fraction promotion rule,
/// which applies only at binary-operator sites.
#[derive(Debug, Clone)]
pub enum Value {
    /// A plain IEEE float. Integer literals evaluate to this variant too; `1/0` is `Infinity`
    /// by design.
    Number(f64),

    /// An arbitrary-precision integer, from a `#...` bignumber literal.
    Big(Integer),

    /// An exact rational.
    Fraction(Fraction),

    /// An unexpanded scientific-notation pair.
    Exponential(Exponential),

    Bool(bool),

    Str(String),

    Nil,

    /// An out-of-range vector or matrix element. Rendered as `absent`; never an error.
    Absent,

    Tuple(Vec<Value>),

    Vector(Vector),

    Matrix(Matrix),

    /// A user-defined function together with its captured closure.
    Fn(Rc<Func>),

    Class(Rc<Class>),

    Obj(Rc<RefCell<Obj>>),

    /// A symbolic algebra expression, from an `'...'` literal or an algebra native.
    Math(MathObj),
}

impl Value {
    /// The user-visible name of the value's type, used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Big(_) => "bignumber",
            Value::Fraction(_) => "fraction",
            Value::Exponential(_) => "exponential",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Absent => "absent",
            Value::Tuple(_) => "tuple",
            Value::Vector(_) => "vector",
            Value::Matrix(_) => "matrix",
            Value::Fn(_) => "function",
            Value::Class(_) => "class",
            Value::Obj(_) => "object",
            Value::Math(_) => "algebra object",
        }
    }

    /// Only `false` and `nil` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Bool(false) | Value::Nil)
    }

    /// The value as a float, when it has one. Exact variants collapse lossily.
    pub fn coerce_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Big(n) => Some(n.to_f64()),
            Value::Fraction(f) => Some(f.value()),
            Value::Exponential(e) => Some(e.value()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) | (Value::Absent, Value::Absent) => true,
            (Value::Big(a), Value::Big(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => a == b,
            (Value::Matrix(a), Value::Matrix(b)) => a == b,
            (Value::Fn(a), Value::Fn(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Obj(a), Value::Obj(b)) => Rc::ptr_eq(a, b),
            (Value::Math(a), Value::Math(b)) => a == b,
            // numeric variants compare by value across kinds, so 1|2 == 0.5
            _ => match (self.coerce_number(), other.coerce_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

/// A user-defined function value.
#[derive(Debug)]
pub struct Func {
    pub declaration: FnDecl,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl Func {
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Copies the function with `this` bound in a fresh frame layered over the closure.
    pub fn bind(&self, instance: Value) -> Func {
        let mut frame = Environment::with_parent(Rc::clone(&self.closure));
        frame.declare("this".to_string(), instance, false);
        Func {
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(frame)),
            is_initializer: self.is_initializer,
        }
    }
}

/// The name every class initializer method must use.
pub const INITIALIZER: &str = "def";

/// A class value: a name and a method table.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Rc<Func>>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<&Rc<Func>> {
        self.methods.get(name)
    }
}

/// An instance of a class. Fields are created lazily on first write.
#[derive(Debug)]
pub struct Obj {
    pub class: Rc<Class>,
    pub fields: HashMap<String, Value>,
}
