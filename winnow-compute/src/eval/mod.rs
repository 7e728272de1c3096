//! The tree-walking evaluator.
//!
//! [`Interpreter::interpret`] executes a resolved statement list top to bottom and yields the
//! last statement's value. `return` travels as an explicit [`Flow`] result from statement to
//! statement, never as unwinding; runtime failures travel as [`Error`] results the same way.

pub mod binary;
pub mod call;
pub mod env;
pub mod fmt;
pub mod unary;
pub mod value;

use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::rc::Rc;
use winnow_error::{ErrKind, Error};
use winnow_parser::parser::ast::expr::{AssignTarget, Expr};
use winnow_parser::parser::ast::stmt::Stmt;
use winnow_parser::parser::ast::NodeId;

use crate::consts;
use crate::numeric::{Exponential, Fraction, Matrix, Vector};
use crate::primitive::int_from_str;
use crate::symbolic::MathObj;
use env::{AssignError, Environment};
use value::{Class, Func, Value, INITIALIZER};

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow {
    /// The statement ran to completion with this value.
    Normal(Value),

    /// A `return` fired; the value travels to the enclosing function-call boundary.
    Return(Value),
}

/// The call-depth ceiling guarding against unbounded recursion.
pub const MAX_CALL_DEPTH: usize = 1 << 9;

#[derive(Debug)]
pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    env: Rc<RefCell<Environment>>,
    distances: HashMap<NodeId, usize>,
    algebra: HashMap<NodeId, MathObj>,
    loop_limit: Option<u64>,
    call_depth: usize,
    printed: Vec<String>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));
        Self {
            env: Rc::clone(&globals),
            globals,
            distances: HashMap::new(),
            algebra: HashMap::new(),
            loop_limit: None,
            call_depth: 0,
            printed: Vec::new(),
        }
    }

    /// Sets the loop-iteration ceiling. The default is unlimited.
    pub fn with_loop_limit(mut self, limit: u64) -> Self {
        self.loop_limit = Some(limit);
        self
    }

    /// Installs the side tables a fresh resolve/parse produced. Entries accumulate so that
    /// closures from earlier runs keep their resolved distances.
    pub fn install_bindings(
        &mut self,
        distances: HashMap<NodeId, usize>,
        algebra: HashMap<NodeId, MathObj>,
    ) {
        self.distances.extend(distances);
        self.algebra.extend(algebra);
    }

    pub(crate) fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub(crate) fn enter_call(&mut self) {
        self.call_depth += 1;
    }

    pub(crate) fn exit_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    /// Lines printed by `print` statements since the last drain. The core performs no I/O
    /// itself; the REPL drains and displays these.
    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.printed)
    }

    /// Evaluates the statements top to bottom, returning the last statement's value.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<Value, Error> {
        let mut last = Value::Nil;
        for statement in statements {
            match self.exec(statement)? {
                Flow::Normal(value) => last = value,
                Flow::Return(value) => return Ok(value),
            }
        }
        Ok(last)
    }

    pub(crate) fn exec(&mut self, statement: &Stmt) -> Result<Flow, Error> {
        match statement {
            Stmt::Expr(stmt) => Ok(Flow::Normal(self.eval(&stmt.expr)?)),
            Stmt::Print(stmt) => {
                let value = self.eval(&stmt.expr)?;
                self.printed.push(value.to_string());
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Decl(decl) => {
                let value = self.eval(&decl.init)?;
                self.env
                    .borrow_mut()
                    .declare(decl.name.clone(), value, decl.mutable);
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Fn(decl) => {
                let func = Func {
                    declaration: decl.clone(),
                    closure: Rc::clone(&self.env),
                    is_initializer: false,
                };
                self.env
                    .borrow_mut()
                    .declare(decl.name.clone(), Value::Fn(Rc::new(func)), false);
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::If(stmt) => {
                if self.eval(&stmt.condition)?.is_truthy() {
                    self.exec(&stmt.then_branch)
                } else if let Some(else_branch) = &stmt.else_branch {
                    self.exec(else_branch)
                } else {
                    Ok(Flow::Normal(Value::Nil))
                }
            }
            Stmt::While(stmt) => {
                let mut iterations: u64 = 0;
                while self.eval(&stmt.condition)?.is_truthy() {
                    iterations += 1;
                    if let Some(limit) = self.loop_limit {
                        if iterations > limit {
                            return Err(runtime(
                                stmt.span.clone(),
                                stmt.line,
                                format!("loop exceeded the iteration ceiling of {}", limit),
                            ));
                        }
                    }
                    if let Flow::Return(value) = self.exec(&stmt.body)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Return(stmt) => {
                let value = match &stmt.value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Block(block) => {
                let frame = Environment::with_parent(Rc::clone(&self.env));
                self.exec_in(&block.statements, Rc::new(RefCell::new(frame)))
            }
            Stmt::Class(decl) => {
                let mut methods = HashMap::new();
                for method in &decl.methods {
                    let func = Func {
                        declaration: method.clone(),
                        closure: Rc::clone(&self.env),
                        is_initializer: method.name == INITIALIZER,
                    };
                    methods.insert(method.name.clone(), Rc::new(func));
                }
                let class = Class {
                    name: decl.name.clone(),
                    methods,
                };
                self.env
                    .borrow_mut()
                    .declare(decl.name.clone(), Value::Class(Rc::new(class)), false);
                Ok(Flow::Normal(Value::Nil))
            }
        }
    }

    /// Runs statements with `frame` as the current environment, restoring the previous one
    /// afterwards. A `return` stops execution and propagates.
    pub(crate) fn exec_in(
        &mut self,
        statements: &[Stmt],
        frame: Rc<RefCell<Environment>>,
    ) -> Result<Flow, Error> {
        let previous = std::mem::replace(&mut self.env, frame);
        let mut flow = Flow::Normal(Value::Nil);
        for statement in statements {
            match self.exec(statement) {
                Ok(Flow::Normal(value)) => flow = Flow::Normal(value),
                Ok(Flow::Return(value)) => {
                    flow = Flow::Return(value);
                    break;
                }
                Err(err) => {
                    self.env = previous;
                    return Err(err);
                }
            }
        }
        self.env = previous;
        Ok(flow)
    }

    pub(crate) fn eval(&mut self, expr: &Expr) -> Result<Value, Error> {
        match expr {
            Expr::Integer(lit) => Ok(Value::Number(lit.value as f64)),
            Expr::Number(lit) => Ok(Value::Number(lit.value)),
            Expr::Fraction(lit) => Fraction::new(lit.n, lit.d)
                .map(Value::Fraction)
                .ok_or_else(|| {
                    runtime(
                        lit.span.clone(),
                        lit.line,
                        "a fraction cannot have a zero denominator".to_string(),
                    )
                }),
            Expr::Exponential(lit) => Ok(Value::Exponential(Exponential::new(lit.m, lit.e))),
            Expr::Big(lit) => Ok(Value::Big(int_from_str(&lit.digits))),
            Expr::Bool(lit) => Ok(Value::Bool(lit.value)),
            Expr::Str(lit) => Ok(Value::Str(lit.value.clone())),
            Expr::Nil(_) => Ok(Value::Nil),
            Expr::Constant(lit) => consts::constant(&lit.name)
                .map(Value::Number)
                .ok_or_else(|| {
                    runtime(
                        lit.span.clone(),
                        lit.line,
                        format!("unknown constant '{}'", lit.name),
                    )
                }),
            Expr::Algebra(lit) => self
                .algebra
                .get(&lit.id)
                .cloned()
                .map(Value::Math)
                .ok_or_else(|| {
                    runtime(
                        lit.span.clone(),
                        lit.line,
                        "algebra literal was never parsed".to_string(),
                    )
                }),
            Expr::Ident(ident) => self.lookup(ident.id, &ident.name, &ident.span, ident.line),
            Expr::This(this) => self.lookup(this.id, "this", &this.span, this.line),
            Expr::Assign(assign) => {
                let value = self.eval(&assign.value)?;
                match &assign.target {
                    AssignTarget::Var(ident) => {
                        self.assign_var(ident.id, &ident.name, value.clone(), &ident.span, ident.line)?;
                        Ok(value)
                    }
                    AssignTarget::Field { object, name, span, line } => {
                        let target = self.eval(object)?;
                        let Value::Obj(obj) = target else {
                            return Err(runtime(
                                span.clone(),
                                *line,
                                format!("only objects have fields, got {}", target.type_name()),
                            ));
                        };
                        obj.borrow_mut().fields.insert(name.clone(), value.clone());
                        Ok(value)
                    }
                }
            }
            Expr::Unary(node) => unary::eval(self, node),
            Expr::Binary(node) => binary::eval(self, node),
            Expr::Call(node) => call::eval(self, node),
            Expr::NativeCall(node) => {
                let args = node
                    .args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                crate::funcs::dispatch(&node.name, args, &node.span, node.line)
            }
            Expr::Tuple(tuple) => {
                let elements = tuple
                    .elements
                    .iter()
                    .map(|element| self.eval(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tuple(elements))
            }
            Expr::Vector(vector) => {
                let mut elements = Vec::with_capacity(vector.elements.len());
                for element in &vector.elements {
                    elements.push(self.eval_vector_element(element)?);
                }
                Ok(Value::Vector(Vector(elements)))
            }
            Expr::Matrix(matrix) => {
                let mut rows = Vec::with_capacity(matrix.rows.len());
                for row in &matrix.rows {
                    let mut elements = Vec::with_capacity(row.len());
                    for element in row {
                        elements.push(self.eval_vector_element(element)?);
                    }
                    rows.push(elements);
                }
                Matrix::from_rows(rows).map(Value::Matrix).ok_or_else(|| {
                    runtime(
                        matrix.span.clone(),
                        matrix.line,
                        "matrix rows must have the same length".to_string(),
                    )
                })
            }
            Expr::Index(index) => self.eval_index(index),
            Expr::Get(get) => {
                let object = self.eval(&get.object)?;
                let Value::Obj(obj) = &object else {
                    return Err(runtime(
                        get.span.clone(),
                        get.line,
                        format!("only objects have properties, got {}", object.type_name()),
                    ));
                };
                if let Some(value) = obj.borrow().fields.get(&get.name) {
                    return Ok(value.clone());
                }
                let method = obj.borrow().class.find_method(&get.name).map(Rc::clone);
                match method {
                    Some(method) => Ok(Value::Fn(Rc::new(method.bind(object.clone())))),
                    None => Err(runtime(
                        get.span.clone(),
                        get.line,
                        format!(
                            "undefined property '{}' on {} instance",
                            get.name,
                            obj.borrow().class.name
                        ),
                    )),
                }
            }
            Expr::Paren(paren) => self.eval(&paren.expr),
        }
    }

    fn eval_vector_element(&mut self, element: &Expr) -> Result<f64, Error> {
        let value = self.eval(element)?;
        value.coerce_number().ok_or_else(|| {
            runtime(
                element.span(),
                element.line(),
                format!("vector and matrix elements must be numbers, got {}", value.type_name()),
            )
        })
    }

    fn eval_index(
        &mut self,
        index: &winnow_parser::parser::ast::expr::Index,
    ) -> Result<Value, Error> {
        let target = self.eval(&index.target)?;
        let position = self.eval(&index.index)?;
        let i = position
            .coerce_number()
            .filter(|n| n.fract() == 0.0)
            .map(|n| n as i64)
            .ok_or_else(|| {
                runtime(
                    index.span.clone(),
                    index.line,
                    format!("indices must be integers, got {}", position.type_name()),
                )
            })?;

        match target {
            Value::Vector(vector) => Ok(vector
                .element(i)
                .map(Value::Number)
                .unwrap_or(Value::Absent)),
            Value::Matrix(matrix) => Ok(matrix
                .element(i)
                .map(Value::Vector)
                .unwrap_or(Value::Absent)),
            Value::Tuple(elements) => {
                if i >= 1 && (i as usize) <= elements.len() {
                    Ok(elements[i as usize - 1].clone())
                } else {
                    Ok(Value::Nil)
                }
            }
            other => Err(runtime(
                index.span.clone(),
                index.line,
                format!("cannot index into {}", other.type_name()),
            )),
        }
    }

    /// Reads a name through the resolved distance when one exists, falling back to the global
    /// frame by name.
    fn lookup(
        &self,
        id: NodeId,
        name: &str,
        span: &Range<usize>,
        line: usize,
    ) -> Result<Value, Error> {
        let found = match self.distances.get(&id) {
            Some(&distance) => Environment::get_at(&self.env, distance, name),
            None => self.globals.borrow().get(name),
        };
        found.ok_or_else(|| self.undefined_error(name, span, line))
    }

    fn assign_var(
        &mut self,
        id: NodeId,
        name: &str,
        value: Value,
        span: &Range<usize>,
        line: usize,
    ) -> Result<(), Error> {
        let result = match self.distances.get(&id) {
            Some(&distance) => Environment::assign_at(&self.env, distance, name, value),
            None => self.globals.borrow_mut().assign(name, value),
        };
        result.map_err(|err| match err {
            AssignError::Undefined => self.undefined_error(name, span, line),
            AssignError::Immutable => Error::new(
                span.clone(),
                line,
                ErrKind::Environment,
                format!("'{}' is not a mutable variable", name),
            ),
        })
    }

    /// An undefined-variable error, with a "did you mean" suggestion when a visible name is
    /// within edit distance 2.
    fn undefined_error(&self, name: &str, span: &Range<usize>, line: usize) -> Error {
        let mut message = format!("undefined variable '{}'", name);
        let candidates = self.env.borrow().visible_names();
        let best = candidates
            .iter()
            .map(|candidate| (levenshtein::levenshtein(name, candidate), candidate))
            .filter(|(distance, _)| *distance <= 2)
            .min_by_key(|(distance, _)| *distance);
        if let Some((_, suggestion)) = best {
            message.push_str(&format!("; did you mean '{}'?", suggestion));
        }
        Error::new(span.clone(), line, ErrKind::Environment, message)
    }
}

/// A runtime error at the given position.
pub(crate) fn runtime(span: Range<usize>, line: usize, message: String) -> Error {
    Error::new(span, line, ErrKind::Runtime, message)
}
