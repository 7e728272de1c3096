//! The embedding façade.
//!
//! [`Engine`] ties the pipeline together: tokenize, parse, pre-parse algebra literals, resolve,
//! evaluate. State persists across [`Engine::compile`] calls so a REPL can feed it one line at
//! a time; [`Engine::clear`] drops everything back to a fresh session.

use std::collections::HashMap;
use winnow_error::Error;
use winnow_parser::parser::ast::expr::{AssignTarget, Expr};
use winnow_parser::parser::ast::stmt::Stmt;
use winnow_parser::parser::ast::NodeId;
use winnow_parser::parser::Parser;
use winnow_parser::tokenizer;

use crate::eval::value::Value;
use crate::eval::Interpreter;
use crate::resolver::Resolver;
use crate::symbolic::{parse_algebra, MathObj};

#[derive(Debug, Default)]
pub struct Engine {
    interpreter: Interpreter,
    /// First [`NodeId`] the next compile may use. Closures keep statement trees from earlier
    /// compiles alive, so ids must never repeat across compiles.
    next_id: NodeId,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps `while` loops at `limit` iterations. Unlimited by default.
    pub fn with_loop_limit(limit: u64) -> Self {
        Self {
            interpreter: Interpreter::new().with_loop_limit(limit),
            next_id: 0,
        }
    }

    /// Runs a piece of source through the full pipeline, returning the value of its last
    /// statement. Declarations persist into later calls.
    pub fn compile(&mut self, source: &str) -> Result<Value, Error> {
        let mut parser = Parser::with_base_id(source, self.next_id)?;
        let statements = parser.parse_program()?;
        self.next_id = parser.id_watermark();

        let mut algebra = HashMap::new();
        for statement in &statements {
            collect_algebra_stmt(statement, &mut algebra)?;
        }
        let distances = Resolver::new().resolve(&statements)?;

        self.interpreter.install_bindings(distances, algebra);
        self.interpreter.interpret(&statements)
    }

    /// A debug dump of the lexed stream, one token per line, or the lexical error rendered in
    /// the standard format.
    pub fn tokens(&self, source: &str) -> String {
        match tokenizer::tokenize_complete(source) {
            Ok(tokens) => tokens
                .iter()
                .map(|token| format!("{}\n", token))
                .collect(),
            Err(err) => err.to_string(),
        }
    }

    /// A debug tree-dump of the parsed statements, or the syntax/resolver error rendered in
    /// the standard format. Does not evaluate and does not consume ids from the session.
    pub fn ast(&self, source: &str) -> String {
        let statements = match Parser::new(source).and_then(|mut p| p.parse_program()) {
            Ok(statements) => statements,
            Err(err) => return err.to_string(),
        };
        if let Err(err) = Resolver::new().resolve(&statements) {
            return err.to_string();
        }
        statements.iter().map(|stmt| stmt.to_string()).collect()
    }

    /// The live interpreter, for collaborators that call compiled functions repeatedly.
    pub fn interpreter(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Output printed by `print` statements since the last drain.
    pub fn drain_output(&mut self) -> Vec<String> {
        self.interpreter.drain_output()
    }

    /// Drops all session state: globals, resolved bindings, pending output.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Parses every algebra literal in the statement into the side table. A malformed literal is
/// reported at the literal's own position.
fn collect_algebra_stmt(
    statement: &Stmt,
    algebra: &mut HashMap<NodeId, MathObj>,
) -> Result<(), Error> {
    match statement {
        Stmt::Expr(s) => collect_algebra(&s.expr, algebra),
        Stmt::Print(s) => collect_algebra(&s.expr, algebra),
        Stmt::Decl(s) => collect_algebra(&s.init, algebra),
        Stmt::Fn(s) => s
            .body
            .iter()
            .try_for_each(|stmt| collect_algebra_stmt(stmt, algebra)),
        Stmt::If(s) => {
            collect_algebra(&s.condition, algebra)?;
            collect_algebra_stmt(&s.then_branch, algebra)?;
            match &s.else_branch {
                Some(branch) => collect_algebra_stmt(branch, algebra),
                None => Ok(()),
            }
        }
        Stmt::While(s) => {
            collect_algebra(&s.condition, algebra)?;
            collect_algebra_stmt(&s.body, algebra)
        }
        Stmt::Return(s) => match &s.value {
            Some(expr) => collect_algebra(expr, algebra),
            None => Ok(()),
        },
        Stmt::Block(s) => s
            .statements
            .iter()
            .try_for_each(|stmt| collect_algebra_stmt(stmt, algebra)),
        Stmt::Class(s) => s.methods.iter().try_for_each(|method| {
            method
                .body
                .iter()
                .try_for_each(|stmt| collect_algebra_stmt(stmt, algebra))
        }),
    }
}

fn collect_algebra(expr: &Expr, algebra: &mut HashMap<NodeId, MathObj>) -> Result<(), Error> {
    match expr {
        Expr::Algebra(lit) => {
            let parsed = parse_algebra(&lit.source).map_err(|err| {
                Error::new(lit.span.clone(), lit.line, err.kind, err.message)
            })?;
            algebra.insert(lit.id, parsed);
            Ok(())
        }
        Expr::Assign(e) => {
            if let AssignTarget::Field { object, .. } = &e.target {
                collect_algebra(object, algebra)?;
            }
            collect_algebra(&e.value, algebra)
        }
        Expr::Unary(e) => collect_algebra(&e.operand, algebra),
        Expr::Binary(e) => {
            collect_algebra(&e.lhs, algebra)?;
            collect_algebra(&e.rhs, algebra)
        }
        Expr::Call(e) => {
            collect_algebra(&e.callee, algebra)?;
            e.args.iter().try_for_each(|arg| collect_algebra(arg, algebra))
        }
        Expr::NativeCall(e) => e.args.iter().try_for_each(|arg| collect_algebra(arg, algebra)),
        Expr::Tuple(e) => e
            .elements
            .iter()
            .try_for_each(|element| collect_algebra(element, algebra)),
        Expr::Vector(e) => e
            .elements
            .iter()
            .try_for_each(|element| collect_algebra(element, algebra)),
        Expr::Matrix(e) => e.rows.iter().try_for_each(|row| {
            row.iter().try_for_each(|element| collect_algebra(element, algebra))
        }),
        Expr::Index(e) => {
            collect_algebra(&e.target, algebra)?;
            collect_algebra(&e.index, algebra)
        }
        Expr::Get(e) => collect_algebra(&e.object, algebra),
        Expr::Paren(e) => collect_algebra(&e.expr, algebra),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    #[test]
    fn state_persists_across_compiles() {
        let mut engine = Engine::new();
        engine.compile("var x = 5;").unwrap();
        let value = engine.compile("x + 2;").unwrap();
        assert_eq!(value, Value::Number(7.0));
    }

    #[test]
    fn radix_and_bignumber_literals_evaluate() {
        let mut engine = Engine::new();
        assert_eq!(engine.compile("0xFF;").unwrap(), Value::Number(255.0));
        assert_eq!(engine.compile("0o17 + 0b101;").unwrap(), Value::Number(20.0));
        assert_eq!(engine.compile("2E5;").unwrap().to_string(), "2E5");
        let big = engine.compile("#123456789012345678901234567890 + 1;").unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567891");
    }

    #[test]
    fn clear_forgets_everything() {
        let mut engine = Engine::new();
        engine.compile("let x = 5;").unwrap();
        engine.clear();
        let err = engine.compile("x;").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Environment);
    }

    #[test]
    fn closures_survive_later_compiles() {
        let mut engine = Engine::new();
        engine
            .compile("fn adder(n) { fn add(m) = m + n; return add; }")
            .unwrap();
        engine.compile("let add2 = adder(2);").unwrap();
        let value = engine.compile("add2(5);").unwrap();
        assert_eq!(value, Value::Number(7.0));
    }

    #[test]
    fn malformed_algebra_literals_fail_at_the_literal() {
        let mut engine = Engine::new();
        let err = engine.compile("let u = 'x +';").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.kind, winnow_error::ErrKind::Syntax);
    }

    #[test]
    fn algebra_literals_simplify_on_combination() {
        let mut engine = Engine::new();
        let value = engine.compile("'x' + 'x';").unwrap();
        assert_eq!(value.to_string(), "2*x");
    }

    #[test]
    fn single_expression_functions() {
        let mut engine = Engine::new();
        engine.compile("fn sq(n) = n^2;").unwrap();
        assert_eq!(engine.compile("sq(4);").unwrap(), Value::Number(16.0));
    }

    #[test]
    fn let_bindings_are_immutable() {
        let mut engine = Engine::new();
        let err = engine.compile("let x = 1; x = 2;").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Environment);
        assert_eq!(
            err.to_string(),
            "On line 1, an environment-error occured: 'x' is not a mutable variable",
        );
    }

    #[test]
    fn undefined_variables_suggest_near_misses() {
        let mut engine = Engine::new();
        engine.compile("let total = 10;").unwrap();
        let err = engine.compile("totol;").unwrap_err();
        assert_eq!(
            err.message,
            "undefined variable 'totol'; did you mean 'total'?"
        );
    }

    #[test]
    fn division_by_zero_yields_infinity() {
        let mut engine = Engine::new();
        let value = engine.compile("1/0;").unwrap();
        assert_eq!(value.to_string(), "Infinity");
    }

    #[test]
    fn fraction_arithmetic_stays_exact() {
        let mut engine = Engine::new();
        let value = engine.compile("1|3 + 1|6;").unwrap();
        assert_eq!(value.to_string(), "1|2");
    }

    #[test]
    fn implicit_multiplication_binds_tight() {
        let mut engine = Engine::new();
        engine.compile("let x = 4;").unwrap();
        assert_eq!(engine.compile("6/2x;").unwrap(), Value::Number(0.75));
        assert_eq!(engine.compile("2x + 1;").unwrap(), Value::Number(9.0));
    }

    #[test]
    fn classes_initialize_through_def() {
        let mut engine = Engine::new();
        engine
            .compile("class Point { def(x, y) { this.x = x; this.y = y; } sum() = this.x + this.y; }")
            .unwrap();
        engine.compile("let p = Point(3, 4);").unwrap();
        assert_eq!(engine.compile("p;").unwrap().to_string(), "Point instance");
        assert_eq!(engine.compile("p.sum();").unwrap(), Value::Number(7.0));
        assert_eq!(engine.compile("p.x;").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn print_output_is_buffered_until_drained() {
        let mut engine = Engine::new();
        engine.compile("print 1 + 1; print \"done\";").unwrap();
        assert_eq!(engine.drain_output(), vec!["2", "done"]);
        assert!(engine.drain_output().is_empty());
    }

    #[test]
    fn loop_limit_stops_runaway_loops() {
        let mut engine = Engine::with_loop_limit(10);
        let err = engine.compile("var i = 0; while i < 100 { i = i + 1; }").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Runtime);

        let mut unlimited = Engine::new();
        unlimited.compile("var i = 0; while i < 100 { i = i + 1; }").unwrap();
        assert_eq!(unlimited.compile("i;").unwrap(), Value::Number(100.0));
    }

    #[test]
    fn unbounded_recursion_is_caught() {
        let mut engine = Engine::new();
        engine.compile("fn f(n) = f(n + 1);").unwrap();
        let err = engine.compile("f(0);").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Runtime);
    }

    #[test]
    fn recursion_within_the_ceiling_works() {
        let mut engine = Engine::new();
        engine
            .compile("fn fib(n) { if n < 2 { return n; } return fib(n - 1) + fib(n - 2); }")
            .unwrap();
        assert_eq!(engine.compile("fib(12);").unwrap(), Value::Number(144.0));
    }

    #[test]
    fn out_of_range_vector_elements_are_absent() {
        let mut engine = Engine::new();
        engine.compile("let v = [10, 20, 30];").unwrap();
        assert_eq!(engine.compile("v[2];").unwrap(), Value::Number(20.0));
        assert_eq!(engine.compile("v[4];").unwrap().to_string(), "absent");
        assert_eq!(engine.compile("v[0];").unwrap().to_string(), "absent");
    }

    #[test]
    fn matrix_rows_index_as_vectors() {
        let mut engine = Engine::new();
        engine.compile("let m = [[1, 2], [3, 4]];").unwrap();
        assert_eq!(engine.compile("m[2];").unwrap().to_string(), "[3, 4]");
        assert_eq!(engine.compile("m[2][1];").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn for_loops_desugar_and_run() {
        let mut engine = Engine::new();
        engine
            .compile("var sum = 0; for(var i = 1; i <= 4; i++) { sum = sum + i; }")
            .unwrap();
        assert_eq!(engine.compile("sum;").unwrap(), Value::Number(10.0));
    }

    #[test]
    fn compound_assignment_desugars() {
        let mut engine = Engine::new();
        engine.compile("var n = 10; n += 5; n *= 2;").unwrap();
        assert_eq!(engine.compile("n;").unwrap(), Value::Number(30.0));
        engine.compile("n++;").unwrap();
        assert_eq!(engine.compile("n;").unwrap(), Value::Number(31.0));
    }

    #[test]
    fn derive_and_simplify_natives_round_trip_text() {
        let mut engine = Engine::new();
        let value = engine.compile("derive('x^2 + 3*x', 'x');").unwrap();
        assert_eq!(value.to_string(), "3 + 2*x");

        let simplified = engine.compile("simplify('x + 0 + x');").unwrap();
        assert_eq!(simplified.to_string(), "2*x");
    }

    #[test]
    fn shadowing_in_a_block_does_not_leak() {
        let mut engine = Engine::new();
        engine
            .compile("let x = 1; var seen = 0; { let x = 2; seen = x; }")
            .unwrap();
        assert_eq!(engine.compile("seen;").unwrap(), Value::Number(2.0));
        assert_eq!(engine.compile("x;").unwrap(), Value::Number(1.0));
    }

    #[test]
    fn self_reference_in_an_initializer_is_rejected() {
        let mut engine = Engine::new();
        let err = engine.compile("let x = x;").unwrap_err();
        assert_eq!(err.kind, winnow_error::ErrKind::Resolver);
    }

    #[test]
    fn tuples_index_with_nil_out_of_range() {
        let mut engine = Engine::new();
        engine.compile("let t = (1, \"two\", 3);").unwrap();
        assert_eq!(engine.compile("t[2];").unwrap(), Value::Str("two".to_string()));
        assert_eq!(engine.compile("t[9];").unwrap(), Value::Nil);
    }

    #[test]
    fn debug_dumps_render_or_report() {
        let engine = Engine::new();
        let tokens = engine.tokens("1 + x");
        assert!(tokens.contains("Int '1'"), "{}", tokens);
        assert!(tokens.contains("Name 'x'"), "{}", tokens);

        let ast = engine.ast("let y = 1 + 2;");
        assert_eq!(ast, "Let y\n  Binary +\n    Integer 1\n    Integer 2\n");

        let err = engine.ast("let y = ;");
        assert!(err.starts_with("On line 1, a syntax-error occured:"), "{}", err);
    }

    #[test]
    fn concatenation_stringifies() {
        let mut engine = Engine::new();
        let value = engine.compile("\"n = \" & 1|2;").unwrap();
        assert_eq!(value, Value::Str("n = 1|2".to_string()));
    }
}
