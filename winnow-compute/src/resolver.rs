//! Static scope resolution.
//!
//! A single pass over the statement list that checks the structural scope rules and computes,
//! for every identifier read and assignment target, the number of enclosing-scope hops to the
//! declaring frame. The distances land in a [`NodeId`]-keyed side table the evaluator consumes;
//! names that resolve to no lexical scope are assumed global and looked up by name at run time.

use std::collections::HashMap;
use std::ops::Range;
use winnow_error::{ErrKind, Error};
use winnow_parser::parser::ast::expr::{AssignTarget, Expr};
use winnow_parser::parser::ast::stmt::{FnDecl, Stmt};
use winnow_parser::parser::ast::NodeId;

use crate::eval::value::INITIALIZER;

/// What kind of function body the resolver is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    None,
    Function,
    Method,
    Initializer,
}

/// Whether the resolver is currently inside a class body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClassKind {
    None,
    Class,
}

#[derive(Debug)]
pub struct Resolver {
    /// Innermost scope last. `false` marks a name that is declared but still inside its own
    /// initializer.
    scopes: Vec<HashMap<String, bool>>,
    distances: HashMap<NodeId, usize>,
    function: FunctionKind,
    class: ClassKind,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            distances: HashMap::new(),
            function: FunctionKind::None,
            class: ClassKind::None,
        }
    }

    /// Resolves the program, returning the distance side table. The first violation aborts the
    /// pass.
    ///
    /// The pass opens one scope for the program's top level, mirroring the evaluator's global
    /// frame, so `let x = x;` is rejected there too. Globals from previous engine runs are not
    /// in any scope and fall back to the by-name global lookup at run time.
    pub fn resolve(mut self, statements: &[Stmt]) -> Result<HashMap<NodeId, usize>, Error> {
        self.begin_scope();
        let result = statements
            .iter()
            .try_for_each(|statement| self.resolve_stmt(statement));
        self.end_scope();
        result.map(|()| self.distances)
    }

    fn error(span: Range<usize>, line: usize, message: String) -> Error {
        Error::new(span, line, ErrKind::Resolver, message)
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    /// Marks a name declared-but-not-ready in the current scope. Duplicates within one nested
    /// scope are a violation; the top-level scope allows redeclaration, matching the global
    /// frame's shadowing behavior.
    fn declare(&mut self, name: &str, span: Range<usize>, line: usize) -> Result<(), Error> {
        let nested = self.scopes.len() > 1;
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if nested && scope.contains_key(name) {
            return Err(Self::error(
                span,
                line,
                format!("a variable named '{}' is already declared in this scope", name),
            ));
        }
        scope.insert(name.to_string(), false);
        Ok(())
    }

    /// Marks a declared name ready for reads.
    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    /// Records the hop count from the innermost scope to the one declaring `name`. Unfound
    /// names are left for the global lookup at run time.
    fn resolve_local(&mut self, id: NodeId, name: &str) {
        for (hops, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.distances.insert(id, hops);
                return;
            }
        }
    }

    fn resolve_stmt(&mut self, statement: &Stmt) -> Result<(), Error> {
        match statement {
            Stmt::Expr(stmt) => self.resolve_expr(&stmt.expr),
            Stmt::Print(stmt) => self.resolve_expr(&stmt.expr),
            Stmt::Decl(decl) => {
                self.declare(&decl.name, decl.span.clone(), decl.line)?;
                self.resolve_expr(&decl.init)?;
                self.define(&decl.name);
                Ok(())
            }
            Stmt::Fn(decl) => {
                self.declare(&decl.name, decl.span.clone(), decl.line)?;
                self.define(&decl.name);
                self.resolve_function(decl, FunctionKind::Function)
            }
            Stmt::If(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                self.resolve_stmt(&stmt.then_branch)?;
                if let Some(else_branch) = &stmt.else_branch {
                    self.resolve_stmt(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.resolve_expr(&stmt.condition)?;
                self.resolve_stmt(&stmt.body)
            }
            Stmt::Return(stmt) => {
                if self.function == FunctionKind::None {
                    return Err(Self::error(
                        stmt.span.clone(),
                        stmt.line,
                        "cannot return from top-level code".to_string(),
                    ));
                }
                if let Some(value) = &stmt.value {
                    if self.function == FunctionKind::Initializer {
                        return Err(Self::error(
                            stmt.span.clone(),
                            stmt.line,
                            format!("cannot return a value from a '{}' initializer", INITIALIZER),
                        ));
                    }
                    self.resolve_expr(value)?;
                }
                Ok(())
            }
            Stmt::Block(block) => {
                self.begin_scope();
                let result = block
                    .statements
                    .iter()
                    .try_for_each(|stmt| self.resolve_stmt(stmt));
                self.end_scope();
                result
            }
            Stmt::Class(decl) => {
                self.declare(&decl.name, decl.span.clone(), decl.line)?;
                self.define(&decl.name);

                let enclosing = self.class;
                self.class = ClassKind::Class;
                self.begin_scope();
                if let Some(scope) = self.scopes.last_mut() {
                    scope.insert("this".to_string(), true);
                }

                let result = decl.methods.iter().try_for_each(|method| {
                    let kind = if method.name == INITIALIZER {
                        FunctionKind::Initializer
                    } else {
                        FunctionKind::Method
                    };
                    self.resolve_function(method, kind)
                });

                self.end_scope();
                self.class = enclosing;
                result
            }
        }
    }

    fn resolve_function(&mut self, decl: &FnDecl, kind: FunctionKind) -> Result<(), Error> {
        let enclosing = self.function;
        self.function = kind;
        self.begin_scope();

        let result = (|| {
            for param in &decl.params {
                self.declare(&param.name, param.span.clone(), param.line)?;
                self.define(&param.name);
            }
            decl.body.iter().try_for_each(|stmt| self.resolve_stmt(stmt))
        })();

        self.end_scope();
        self.function = enclosing;
        result
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match expr {
            Expr::Integer(_)
            | Expr::Number(_)
            | Expr::Fraction(_)
            | Expr::Exponential(_)
            | Expr::Big(_)
            | Expr::Bool(_)
            | Expr::Str(_)
            | Expr::Nil(_)
            | Expr::Constant(_)
            | Expr::Algebra(_) => Ok(()),
            Expr::Ident(ident) => {
                if self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(&ident.name))
                    == Some(&false)
                {
                    return Err(Self::error(
                        ident.span.clone(),
                        ident.line,
                        format!("cannot read variable '{}' in its own initializer", ident.name),
                    ));
                }
                self.resolve_local(ident.id, &ident.name);
                Ok(())
            }
            Expr::Assign(assign) => {
                self.resolve_expr(&assign.value)?;
                match &assign.target {
                    AssignTarget::Var(ident) => {
                        self.resolve_local(ident.id, &ident.name);
                        Ok(())
                    }
                    AssignTarget::Field { object, .. } => self.resolve_expr(object),
                }
            }
            Expr::Unary(unary) => self.resolve_expr(&unary.operand),
            Expr::Binary(binary) => {
                self.resolve_expr(&binary.lhs)?;
                self.resolve_expr(&binary.rhs)
            }
            Expr::Call(call) => {
                self.resolve_expr(&call.callee)?;
                call.args.iter().try_for_each(|arg| self.resolve_expr(arg))
            }
            Expr::NativeCall(call) => {
                call.args.iter().try_for_each(|arg| self.resolve_expr(arg))
            }
            Expr::Tuple(tuple) => tuple
                .elements
                .iter()
                .try_for_each(|element| self.resolve_expr(element)),
            Expr::Vector(vector) => vector
                .elements
                .iter()
                .try_for_each(|element| self.resolve_expr(element)),
            Expr::Matrix(matrix) => matrix
                .rows
                .iter()
                .flatten()
                .try_for_each(|element| self.resolve_expr(element)),
            Expr::Index(index) => {
                self.resolve_expr(&index.target)?;
                self.resolve_expr(&index.index)
            }
            Expr::Get(get) => self.resolve_expr(&get.object),
            Expr::This(this) => {
                if self.class == ClassKind::None {
                    return Err(Self::error(
                        this.span.clone(),
                        this.line,
                        "cannot use 'this' outside of a class".to_string(),
                    ));
                }
                self.resolve_local(this.id, "this");
                Ok(())
            }
            Expr::Paren(paren) => self.resolve_expr(&paren.expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winnow_parser::parser::Parser;

    fn resolve(source: &str) -> Result<HashMap<NodeId, usize>, Error> {
        let stmts = Parser::new(source).unwrap().parse_program().unwrap();
        Resolver::new().resolve(&stmts)
    }

    #[test]
    fn read_own_initializer_is_rejected() {
        let err = resolve("{ let x = x; }").unwrap_err();
        assert_eq!(err.kind, ErrKind::Resolver);
        assert!(err.message.contains("its own initializer"));
    }

    #[test]
    fn read_own_initializer_is_rejected_at_top_level() {
        let err = resolve("let x = x;").unwrap_err();
        assert_eq!(err.kind, ErrKind::Resolver);
    }

    #[test]
    fn duplicate_declaration_is_rejected() {
        let err = resolve("{ let x = 1; let x = 2; }").unwrap_err();
        assert!(err.message.contains("already declared"));
    }

    #[test]
    fn top_level_redeclaration_shadows() {
        assert!(resolve("let x = 1; let x = 2;").is_ok());
    }

    #[test]
    fn top_level_return_is_rejected() {
        let err = resolve("return 1;").unwrap_err();
        assert_eq!(err.kind, ErrKind::Resolver);
    }

    #[test]
    fn this_outside_a_class_is_rejected() {
        let err = resolve("fn f() { return this; }").unwrap_err();
        assert!(err.message.contains("'this'"));
    }

    #[test]
    fn initializer_cannot_return_a_value() {
        let err = resolve("class C { def() { return 1; } }").unwrap_err();
        assert!(err.message.contains("initializer"));
    }

    #[test]
    fn bare_return_in_initializer_is_allowed() {
        assert!(resolve("class C { def() { return; } }").is_ok());
    }

    #[test]
    fn distances_count_scope_hops() {
        let stmts = Parser::new("fn f(a) { { a; } }")
            .unwrap()
            .parse_program()
            .unwrap();
        let distances = Resolver::new().resolve(&stmts).unwrap();
        // the read of `a` sits one block inside the function scope declaring it
        assert!(distances.values().any(|&d| d == 1));
    }

    #[test]
    fn globals_are_left_unresolved() {
        let stmts = Parser::new("x + 1").unwrap().parse_program().unwrap();
        let distances = Resolver::new().resolve(&stmts).unwrap();
        assert!(distances.is_empty());
    }
}
