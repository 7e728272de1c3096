use std::ops::Range;
use super::expr::Expr;

/// Represents a statement in Winnow.
///
/// A program is a list of statements; the value of the final statement is the result of the
/// program.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// A bare expression statement, `x + 2;`.
    Expr(ExprStmt),

    /// A `print` statement.
    Print(PrintStmt),

    /// A `var` (mutable) or `let` (immutable) declaration. Both require an initializer.
    Decl(VarDecl),

    /// A function declaration, `fn name(params) { body }` or `fn name(params) = expr`.
    Fn(FnDecl),

    /// An `if` statement with an optional `else` branch.
    If(IfStmt),

    /// A `while` loop. C-style `for` loops are desugared into this shape by the parser.
    While(WhileStmt),

    /// A `return` statement.
    Return(ReturnStmt),

    /// A braced block of statements.
    Block(Block),

    /// A class declaration.
    Class(ClassDecl),
}

impl Stmt {
    /// Returns the span of the statement.
    pub fn span(&self) -> Range<usize> {
        match self {
            Stmt::Expr(s) => s.span.clone(),
            Stmt::Print(s) => s.span.clone(),
            Stmt::Decl(s) => s.span.clone(),
            Stmt::Fn(s) => s.span.clone(),
            Stmt::If(s) => s.span.clone(),
            Stmt::While(s) => s.span.clone(),
            Stmt::Return(s) => s.span.clone(),
            Stmt::Block(s) => s.span.clone(),
            Stmt::Class(s) => s.span.clone(),
        }
    }

    /// Returns the 1-based source line the statement begins on.
    pub fn line(&self) -> usize {
        match self {
            Stmt::Expr(s) => s.line,
            Stmt::Print(s) => s.line,
            Stmt::Decl(s) => s.line,
            Stmt::Fn(s) => s.line,
            Stmt::If(s) => s.line,
            Stmt::While(s) => s.line,
            Stmt::Return(s) => s.line,
            Stmt::Block(s) => s.line,
            Stmt::Class(s) => s.line,
        }
    }
}

/// A bare expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Range<usize>,
    pub line: usize,
}

/// A `print` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStmt {
    pub expr: Expr,
    pub span: Range<usize>,
    pub line: usize,
}

/// A variable declaration. `var` declares a mutable binding, `let` an immutable one.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub mutable: bool,
    pub init: Expr,
    pub span: Range<usize>,
    pub line: usize,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// A function declaration. The single-expression form `fn f(x) = e` is stored as a body
/// containing one `return` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Range<usize>,
    pub line: usize,
}

/// An `if` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A `while` loop.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A `return` statement. The value is optional; `return;` yields `nil`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A braced block of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A class declaration. A method named `def` is the class initializer.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<FnDecl>,
    pub span: Range<usize>,
    pub line: usize,
}
