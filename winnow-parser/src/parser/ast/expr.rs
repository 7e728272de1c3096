use std::ops::Range;
use super::NodeId;

/// Represents a general expression in Winnow.
///
/// An expression is any piece of code that can be evaluated to produce a value. Every node owns
/// its children exclusively; nodes that the resolver needs to annotate carry a [`NodeId`]
/// assigned by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer literal, such as `144` or `0xFF`.
    Integer(LitInt),

    /// A floating-point literal, such as `3.14`.
    Number(LitNum),

    /// An exact fraction literal, such as `3|4`.
    Fraction(LitFrac),

    /// A scientific-notation literal, such as `2E5`.
    Exponential(LitExp),

    /// A bignumber literal, such as `#912`. The digits are kept as text; the evaluator builds
    /// the arbitrary-precision integer.
    Big(LitBig),

    /// A boolean literal.
    Bool(LitBool),

    /// A double-quoted string literal.
    Str(LitStr),

    /// The `nil` literal.
    Nil(LitNil),

    /// A named numeric constant, such as `pi` or `tau`.
    Constant(LitConst),

    /// An algebra-string literal, such as `'x^2 + 1'`. The inner source is parsed by the
    /// algebra expression parser before evaluation begins.
    Algebra(LitAlgebra),

    /// A variable reference.
    Ident(Ident),

    /// An assignment to a variable or an object field.
    Assign(Assign),

    /// A unary operation, such as `-x` or `5!`.
    Unary(Unary),

    /// A binary operation, such as `1 + 2`.
    Binary(Binary),

    /// A call of a user-defined function or class, such as `f(2)`.
    Call(Call),

    /// A call of a native function, such as `sin(x)`.
    NativeCall(NativeCall),

    /// A tuple literal, such as `(1, 2)`.
    Tuple(TupleLit),

    /// A vector literal, such as `[1, 2, 3]`.
    Vector(VectorLit),

    /// A matrix literal, such as `[[1, 2], [3, 4]]`.
    Matrix(MatrixLit),

    /// A 1-based index into a vector, matrix, or tuple, such as `v[2]`.
    Index(Index),

    /// A field read on an object, such as `o.n`.
    Get(Get),

    /// The `this` expression inside a class method.
    This(This),

    /// A parenthesized expression, such as `(1 + 2)`.
    Paren(Paren),
}

impl Expr {
    /// Returns the span of the expression.
    pub fn span(&self) -> Range<usize> {
        match self {
            Expr::Integer(e) => e.span.clone(),
            Expr::Number(e) => e.span.clone(),
            Expr::Fraction(e) => e.span.clone(),
            Expr::Exponential(e) => e.span.clone(),
            Expr::Big(e) => e.span.clone(),
            Expr::Bool(e) => e.span.clone(),
            Expr::Str(e) => e.span.clone(),
            Expr::Nil(e) => e.span.clone(),
            Expr::Constant(e) => e.span.clone(),
            Expr::Algebra(e) => e.span.clone(),
            Expr::Ident(e) => e.span.clone(),
            Expr::Assign(e) => e.span.clone(),
            Expr::Unary(e) => e.span.clone(),
            Expr::Binary(e) => e.span.clone(),
            Expr::Call(e) => e.span.clone(),
            Expr::NativeCall(e) => e.span.clone(),
            Expr::Tuple(e) => e.span.clone(),
            Expr::Vector(e) => e.span.clone(),
            Expr::Matrix(e) => e.span.clone(),
            Expr::Index(e) => e.span.clone(),
            Expr::Get(e) => e.span.clone(),
            Expr::This(e) => e.span.clone(),
            Expr::Paren(e) => e.span.clone(),
        }
    }

    /// Returns the 1-based source line the expression begins on.
    pub fn line(&self) -> usize {
        match self {
            Expr::Integer(e) => e.line,
            Expr::Number(e) => e.line,
            Expr::Fraction(e) => e.line,
            Expr::Exponential(e) => e.line,
            Expr::Big(e) => e.line,
            Expr::Bool(e) => e.line,
            Expr::Str(e) => e.line,
            Expr::Nil(e) => e.line,
            Expr::Constant(e) => e.line,
            Expr::Algebra(e) => e.line,
            Expr::Ident(e) => e.line,
            Expr::Assign(e) => e.line,
            Expr::Unary(e) => e.line,
            Expr::Binary(e) => e.line,
            Expr::Call(e) => e.line,
            Expr::NativeCall(e) => e.line,
            Expr::Tuple(e) => e.line,
            Expr::Vector(e) => e.line,
            Expr::Matrix(e) => e.line,
            Expr::Index(e) => e.line,
            Expr::Get(e) => e.line,
            Expr::This(e) => e.line,
            Expr::Paren(e) => e.line,
        }
    }

    /// Returns true if this expression can participate in implicit multiplication when it
    /// appears directly before a parenthesized group, as in `(a + b)(c + d)`.
    pub fn is_implicit_mul_eligible(&self) -> bool {
        matches!(
            self,
            Expr::Integer(_)
                | Expr::Number(_)
                | Expr::Fraction(_)
                | Expr::Exponential(_)
                | Expr::Big(_)
                | Expr::Constant(_)
                | Expr::Paren(_)
                | Expr::Binary(_)
                | Expr::Unary(_)
        )
    }
}

/// An integer literal. The value is overflow-checked by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct LitInt {
    pub value: i64,
    pub span: Range<usize>,
    pub line: usize,
}

/// A floating-point literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LitNum {
    pub value: f64,
    pub span: Range<usize>,
    pub line: usize,
}

/// An exact fraction literal `n|d`.
#[derive(Debug, Clone, PartialEq)]
pub struct LitFrac {
    pub n: i64,
    pub d: i64,
    pub span: Range<usize>,
    pub line: usize,
}

/// A scientific-notation literal `mEn`.
#[derive(Debug, Clone, PartialEq)]
pub struct LitExp {
    pub m: f64,
    pub e: i64,
    pub span: Range<usize>,
    pub line: usize,
}

/// A bignumber literal `#n`. The digits exclude the `#` sigil and any separators.
#[derive(Debug, Clone, PartialEq)]
pub struct LitBig {
    pub digits: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// A boolean literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LitBool {
    pub value: bool,
    pub span: Range<usize>,
    pub line: usize,
}

/// A string literal. The value excludes the surrounding quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct LitStr {
    pub value: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// The `nil` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct LitNil {
    pub span: Range<usize>,
    pub line: usize,
}

/// A named numeric constant from the fixed constant dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct LitConst {
    pub name: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// An algebra-string literal. The source excludes the surrounding single quotes.
#[derive(Debug, Clone, PartialEq)]
pub struct LitAlgebra {
    pub id: NodeId,
    pub source: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// A variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub id: NodeId,
    pub span: Range<usize>,
    pub line: usize,
}

/// The target of an assignment. Only a bare identifier or a field access is legal.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Assignment to a variable, `x = e`.
    Var(Ident),

    /// Assignment to an object field, `o.n = e`.
    Field {
        object: Box<Expr>,
        name: String,
        span: Range<usize>,
        line: usize,
    },
}

impl AssignTarget {
    pub fn span(&self) -> Range<usize> {
        match self {
            AssignTarget::Var(ident) => ident.span.clone(),
            AssignTarget::Field { span, .. } => span.clone(),
        }
    }
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Box<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Prefix negation, `-x`.
    Neg,

    /// Prefix plus, `+x`.
    Pos,

    /// Logical negation, `not x`.
    Not,

    /// Postfix factorial, `x!`.
    Factorial,
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// The kind of a binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinOpKind {
    /// The user-visible spelling of the operator, used in runtime error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Pow => "^",
            BinOpKind::Concat => "&",
            BinOpKind::Eq => "==",
            BinOpKind::NotEq => "!=",
            BinOpKind::Less => "<",
            BinOpKind::LessEq => "<=",
            BinOpKind::Greater => ">",
            BinOpKind::GreaterEq => ">=",
            BinOpKind::And => "and",
            BinOpKind::Or => "or",
        }
    }
}

/// A binary operator, with a flag marking multiplications synthesized by the parser for
/// implicit-multiplication positions like `2x`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinOp {
    pub kind: BinOpKind,
    pub implicit: bool,
    pub span: Range<usize>,
}

/// A binary operation. Binary expressions can include nested expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub lhs: Box<Expr>,
    pub op: BinOp,
    pub rhs: Box<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A call of a user-defined function or class.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A call of a native function from the fixed dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A tuple literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleLit {
    pub elements: Vec<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A vector literal.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorLit {
    pub elements: Vec<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A matrix literal. Row lengths are validated at parse time; a jagged matrix is a syntax
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixLit {
    pub rows: Vec<Vec<Expr>>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A 1-based element access.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub target: Box<Expr>,
    pub index: Box<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}

/// A field read on an object.
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    pub object: Box<Expr>,
    pub name: String,
    pub span: Range<usize>,
    pub line: usize,
}

/// The `this` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct This {
    pub id: NodeId,
    pub span: Range<usize>,
    pub line: usize,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    pub expr: Box<Expr>,
    pub span: Range<usize>,
    pub line: usize,
}
