mod display;
pub mod expr;
pub mod stmt;

pub use expr::Expr;
pub use stmt::Stmt;

/// An identifier for an AST node, assigned sequentially by the parser.
///
/// The resolver records variable-binding distances in a side table keyed by `NodeId`, and the
/// evaluator looks distances up through the same key. Only nodes the resolver annotates
/// (identifier reads, assignment targets, `this`, algebra literals) carry an id.
pub type NodeId = u32;
