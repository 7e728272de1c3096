//! Indented tree rendering for AST nodes, used by the engine's debug dumps.

use std::fmt::{self, Display, Formatter};

use super::expr::{AssignTarget, Expr, UnaryOp};
use super::stmt::Stmt;

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_stmt(self, 0, f)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fmt_expr(self, 0, f)
    }
}

fn pad(depth: usize, f: &mut Formatter<'_>) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "  ")?;
    }
    Ok(())
}

fn fmt_stmt(stmt: &Stmt, depth: usize, f: &mut Formatter<'_>) -> fmt::Result {
    pad(depth, f)?;
    match stmt {
        Stmt::Expr(s) => {
            writeln!(f, "Expr")?;
            fmt_expr(&s.expr, depth + 1, f)
        }
        Stmt::Print(s) => {
            writeln!(f, "Print")?;
            fmt_expr(&s.expr, depth + 1, f)
        }
        Stmt::Decl(s) => {
            writeln!(f, "{} {}", if s.mutable { "Var" } else { "Let" }, s.name)?;
            fmt_expr(&s.init, depth + 1, f)
        }
        Stmt::Fn(s) => {
            let params: Vec<&str> = s.params.iter().map(|p| p.name.as_str()).collect();
            writeln!(f, "Fn {}({})", s.name, params.join(", "))?;
            s.body.iter().try_for_each(|stmt| fmt_stmt(stmt, depth + 1, f))
        }
        Stmt::If(s) => {
            writeln!(f, "If")?;
            fmt_expr(&s.condition, depth + 1, f)?;
            fmt_stmt(&s.then_branch, depth + 1, f)?;
            if let Some(else_branch) = &s.else_branch {
                pad(depth, f)?;
                writeln!(f, "Else")?;
                fmt_stmt(else_branch, depth + 1, f)?;
            }
            Ok(())
        }
        Stmt::While(s) => {
            writeln!(f, "While")?;
            fmt_expr(&s.condition, depth + 1, f)?;
            fmt_stmt(&s.body, depth + 1, f)
        }
        Stmt::Return(s) => {
            writeln!(f, "Return")?;
            match &s.value {
                Some(value) => fmt_expr(value, depth + 1, f),
                None => Ok(()),
            }
        }
        Stmt::Block(s) => {
            writeln!(f, "Block")?;
            s.statements.iter().try_for_each(|stmt| fmt_stmt(stmt, depth + 1, f))
        }
        Stmt::Class(s) => {
            writeln!(f, "Class {}", s.name)?;
            s.methods
                .iter()
                .try_for_each(|method| fmt_stmt(&Stmt::Fn(method.clone()), depth + 1, f))
        }
    }
}

fn fmt_expr(expr: &Expr, depth: usize, f: &mut Formatter<'_>) -> fmt::Result {
    pad(depth, f)?;
    match expr {
        Expr::Integer(e) => writeln!(f, "Integer {}", e.value),
        Expr::Number(e) => writeln!(f, "Number {}", e.value),
        Expr::Fraction(e) => writeln!(f, "Fraction {}|{}", e.n, e.d),
        Expr::Exponential(e) => writeln!(f, "Exponential {}E{}", e.m, e.e),
        Expr::Big(e) => writeln!(f, "Big #{}", e.digits),
        Expr::Bool(e) => writeln!(f, "Bool {}", e.value),
        Expr::Str(e) => writeln!(f, "Str \"{}\"", e.value),
        Expr::Nil(_) => writeln!(f, "Nil"),
        Expr::Constant(e) => writeln!(f, "Constant {}", e.name),
        Expr::Algebra(e) => writeln!(f, "Algebra '{}'", e.source),
        Expr::Ident(e) => writeln!(f, "Ident {}", e.name),
        Expr::Assign(e) => {
            match &e.target {
                AssignTarget::Var(ident) => writeln!(f, "Assign {}", ident.name)?,
                AssignTarget::Field { object, name, .. } => {
                    writeln!(f, "AssignField .{}", name)?;
                    fmt_expr(object, depth + 1, f)?;
                }
            }
            fmt_expr(&e.value, depth + 1, f)
        }
        Expr::Unary(e) => {
            let op = match e.op {
                UnaryOp::Neg => "-",
                UnaryOp::Pos => "+",
                UnaryOp::Not => "not",
                UnaryOp::Factorial => "!",
            };
            writeln!(f, "Unary {}", op)?;
            fmt_expr(&e.operand, depth + 1, f)
        }
        Expr::Binary(e) => {
            writeln!(
                f,
                "Binary {}{}",
                e.op.kind.as_str(),
                if e.op.implicit { " (implicit)" } else { "" }
            )?;
            fmt_expr(&e.lhs, depth + 1, f)?;
            fmt_expr(&e.rhs, depth + 1, f)
        }
        Expr::Call(e) => {
            writeln!(f, "Call")?;
            fmt_expr(&e.callee, depth + 1, f)?;
            e.args.iter().try_for_each(|arg| fmt_expr(arg, depth + 1, f))
        }
        Expr::NativeCall(e) => {
            writeln!(f, "NativeCall {}", e.name)?;
            e.args.iter().try_for_each(|arg| fmt_expr(arg, depth + 1, f))
        }
        Expr::Tuple(e) => {
            writeln!(f, "Tuple")?;
            e.elements.iter().try_for_each(|el| fmt_expr(el, depth + 1, f))
        }
        Expr::Vector(e) => {
            writeln!(f, "Vector")?;
            e.elements.iter().try_for_each(|el| fmt_expr(el, depth + 1, f))
        }
        Expr::Matrix(e) => {
            writeln!(f, "Matrix {}x{}", e.rows.len(), e.rows.first().map_or(0, Vec::len))?;
            e.rows
                .iter()
                .flatten()
                .try_for_each(|el| fmt_expr(el, depth + 1, f))
        }
        Expr::Index(e) => {
            writeln!(f, "Index")?;
            fmt_expr(&e.target, depth + 1, f)?;
            fmt_expr(&e.index, depth + 1, f)
        }
        Expr::Get(e) => {
            writeln!(f, "Get .{}", e.name)?;
            fmt_expr(&e.object, depth + 1, f)
        }
        Expr::This(_) => writeln!(f, "This"),
        Expr::Paren(e) => {
            writeln!(f, "Paren")?;
            fmt_expr(&e.expr, depth + 1, f)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    #[test]
    fn statements_render_as_an_indented_tree() {
        let stmts = Parser::new("let x = 1 + 2;").unwrap().parse_program().unwrap();
        assert_eq!(
            stmts[0].to_string(),
            "Let x\n  Binary +\n    Integer 1\n    Integer 2\n",
        );
    }
}
