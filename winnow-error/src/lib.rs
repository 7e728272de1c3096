//! The common [`Error`] type shared by every stage of the Winnow engine, from the tokenizer
//! through the symbolic algebra subsystem.
//!
//! Winnow has a flat taxonomy of seven error kinds (see [`ErrKind`]). Every error that escapes
//! the engine is rendered as a single line in a fixed format:
//!
//! ```text
//! On line 2, a syntax-error occured: expected an expression after '('.
//! ```
//!
//! The format (including the spelling of "occured" and the article "an" before
//! `environment-error`) is part of the engine's compatibility contract and must not change.
//! Richer terminal reports with source highlighting are available via [`Error::build_report`].

use ariadne::{Color, Label, Report, ReportKind};
use std::{fmt, ops::Range};

/// The color used to highlight the offending region of source code in reports.
pub const HIGHLIGHT: Color = Color::RGB(52, 235, 152);

/// The seven kinds of errors the engine can produce.
///
/// The taxonomy is flat; there are no sub-kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrKind {
    /// An error found while scanning source text into tokens.
    Lexical,

    /// An error found while parsing tokens into an AST, including algebra-string parse errors.
    Syntax,

    /// An invalid operand or argument type found during evaluation.
    Type,

    /// An error raised during evaluation, such as an invalid operand pair for an operator.
    Runtime,

    /// An undefined-variable or immutable-assignment violation.
    Environment,

    /// An internal invariant violation inside the symbolic algebra subsystem.
    Algebra,

    /// A static scope-rule violation found by the resolver.
    Resolver,
}

impl ErrKind {
    /// The user-visible name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrKind::Lexical => "lexical-error",
            ErrKind::Syntax => "syntax-error",
            ErrKind::Type => "type-error",
            ErrKind::Runtime => "runtime-error",
            ErrKind::Environment => "environment-error",
            ErrKind::Algebra => "algebra-error",
            ErrKind::Resolver => "resolver-error",
        }
    }

    /// The indefinite article preceding the kind name in the formatted message.
    pub fn article(self) -> &'static str {
        match self {
            ErrKind::Environment => "an",
            _ => "a",
        }
    }
}

impl fmt::Display for ErrKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error produced by any stage of the engine, tied to a region of source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The region of the source code that this error originated from.
    pub span: Range<usize>,

    /// The 1-based source line the error occurred on.
    pub line: usize,

    /// The kind of error that occurred.
    pub kind: ErrKind,

    /// The human-readable description of the error.
    pub message: String,
}

impl Error {
    /// Creates a new error with the given span, line, kind, and message.
    pub fn new(span: Range<usize>, line: usize, kind: ErrKind, message: impl Into<String>) -> Self {
        Self { span, line, kind, message: message.into() }
    }

    /// Builds a rich [`ariadne`] report for this error, pointing at the offending span.
    pub fn build_report<'a>(&self, src_id: &'a str) -> Report<(&'a str, Range<usize>)> {
        Report::build(ReportKind::Error, src_id, self.span.start)
            .with_message(self.to_string())
            .with_label(
                Label::new((src_id, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(HIGHLIGHT),
            )
            .finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "On line {}, {} {} occured: {}",
            self.line,
            self.kind.article(),
            self.kind,
            self.message
        )
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatted_message() {
        let err = Error::new(4..5, 1, ErrKind::Syntax, "expected an expression");
        assert_eq!(
            err.to_string(),
            "On line 1, a syntax-error occured: expected an expression",
        );
    }

    #[test]
    fn environment_article() {
        let err = Error::new(0..1, 3, ErrKind::Environment, "the variable 'q' is not defined");
        assert_eq!(
            err.to_string(),
            "On line 3, an environment-error occured: the variable 'q' is not defined",
        );
    }
}
