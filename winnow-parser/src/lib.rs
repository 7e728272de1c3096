//! The tokenizer and parser for the Winnow language.
//!
//! Source text is scanned by the [`tokenizer`] into a flat token stream, then parsed by the
//! binding-power [`parser`] into the statement and expression trees in [`parser::ast`]. Both
//! stages fail fast: the first lexical or syntax error aborts the pipeline.

pub mod parser;
pub mod tokenizer;
