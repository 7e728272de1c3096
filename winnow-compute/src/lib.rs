//! The Winnow evaluation engine.
//!
//! This crate takes parsed Winnow programs and runs them: a static resolver computes lexical
//! distances, a tree-walking evaluator executes statements over a chain of scope frames, and a
//! symbolic algebra subsystem handles the quoted algebra objects. The [`engine::Engine`] façade
//! is the intended entry point for embedders and the REPL.

pub mod consts;
pub mod engine;
pub mod eval;
pub mod funcs;
pub mod numeric;
pub mod primitive;
pub mod resolver;
pub mod symbolic;
