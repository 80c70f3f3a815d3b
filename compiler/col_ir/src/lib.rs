//! Col IR - shared representation types for the constraint compiler.
//!
//! This crate contains the data handed from the parser collaborator to the
//! backend:
//! - Spans and source files for locating problems
//! - Compile-time constant data ([`ConstValue`])
//! - The immutable, already-typed AST with resolved includes
//!
//! Nothing in here performs semantic analysis. Lookups on [`ast::File`]
//! return `Option` and leave the reporting to the backend.

mod const_value;
mod source;
mod span;

pub mod ast;

pub use const_value::{ConstValue, Number};
pub use source::{Position, SourceFile, SourceId, SourceMap};
pub use span::Span;
