//! Problem reporting for the constraint compiler.
//!
//! Compilation stops at the first problem. There are two kinds:
//!
//! - [`FatalProblem`]: the input program is wrong. Carries the source
//!   spans it is about and renders with excerpts of those lines.
//! - [`InternalProblem`]: the compiler itself hit an impossible state or a
//!   limit of the object format. Carries a backtrace.
//!
//! Both travel as [`Problem`] through `Result`s so that `?` propagates them
//! to the entry point.

mod problem;
mod render;

pub use problem::{FatalProblem, InternalProblem, Problem, Result};
