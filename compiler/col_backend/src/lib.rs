//! Backend of the constraint and mapping compiler.
//!
//! Takes a parsed [`File`] and produces an [`Object`]: the lowered main
//! constraint, the bytecode of every mapping, and the constant pool they
//! share.
//!
//! # Architecture
//!
//! - [`comptime`]: folds expressions whose value is known at compile time
//! - [`emit`]: generates mapping bytecode, inlining user functions
//! - [`constraint`]: lowers constraints to the [`LExpression`] tree
//! - [`scope`]: bindings of constant and runtime values
//! - [`builtins`]: the operator and builtin function table

pub mod builtins;
pub mod checks;
pub mod comptime;
pub mod config;
pub mod constraint;
pub mod context;
pub mod debug;
pub mod emit;
pub mod object;
pub mod opcode;
pub mod pool;
pub mod scope;

pub use builtins::Builtins;
pub use config::{Config, Optimization};
pub use constraint::{compile_constraint, LArg, LExpression, LFunction};
pub use context::Context;
pub use emit::compile_mappings;
pub use object::{Constant, Mapping, Object, OBJECT_VERSION};
pub use opcode::Opcode;

use col_diagnostic::Result;
use col_ir::ast::File;

/// Compile `file` with the given settings and builtin table.
///
/// The constraint is lowered first so that mappings can refer to its
/// activation labels.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile_file(file: &File, config: &Config, builtins: &Builtins) -> Result<Object> {
    let mut ctx = Context::new(file, config, builtins);
    let constraint = compile_constraint(&mut ctx)?;
    let mappings = compile_mappings(&mut ctx)?;
    tracing::debug!(
        mappings = mappings.len(),
        constants = ctx.const_pool().len(),
        "file compiled"
    );
    Ok(Object::new(constraint, ctx.into_const_pool(), mappings))
}
