//! Compiler facade.
//!
//! The command line front end parses a root file and its includes into a
//! [`File`], registers every file's text in a [`SourceMap`] and then only
//! talks to this crate:
//!
//! ```text
//! File + flags ──► compile ──► Object ──► listing (debug output)
//!                     │
//!                     └──► Problem ──► render_problem
//! ```
//!
//! Enable logging with `RUST_LOG=col_backend=debug` after calling
//! [`init_tracing`].

use std::fmt::Write;
use std::sync::Once;

pub use col_backend::{
    Builtins, Config, Constant, LArg, LExpression, LFunction, Mapping, Object, Opcode,
    Optimization, OBJECT_VERSION,
};
pub use col_diagnostic::{Problem, Result};
pub use col_ir::ast::File;
pub use col_ir::{SourceFile, SourceId, SourceMap};

use col_backend::debug::{format_code, format_pool};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Nothing is installed unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Compile `file` with the standard builtin table.
pub fn compile(file: &File, config: &Config) -> Result<Object> {
    col_backend::compile_file(file, config, &Builtins::standard())
}

/// Compile `file` with optimizations chosen by command line flags such as
/// `all`, `none` or `no-redundant-quantifier`.
pub fn compile_with_flags<'f>(
    file: &File,
    flags: impl IntoIterator<Item = &'f str>,
) -> Result<Object> {
    let config = Config::from_flags(flags)?;
    tracing::debug!(?config, "optimization flags");
    compile(file, &config)
}

/// Render a problem the way the command line reports it.
pub fn render_problem(problem: &Problem, sources: &SourceMap) -> String {
    problem.render(sources)
}

/// Human-readable dump of a compiled object: the constraint tree, the
/// constant pool and a disassembly of every mapping.
pub fn listing(object: &Object) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "version {}", object.version);
    let _ = writeln!(out, "constraint {}", object.constraint);
    out.push_str("\nconstants\n");
    out.push_str(&format_pool(&object.const_pool));
    for mapping in &object.mappings {
        let _ = writeln!(out, "\nmapping {} {:?}", mapping.name, mapping.labels);
        out.push_str(&format_code(&mapping.code));
    }
    out
}
