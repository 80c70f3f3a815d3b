//! Stack growth for recursive compiler passes.
//!
//! The constant evaluator, the bytecode emitter and the constraint lowering
//! all walk the AST recursively, and inlined function bodies add to the
//! depth. Each recursive entry point wraps its body in
//! [`ensure_sufficient_stack`] so that deeply nested programs compile
//! instead of overflowing:
//!
//! ```text
//! fn expr(&mut self, expr: &Expr) -> Result<Value> {
//!     ensure_sufficient_stack(|| self.expr_inner(expr))
//! }
//! ```
//!
//! On `wasm32` the call is a passthrough.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated segment.
const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, first growing the stack if less than the red zone remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
