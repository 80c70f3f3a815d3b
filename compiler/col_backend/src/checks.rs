//! Checks shared by the evaluator, the emitter and the constraint lowering.

use std::cmp::Ordering;

use col_diagnostic::{Problem, Result};
use col_ir::ast::Ident;
use col_ir::Span;
use col_types::Type;

/// Argument count of a call to a user definition.
pub fn check_arguments(params: &[Ident], args: usize, span: Span) -> Result<()> {
    match args.cmp(&params.len()) {
        Ordering::Less => Err(Problem::fatal_at("not enough arguments", span)),
        Ordering::Greater => Err(Problem::fatal_at("too many arguments", span)),
        Ordering::Equal => Ok(()),
    }
}

/// Argument count of a function call being inlined into a mapping.
pub fn check_argument_count(params: &[Ident], args: usize, span: Span) -> Result<()> {
    if args == params.len() {
        Ok(())
    } else {
        Err(Problem::fatal_at(
            format!("expected {} arguments", params.len()),
            span,
        ))
    }
}

/// A value of type `actual` is used where `expected` is required.
pub fn check_compatible(actual: Type, expected: Type, span: Span) -> Result<()> {
    if actual.compatible(expected) {
        Ok(())
    } else {
        Err(Problem::fatal_at(
            format!("argument {actual} not compatible with {expected}"),
            span,
        ))
    }
}

/// Lists hold scalars only.
pub fn check_list_element(ty: Type, span: Span) -> Result<()> {
    if ty.is_list() {
        Err(Problem::fatal_at("nested lists are not supported", span))
    } else {
        Ok(())
    }
}
