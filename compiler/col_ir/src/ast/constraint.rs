//! Constraint and predicate statements.
//!
//! Constraints describe the node tree a mapping accepts. Predicates are the
//! reusable tests applied to child sets selected by `with` statements.

use crate::Span;

use super::{Aggregator, Call, Comparison, Expr, Ident, Quantifier};

/// A quantified list of constraint statements.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintBlock {
    pub quantifier: Quantifier,
    pub stmts: Vec<ConstraintStmt>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintStmt {
    pub kind: ConstraintStmtKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ConstraintStmtKind {
    Block(ConstraintBlock),

    /// `.attr == value`
    Attr {
        attribute: Ident,
        comparison: Comparison,
        value: Expr,
    },

    /// `size == value`
    Size { comparison: Comparison, value: Expr },

    /// `sum socket == value`
    Aggregate {
        aggregator: Aggregator,
        kind: Ident,
        comparison: Comparison,
        value: Expr,
    },

    /// `label: with pred(args) kind { ... }`
    ///
    /// Without a block the selected children are not constrained further.
    With {
        label: Option<Ident>,
        predicate: Call,
        kind: Ident,
        block: Option<ConstraintBlock>,
    },

    /// `label: pred(args) ctype(args)`, applying a named constraint type.
    Call {
        label: Option<Ident>,
        predicate: Call,
        constraint: Call,
    },
}

/// A quantified list of predicate statements.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PredicateBlock {
    pub quantifier: Quantifier,
    pub stmts: Vec<PredicateStmt>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PredicateStmt {
    pub kind: PredicateStmtKind,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PredicateStmtKind {
    Block(PredicateBlock),
    Size {
        comparison: Comparison,
        value: Expr,
    },
    Aggregate {
        aggregator: Aggregator,
        kind: Ident,
        comparison: Comparison,
        value: Expr,
    },
}
