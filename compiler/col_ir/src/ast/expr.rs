//! Mapping expressions.

use crate::{ConstValue, Span};

use super::{BinaryOp, Ident, UnaryOp};

/// An expression with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    #[inline]
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Replace the span, for front ends building nodes bottom-up.
    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// A literal: number, string, bool, `none` or node kind.
    Literal(ConstValue),

    /// A reference to a binding: `x`
    Ref(Ident),

    /// Attribute read on a node binding: `node.attr`
    Attr { target: Ident, attribute: Ident },

    Unary { op: UnaryOp, operand: Box<Expr> },

    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Call of a builtin or a user function.
    Call(Call),

    /// List literal: `[a, b, c]`
    List(Vec<Expr>),
}

/// A call: `callee(args...)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Call {
    pub callee: Ident,
    pub args: Vec<Expr>,
    pub span: Span,
}
