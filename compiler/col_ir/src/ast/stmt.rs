//! Mapping and function statements.

use crate::Span;

use super::{Expr, Ident, Qualifier};

/// A braced statement list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A statement with its source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    #[inline]
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    #[must_use]
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    Block(Block),

    /// `var x = e;`, `final x = e;` or `const x = e;`
    Define {
        qualifier: Qualifier,
        ident: Ident,
        value: Expr,
    },

    /// `x = e;`
    Assign { ident: Ident, value: Expr },

    /// `return e;` or bare `return;`
    Return(Option<Expr>),

    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// `for x in e { ... }`
    For {
        binding: Ident,
        iterable: Expr,
        body: Block,
    },

    /// `fail e;` aborts the mapping with a message.
    Fail(Expr),

    /// Expression evaluated for its effect; the result is discarded.
    Expr(Expr),
}
