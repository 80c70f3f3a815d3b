//! AST of one source file and its includes.
//!
//! The tree is produced by the parser collaborator and is immutable from
//! the backend's point of view. Includes are already resolved into nested
//! [`File`]s; definition lookups search them depth-first.

mod constraint;
mod expr;
mod items;
mod operators;
mod stmt;

pub mod build;

use crate::{SourceId, Span};

pub use constraint::{
    ConstraintBlock, ConstraintStmt, ConstraintStmtKind, PredicateBlock, PredicateStmt,
    PredicateStmtKind,
};
pub use expr::{Call, Expr, ExprKind};
pub use items::{ConstraintMain, ConstraintType, FunctionDef, MappingDef, PredicateDef};
pub use operators::{Aggregator, BinaryOp, Comparison, Qualifier, Quantifier, UnaryOp};
pub use stmt::{Block, Stmt, StmtKind};

/// An identifier occurrence.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Ident {
            name: name.into(),
            span,
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// A top-level definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Definition {
    ConstraintMain(ConstraintMain),
    ConstraintType(ConstraintType),
    Predicate(PredicateDef),
    Function(FunctionDef),
    Mapping(MappingDef),
}

impl Definition {
    pub fn ident(&self) -> &Ident {
        match self {
            Definition::ConstraintMain(d) => &d.ident,
            Definition::ConstraintType(d) => &d.ident,
            Definition::Predicate(d) => &d.ident,
            Definition::Function(d) => &d.ident,
            Definition::Mapping(d) => &d.ident,
        }
    }
}

/// A parsed source file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct File {
    pub source: SourceId,
    pub includes: Vec<File>,
    pub definitions: Vec<Definition>,
}

impl File {
    pub fn new(source: SourceId, definitions: Vec<Definition>) -> Self {
        File {
            source,
            includes: Vec::new(),
            definitions,
        }
    }

    #[must_use]
    pub fn with_include(mut self, include: File) -> Self {
        self.includes.push(include);
        self
    }

    /// Mappings defined in this file. Mappings of included files are not
    /// compiled.
    pub fn mappings(&self) -> impl Iterator<Item = &MappingDef> {
        self.definitions.iter().filter_map(|def| match def {
            Definition::Mapping(m) => Some(m),
            _ => None,
        })
    }

    /// The `main` constraint.
    pub fn constraint_main(&self) -> Option<&ConstraintMain> {
        self.find(&|def| match def {
            Definition::ConstraintMain(c) if c.ident.name == "main" => Some(c),
            _ => None,
        })
    }

    pub fn constraint_type(&self, name: &str) -> Option<&ConstraintType> {
        self.find(&|def| match def {
            Definition::ConstraintType(c) if c.ident.name == name => Some(c),
            _ => None,
        })
    }

    pub fn predicate(&self, name: &str) -> Option<&PredicateDef> {
        self.find(&|def| match def {
            Definition::Predicate(p) if p.ident.name == name => Some(p),
            _ => None,
        })
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.find(&|def| match def {
            Definition::Function(f) if f.ident.name == name => Some(f),
            _ => None,
        })
    }

    /// Depth-first search: own definitions first, then the includes from
    /// the last declared one backwards. The first match wins.
    fn find<'a, T>(&'a self, select: &dyn Fn(&'a Definition) -> Option<&'a T>) -> Option<&'a T> {
        self.definitions.iter().find_map(select).or_else(|| {
            self.includes
                .iter()
                .rev()
                .find_map(|include| include.find(select))
        })
    }
}
