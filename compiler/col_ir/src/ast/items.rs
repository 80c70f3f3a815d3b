//! Top-level definitions.

use super::{Block, ConstraintBlock, Ident, PredicateBlock};

/// `con main { ... }`, the constraint a compiled object carries.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintMain {
    pub ident: Ident,
    pub block: ConstraintBlock,
}

/// `con type name kind(params) { ... }`, a reusable constraint on
/// children of one kind.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ConstraintType {
    pub ident: Ident,
    pub kind: Ident,
    pub params: Vec<Ident>,
    pub block: ConstraintBlock,
}

/// `pred name(params) { ... }`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct PredicateDef {
    pub ident: Ident,
    pub params: Vec<Ident>,
    pub block: PredicateBlock,
}

/// `fn name(params) { ... }`, always inlined at its call sites.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FunctionDef {
    pub ident: Ident,
    pub params: Vec<Ident>,
    pub body: Block,
}

/// `map name [labels] { ... }`
///
/// A mapping with no labels is unconditional.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MappingDef {
    pub ident: Ident,
    pub labels: Vec<Ident>,
    pub body: Block,
}
