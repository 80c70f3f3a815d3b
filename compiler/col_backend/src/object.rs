//! The compiled artifact.

use std::fmt;

use col_ir::Number;

use crate::constraint::LExpression;

/// Version of the object layout produced by this compiler.
pub const OBJECT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// An entry of the shared constant pool.
///
/// Strings also hold node kind and attribute names.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constant {
    Number(Number),
    Str(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Number(n) => write!(f, "{n}"),
            Constant::Str(s) => write!(f, "'{s}'"),
        }
    }
}

/// One compiled mapping.
#[derive(Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mapping {
    pub name: String,
    /// Indices into the constraint's label pool. Empty for the
    /// unconditional mapping.
    pub labels: Vec<usize>,
    /// Two-byte instructions; see [`crate::opcode::Opcode`].
    pub code: Vec<u8>,
}

/// Everything the runtime needs from one source file.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Object {
    pub version: String,
    pub constraint: LExpression,
    pub const_pool: Vec<Constant>,
    pub mappings: Vec<Mapping>,
}

impl Object {
    pub fn new(constraint: LExpression, const_pool: Vec<Constant>, mappings: Vec<Mapping>) -> Self {
        Object {
            version: OBJECT_VERSION.to_string(),
            constraint,
            const_pool,
            mappings,
        }
    }

    pub fn mapping(&self, name: &str) -> Option<&Mapping> {
        self.mappings.iter().find(|m| m.name == name)
    }
}
