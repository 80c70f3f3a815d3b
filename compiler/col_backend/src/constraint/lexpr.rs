//! Constraint tree.

use std::fmt;

use col_ir::ast::{Aggregator, Comparison, Quantifier};
use col_ir::ConstValue;

/// Tag of a constraint tree node. The discriminants are part of the
/// object format.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LFunction {
    With = 0,
    Attr = 1,
    All = 2,
    Any = 3,
    One = 4,
    Equal = 5,
    NotEqual = 6,
    Less = 7,
    LessEqual = 8,
    Greater = 9,
    GreaterEqual = 10,
    Multiple = 11,
    Power = 12,
    Size = 13,
    Min = 14,
    Max = 15,
    Sum = 16,
    Avg = 17,
    Label = 18,
}

impl LFunction {
    pub const fn name(self) -> &'static str {
        match self {
            LFunction::With => "WITH",
            LFunction::Attr => "ATTR",
            LFunction::All => "ALL",
            LFunction::Any => "ANY",
            LFunction::One => "ONE",
            LFunction::Equal => "EQUAL",
            LFunction::NotEqual => "NOT_EQUAL",
            LFunction::Less => "LESS",
            LFunction::LessEqual => "LESS_EQUAL",
            LFunction::Greater => "GREATER",
            LFunction::GreaterEqual => "GREATER_EQUAL",
            LFunction::Multiple => "MULTIPLE",
            LFunction::Power => "POWER",
            LFunction::Size => "SIZE",
            LFunction::Min => "MIN",
            LFunction::Max => "MAX",
            LFunction::Sum => "SUM",
            LFunction::Avg => "AVG",
            LFunction::Label => "LABEL",
        }
    }
}

impl From<Quantifier> for LFunction {
    fn from(quantifier: Quantifier) -> Self {
        match quantifier {
            Quantifier::All => LFunction::All,
            Quantifier::Any => LFunction::Any,
            Quantifier::One => LFunction::One,
        }
    }
}

impl From<Comparison> for LFunction {
    fn from(comparison: Comparison) -> Self {
        match comparison {
            Comparison::Equal => LFunction::Equal,
            Comparison::NotEqual => LFunction::NotEqual,
            Comparison::Less => LFunction::Less,
            Comparison::LessEqual => LFunction::LessEqual,
            Comparison::Greater => LFunction::Greater,
            Comparison::GreaterEqual => LFunction::GreaterEqual,
            Comparison::Multiple => LFunction::Multiple,
            Comparison::Power => LFunction::Power,
        }
    }
}

impl From<Aggregator> for LFunction {
    fn from(aggregator: Aggregator) -> Self {
        match aggregator {
            Aggregator::Min => LFunction::Min,
            Aggregator::Max => LFunction::Max,
            Aggregator::Sum => LFunction::Sum,
            Aggregator::Avg => LFunction::Avg,
        }
    }
}

impl fmt::Display for LFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument of a tree node: a subtree or a constant leaf.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LArg {
    Expr(LExpression),
    Value(ConstValue),
}

impl From<LExpression> for LArg {
    fn from(expr: LExpression) -> Self {
        LArg::Expr(expr)
    }
}

impl From<ConstValue> for LArg {
    fn from(value: ConstValue) -> Self {
        LArg::Value(value)
    }
}

impl fmt::Display for LArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LArg::Expr(expr) => write!(f, "{expr}"),
            LArg::Value(value) => write!(f, "{value}"),
        }
    }
}

/// A node of the constraint tree, displayed as `[TAG, arg, ...]`.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LExpression {
    pub function: LFunction,
    pub args: Vec<LArg>,
}

impl LExpression {
    pub fn new(function: LFunction, args: Vec<LArg>) -> Self {
        LExpression { function, args }
    }

    /// A node without arguments, such as `[SIZE]`.
    pub fn leaf(function: LFunction) -> Self {
        LExpression::new(function, Vec::new())
    }
}

impl fmt::Display for LExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.function)?;
        for arg in &self.args {
            write!(f, ", {arg}")?;
        }
        f.write_str("]")
    }
}
