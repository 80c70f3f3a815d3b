//! Operators, comparisons, quantifiers and aggregators.
//!
//! All types here are `Copy` and map onto the builtin table by their
//! source-level symbol.

/// Binary operators of mapping expressions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    MultipleOf,
    PowerOf,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Returns the source-level symbol for this operator.
    ///
    /// Builtins are registered under these symbols.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::MultipleOf => "*=",
            Self::PowerOf => "**=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UnaryOp {
    /// Arithmetic negation: `-x`
    Neg,
    /// Logical not: `!x`
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Not => "!",
        }
    }
}

/// Comparison used by constraint and predicate statements.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Multiple,
    Power,
}

impl Comparison {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Multiple => "*=",
            Self::Power => "**=",
        }
    }
}

/// How the statements of a constraint or predicate block combine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantifier {
    #[default]
    All,
    Any,
    One,
}

/// Aggregation over the child nodes of one kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aggregator {
    Min,
    Max,
    Sum,
    Avg,
}

/// Binding qualifier of a definition statement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Qualifier {
    /// Mutable runtime binding.
    Var,
    /// Immutable binding.
    Final,
    /// Immutable binding whose value must be known at compile time.
    Const,
}

impl Qualifier {
    #[inline]
    pub const fn is_final(self) -> bool {
        !matches!(self, Qualifier::Var)
    }
}
