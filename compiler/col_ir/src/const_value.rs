//! Compile-time constant data.
//!
//! Literals in the AST and the results of constant folding share this
//! representation. Numbers unify integers and floats; equality between an
//! `Int` and a `Float` is structural here, numeric comparisons live with the
//! builtin operators.

use std::fmt;
use std::hash::{Hash, Hasher};

/// A number literal or folded number.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value as a float, for mixed arithmetic and ordering.
    #[allow(
        clippy::cast_precision_loss,
        reason = "mixed int/float arithmetic is float arithmetic"
    )]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Integer value, if this number has no fractional part.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "range and fraction checked before the cast"
    )]
    pub fn as_int(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => Some(v as i64),
            Number::Float(_) => None,
        }
    }

    /// Numeric equality: `Int(2)` equals `Float(2.0)`.
    pub fn numeric_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Number {}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Number::Int(v) => {
                state.write_u8(0);
                v.hash(state);
            }
            Number::Float(v) => {
                state.write_u8(1);
                v.to_bits().hash(state);
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Constant data known at compile time.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstValue {
    None,
    Bool(bool),
    Number(Number),
    Str(String),
    /// A node kind, by name.
    Kind(String),
    List(Vec<ConstValue>),
}

impl ConstValue {
    #[inline]
    pub fn int(value: i64) -> Self {
        ConstValue::Number(Number::Int(value))
    }

    #[inline]
    pub fn float(value: f64) -> Self {
        ConstValue::Number(Number::Float(value))
    }

    #[inline]
    pub fn str(value: impl Into<String>) -> Self {
        ConstValue::Str(value.into())
    }

    #[inline]
    pub fn kind(name: impl Into<String>) -> Self {
        ConstValue::Kind(name.into())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            ConstValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ConstValue::List(_))
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::None => f.write_str("none"),
            ConstValue::Bool(v) => write!(f, "{v}"),
            ConstValue::Number(v) => write!(f, "{v}"),
            ConstValue::Str(v) => write!(f, "'{v}'"),
            ConstValue::Kind(v) => write!(f, "kind {v}"),
            ConstValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}
