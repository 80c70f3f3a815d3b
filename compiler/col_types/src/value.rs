use std::fmt;

use col_ir::ConstValue;

use crate::Type;

/// Constant data together with its type.
///
/// The type is always computed from the data, so the two cannot disagree.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ComptimeValue {
    data: ConstValue,
    ty: Type,
}

impl ComptimeValue {
    pub fn new(data: ConstValue) -> Self {
        let ty = Type::of(&data);
        ComptimeValue { data, ty }
    }

    #[inline]
    pub fn data(&self) -> &ConstValue {
        &self.data
    }

    #[inline]
    pub fn into_data(self) -> ConstValue {
        self.data
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl From<ConstValue> for ComptimeValue {
    fn from(data: ConstValue) -> Self {
        ComptimeValue::new(data)
    }
}

/// A value only known when the mapping runs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct RuntimeValue {
    ty: Type,
}

impl RuntimeValue {
    /// A runtime value of unknown type, such as a node attribute.
    pub const ANY: RuntimeValue = RuntimeValue { ty: Type::ANY };

    #[inline]
    pub const fn new(ty: Type) -> Self {
        RuntimeValue { ty }
    }

    #[inline]
    pub const fn ty(self) -> Type {
        self.ty
    }
}

/// A typed value as seen by the compiler.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Value {
    Comptime(ComptimeValue),
    Runtime(RuntimeValue),
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Comptime(v) => v.ty(),
            Value::Runtime(v) => v.ty(),
        }
    }

    pub fn as_comptime(&self) -> Option<&ComptimeValue> {
        match self {
            Value::Comptime(v) => Some(v),
            Value::Runtime(_) => None,
        }
    }

    /// Forget the data, keeping the type.
    pub fn to_runtime(&self) -> RuntimeValue {
        RuntimeValue::new(self.ty())
    }
}

impl From<ComptimeValue> for Value {
    fn from(value: ComptimeValue) -> Self {
        Value::Comptime(value)
    }
}

impl From<RuntimeValue> for Value {
    fn from(value: RuntimeValue) -> Self {
        Value::Runtime(value)
    }
}

impl fmt::Display for ComptimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.data, self.ty)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Comptime(v) => write!(f, "{v}"),
            Value::Runtime(v) => write!(f, "{}", v.ty()),
        }
    }
}
