use std::fmt;

use col_ir::ConstValue;

use crate::Tags;

/// A value type: a tag set and whether the value is a list of such tags.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Type {
    tags: Tags,
    is_list: bool,
}

impl Type {
    /// No value at all: falling off a function, or a bare `return`.
    pub const VOID: Type = Type::scalar(Tags::empty());
    /// Anything scalar, such as a node attribute.
    pub const ANY: Type = Type::scalar(Tags::all());
    pub const ANY_LIST: Type = Type::list(Tags::all());

    pub const NONE: Type = Type::scalar(Tags::NONE);
    pub const NUMBER: Type = Type::scalar(Tags::NUMBER);
    pub const STRING: Type = Type::scalar(Tags::STRING);
    pub const BOOLEAN: Type = Type::scalar(Tags::BOOLEAN);
    pub const NODE: Type = Type::scalar(Tags::NODE);
    pub const KIND: Type = Type::scalar(Tags::KIND);
    pub const NUMBER_LIST: Type = Type::list(Tags::NUMBER);

    #[inline]
    pub const fn new(tags: Tags, is_list: bool) -> Self {
        Type { tags, is_list }
    }

    #[inline]
    pub const fn scalar(tags: Tags) -> Self {
        Type::new(tags, false)
    }

    #[inline]
    pub const fn list(tags: Tags) -> Self {
        Type::new(tags, true)
    }

    #[inline]
    pub const fn tags(self) -> Tags {
        self.tags
    }

    #[inline]
    pub const fn is_list(self) -> bool {
        self.is_list
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self.tags.is_empty()
    }

    /// Same list shape and at least one common tag.
    ///
    /// Symmetric. Reflexive for every type but void, which is compatible
    /// with nothing.
    #[inline]
    pub fn compatible(self, other: Type) -> bool {
        self.is_list == other.is_list && self.tags.intersects(other.tags)
    }

    /// Least upper bound: union of the tags, a list if any input is a list.
    ///
    /// The bound of no types is void.
    pub fn lup(types: impl IntoIterator<Item = Type>) -> Type {
        types.into_iter().fold(Type::VOID, |acc, ty| {
            Type::new(acc.tags | ty.tags, acc.is_list || ty.is_list)
        })
    }

    /// Element type of a list type.
    #[inline]
    #[must_use]
    pub const fn as_scalar(self) -> Type {
        Type::scalar(self.tags)
    }

    /// List type with these tags as elements.
    #[inline]
    #[must_use]
    pub const fn as_list(self) -> Type {
        Type::list(self.tags)
    }

    /// Type of constant data.
    ///
    /// The element type of a list is the bound of its items; an empty list
    /// is a list of anything.
    pub fn of(data: &ConstValue) -> Type {
        match data {
            ConstValue::None => Type::NONE,
            ConstValue::Bool(_) => Type::BOOLEAN,
            ConstValue::Number(_) => Type::NUMBER,
            ConstValue::Str(_) => Type::STRING,
            ConstValue::Kind(_) => Type::KIND,
            ConstValue::List(items) if items.is_empty() => Type::ANY_LIST,
            ConstValue::List(items) => Type::lup(items.iter().map(Type::of)).as_list(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = if self.is_list { "list " } else { "" };
        if self.tags.is_empty() {
            write!(f, "<{list}void>")
        } else if self.tags.is_all() {
            write!(f, "<{list}any>")
        } else {
            write!(f, "<{list}{}>", self.tags)
        }
    }
}
