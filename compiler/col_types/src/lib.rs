//! Col Types - the type lattice of the constraint compiler.
//!
//! A type is a set of primitive tags plus a list flag. There is no
//! inference in the usual sense: each expression's type is the union of
//! what it may produce, and two types are compatible when they share list
//! shape and at least one tag.
//!
//! Values pair a type with, when known, the constant data itself:
//! [`Value::Comptime`] carries data, [`Value::Runtime`] only a type.

mod tags;
mod ty;
mod value;

pub use tags::Tags;
pub use ty::Type;
pub use value::{ComptimeValue, RuntimeValue, Value};

#[cfg(test)]
mod tests;
