//! Lexical scopes of mappings, functions and constraints.
//!
//! Scopes form a parent chain behind shared, single-threaded handles.
//! A block opens a child scope that still sees its parents. A function call
//! opens a call scope without a parent, so an inlined body only sees its
//! own parameters and locals.
//!
//! Each binding is either constant data known at compile time or a runtime
//! value stored in a slot of the mapping's local storage.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use col_diagnostic::{Problem, Result};
use col_ir::ast::Ident;
use col_types::{ComptimeValue, RuntimeValue, Type, Value};

/// A single-threaded shared scope handle.
///
/// Wraps `Rc<RefCell<T>>` so that every scope allocation goes through
/// [`LocalScope::new`].
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Index of an emitter function frame: the mapping body itself or one
/// inlined call.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct FrameId(pub usize);

/// What a scope belongs to, for resolving `return` targets.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeContext {
    /// The body of a mapping.
    Root(FrameId),
    /// The body of an inlined function.
    Function(FrameId),
    /// The body of a `for` loop.
    Loop,
}

/// A named binding.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Binding {
    Comptime {
        value: ComptimeValue,
        is_final: bool,
    },
    Runtime {
        value: RuntimeValue,
        slot: u8,
        is_final: bool,
    },
}

impl Binding {
    pub fn value(&self) -> Value {
        match self {
            Binding::Comptime { value, .. } => Value::Comptime(value.clone()),
            Binding::Runtime { value, .. } => Value::Runtime(*value),
        }
    }

    pub fn ty(&self) -> Type {
        match self {
            Binding::Comptime { value, .. } => value.ty(),
            Binding::Runtime { value, .. } => value.ty(),
        }
    }

    pub fn is_final(&self) -> bool {
        match self {
            Binding::Comptime { is_final, .. } | Binding::Runtime { is_final, .. } => *is_final,
        }
    }

    pub fn slot(&self) -> Option<u8> {
        match self {
            Binding::Comptime { .. } => None,
            Binding::Runtime { slot, .. } => Some(*slot),
        }
    }
}

/// Outcome of an assignment.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Assignment {
    /// A constant binding took the new constant value.
    Replaced,
    /// The value must be stored into this slot.
    Store(u8),
}

/// Hands out storage slots, each exactly once per mapping.
#[derive(Clone, Debug, Default)]
pub struct SlotAllocator {
    next: u16,
}

impl SlotAllocator {
    pub fn new() -> Self {
        SlotAllocator::default()
    }

    pub fn alloc(&mut self) -> Result<u8> {
        let slot = u8::try_from(self.next)
            .map_err(|_| Problem::internal("storage slot index exceeds one byte"))?;
        self.next += 1;
        Ok(slot)
    }
}

/// A single scope.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<String, Binding>,
    parent: Option<LocalScope<Scope>>,
    context: Option<ScopeContext>,
}

impl Scope {
    /// A scope without a parent: a mapping root or a call scope.
    pub fn new_call_scope(context: Option<ScopeContext>) -> LocalScope<Scope> {
        LocalScope::new(Scope {
            bindings: FxHashMap::default(),
            parent: None,
            context,
        })
    }

    /// A scope nested in `parent`.
    pub fn new_child_scope(
        parent: &LocalScope<Scope>,
        context: Option<ScopeContext>,
    ) -> LocalScope<Scope> {
        LocalScope::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent.clone()),
            context,
        })
    }

    /// Bind constant data.
    pub fn define_comptime(
        &mut self,
        ident: &Ident,
        value: ComptimeValue,
        is_final: bool,
    ) -> Result<()> {
        self.define(ident, Binding::Comptime { value, is_final })
    }

    /// Bind a runtime value living in `slot`.
    pub fn define_runtime(
        &mut self,
        ident: &Ident,
        value: RuntimeValue,
        slot: u8,
        is_final: bool,
    ) -> Result<()> {
        self.define(
            ident,
            Binding::Runtime {
                value,
                slot,
                is_final,
            },
        )
    }

    /// Names may shadow bindings of parent scopes but not of this one.
    fn define(&mut self, ident: &Ident, binding: Binding) -> Result<()> {
        if binding.ty().is_void() {
            return Err(Problem::fatal_at("cannot define void value", ident.span));
        }
        if self.bindings.contains_key(&ident.name) {
            return Err(Problem::fatal_at(
                "identifier is already defined",
                ident.span,
            ));
        }
        self.bindings.insert(ident.name.clone(), binding);
        Ok(())
    }

    /// Innermost binding of `ident`.
    pub fn lookup(&self, ident: &Ident) -> Result<Binding> {
        if let Some(binding) = self.bindings.get(&ident.name) {
            return Ok(binding.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(ident);
        }
        Err(Problem::fatal_at("undefined identifier", ident.span))
    }

    /// Assign to the innermost binding of `ident`.
    ///
    /// The binding must be mutable and its type compatible with the value.
    /// A constant binding assigned a runtime value is widened into a fresh
    /// slot, which requires an allocator.
    pub fn assign(
        &mut self,
        ident: &Ident,
        value: Value,
        slots: Option<&mut SlotAllocator>,
    ) -> Result<Assignment> {
        if let Some(binding) = self.bindings.get_mut(&ident.name) {
            return assign_binding(binding, ident, value, slots);
        }
        if let Some(parent) = &self.parent {
            return parent.borrow_mut().assign(ident, value, slots);
        }
        Err(Problem::fatal_at("undefined identifier", ident.span))
    }

    /// Context of the nearest enclosing scope with one matching `filter`.
    pub fn find_context(&self, filter: impl Fn(ScopeContext) -> bool + Copy) -> Option<ScopeContext> {
        if let Some(context) = self.context.filter(|c| filter(*c)) {
            return Some(context);
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().find_context(filter))
    }

    /// Frame that a `return` in this scope leaves.
    pub fn enclosing_frame(&self) -> Option<FrameId> {
        match self.find_context(|c| !matches!(c, ScopeContext::Loop))? {
            ScopeContext::Root(frame) | ScopeContext::Function(frame) => Some(frame),
            ScopeContext::Loop => None,
        }
    }
}

fn assign_binding(
    binding: &mut Binding,
    ident: &Ident,
    value: Value,
    slots: Option<&mut SlotAllocator>,
) -> Result<Assignment> {
    if binding.is_final() {
        return Err(Problem::fatal_at(
            "cannot assign to final identifier",
            ident.span,
        ));
    }
    if !binding.ty().compatible(value.ty()) {
        return Err(Problem::fatal_at(
            format!("cannot assign {} to {} identifier", value.ty(), binding.ty()),
            ident.span,
        ));
    }
    if let Binding::Runtime { slot, .. } = binding {
        return Ok(Assignment::Store(*slot));
    }
    match value {
        Value::Comptime(value) => {
            *binding = Binding::Comptime {
                value,
                is_final: false,
            };
            Ok(Assignment::Replaced)
        }
        Value::Runtime(value) => {
            let Some(slots) = slots else {
                return Err(Problem::internal(
                    "runtime value assigned to a constant binding without storage",
                ));
            };
            let slot = slots.alloc()?;
            tracing::trace!(name = %ident.name, slot, "widening constant binding");
            *binding = Binding::Runtime {
                value,
                slot,
                is_final: false,
            };
            Ok(Assignment::Store(slot))
        }
    }
}

#[cfg(test)]
mod tests;
