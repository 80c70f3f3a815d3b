#![allow(clippy::unwrap_used, clippy::expect_used)]

use col_ir::ast::build::ident;
use col_ir::ConstValue;
use col_types::{ComptimeValue, RuntimeValue, Type, Value};
use pretty_assertions::assert_eq;

use super::*;

fn constant(v: i64) -> ComptimeValue {
    ComptimeValue::new(ConstValue::int(v))
}

#[test]
fn test_child_scope_sees_parent() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_comptime(&ident("x"), constant(1), true)
        .unwrap();
    let child = Scope::new_child_scope(&root, None);
    let binding = child.borrow().lookup(&ident("x")).unwrap();
    assert_eq!(binding.value(), Value::Comptime(constant(1)));
}

#[test]
fn test_call_scope_hides_caller() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_comptime(&ident("x"), constant(1), true)
        .unwrap();
    let call = Scope::new_call_scope(None);
    let problem = call.borrow().lookup(&ident("x")).unwrap_err();
    assert_eq!(problem.message(), "undefined identifier");
}

#[test]
fn test_redefinition_in_same_scope() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::ANY, 0, false)
        .unwrap();
    let problem = root
        .borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::ANY, 1, false)
        .unwrap_err();
    assert_eq!(problem.message(), "identifier is already defined");
}

#[test]
fn test_shadowing_in_child_scope() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::ANY, 0, false)
        .unwrap();
    let child = Scope::new_child_scope(&root, None);
    child
        .borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::new(Type::NUMBER), 1, false)
        .unwrap();
    assert_eq!(child.borrow().lookup(&ident("x")).unwrap().slot(), Some(1));
    assert_eq!(root.borrow().lookup(&ident("x")).unwrap().slot(), Some(0));
}

#[test]
fn test_void_definition_is_fatal() {
    let root = Scope::new_call_scope(None);
    let problem = root
        .borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::new(Type::VOID), 0, false)
        .unwrap_err();
    assert_eq!(problem.message(), "cannot define void value");
}

#[test]
fn test_assign_runtime_through_parent() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::new(Type::NUMBER), 3, false)
        .unwrap();
    let child = Scope::new_child_scope(&root, None);
    let outcome = child
        .borrow_mut()
        .assign(&ident("x"), Value::Runtime(RuntimeValue::ANY), None)
        .unwrap();
    assert_eq!(outcome, Assignment::Store(3));
}

#[test]
fn test_assign_final_is_fatal() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_comptime(&ident("x"), constant(1), true)
        .unwrap();
    let problem = root
        .borrow_mut()
        .assign(&ident("x"), Value::Comptime(constant(2)), None)
        .unwrap_err();
    assert_eq!(problem.message(), "cannot assign to final identifier");
}

#[test]
fn test_assign_incompatible_type_is_fatal() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_runtime(&ident("x"), RuntimeValue::new(Type::NUMBER), 0, false)
        .unwrap();
    let problem = root
        .borrow_mut()
        .assign(
            &ident("x"),
            Value::Comptime(ComptimeValue::new(ConstValue::str("a"))),
            None,
        )
        .unwrap_err();
    assert_eq!(problem.message(), "cannot assign <str> to <num> identifier");
}

#[test]
fn test_assign_replaces_constant() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_comptime(&ident("x"), constant(1), false)
        .unwrap();
    let outcome = root
        .borrow_mut()
        .assign(&ident("x"), Value::Comptime(constant(2)), None)
        .unwrap();
    assert_eq!(outcome, Assignment::Replaced);
    assert_eq!(
        root.borrow().lookup(&ident("x")).unwrap().value(),
        Value::Comptime(constant(2))
    );
}

#[test]
fn test_assign_widens_constant_to_slot() {
    let root = Scope::new_call_scope(None);
    root.borrow_mut()
        .define_comptime(&ident("x"), constant(1), false)
        .unwrap();
    let mut slots = SlotAllocator::new();
    slots.alloc().unwrap();
    let outcome = root
        .borrow_mut()
        .assign(
            &ident("x"),
            Value::Runtime(RuntimeValue::new(Type::NUMBER)),
            Some(&mut slots),
        )
        .unwrap();
    assert_eq!(outcome, Assignment::Store(1));
    assert_eq!(root.borrow().lookup(&ident("x")).unwrap().slot(), Some(1));
}

#[test]
fn test_slot_allocator_limit() {
    let mut slots = SlotAllocator::new();
    for expected in 0..=255u8 {
        assert_eq!(slots.alloc().unwrap(), expected);
    }
    assert!(slots.alloc().unwrap_err().is_internal());
}

#[test]
fn test_enclosing_frame_skips_loops() {
    let root = Scope::new_call_scope(Some(ScopeContext::Root(FrameId(0))));
    let body = Scope::new_child_scope(&root, Some(ScopeContext::Loop));
    let inner = Scope::new_child_scope(&body, None);
    assert_eq!(inner.borrow().enclosing_frame(), Some(FrameId(0)));

    let call = Scope::new_call_scope(Some(ScopeContext::Function(FrameId(2))));
    assert_eq!(call.borrow().enclosing_frame(), Some(FrameId(2)));
    assert_eq!(Scope::new_call_scope(None).borrow().enclosing_frame(), None);
}
