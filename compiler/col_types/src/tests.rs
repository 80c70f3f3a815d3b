use col_ir::ConstValue;
use pretty_assertions::assert_eq;

use crate::{ComptimeValue, RuntimeValue, Tags, Type, Value};

fn sample_types() -> Vec<Type> {
    vec![
        Type::NONE,
        Type::NUMBER,
        Type::STRING,
        Type::BOOLEAN,
        Type::NODE,
        Type::KIND,
        Type::ANY,
        Type::ANY_LIST,
        Type::NUMBER_LIST,
        Type::scalar(Tags::NUMBER | Tags::STRING),
        Type::list(Tags::STRING | Tags::NONE),
    ]
}

#[test]
fn test_compatible_is_symmetric() {
    let types = sample_types();
    for a in &types {
        for b in &types {
            assert_eq!(a.compatible(*b), b.compatible(*a), "{a} vs {b}");
        }
    }
}

#[test]
fn test_compatible_is_reflexive_for_non_void() {
    for ty in sample_types() {
        assert!(ty.compatible(ty), "{ty}");
    }
    assert!(!Type::VOID.compatible(Type::VOID));
    assert!(!Type::VOID.compatible(Type::ANY));
}

#[test]
fn test_list_shape_must_match() {
    assert!(!Type::NUMBER.compatible(Type::NUMBER_LIST));
    assert!(Type::ANY_LIST.compatible(Type::NUMBER_LIST));
    assert!(!Type::ANY.compatible(Type::ANY_LIST));
}

#[test]
fn test_any_is_compatible_with_every_scalar() {
    for ty in [Type::NONE, Type::NUMBER, Type::NODE, Type::KIND] {
        assert!(Type::ANY.compatible(ty));
    }
}

#[test]
fn test_lup() {
    assert_eq!(Type::lup(Vec::<Type>::new()), Type::VOID);
    assert_eq!(
        Type::lup([Type::NUMBER, Type::STRING]),
        Type::scalar(Tags::NUMBER | Tags::STRING)
    );
    assert_eq!(Type::lup([Type::VOID, Type::NUMBER]), Type::NUMBER);
    assert_eq!(
        Type::lup([Type::NUMBER, Type::list(Tags::STRING)]),
        Type::list(Tags::NUMBER | Tags::STRING)
    );
}

#[test]
fn test_type_of_lists() {
    let mixed = ConstValue::List(vec![ConstValue::int(1), ConstValue::str("a")]);
    assert_eq!(Type::of(&mixed), Type::list(Tags::NUMBER | Tags::STRING));
    assert_eq!(Type::of(&ConstValue::List(vec![])), Type::ANY_LIST);
    assert_eq!(Type::of(&ConstValue::kind("socket")), Type::KIND);
}

#[test]
fn test_display() {
    assert_eq!(Type::NUMBER.to_string(), "<num>");
    assert_eq!(Type::ANY_LIST.to_string(), "<list any>");
    assert_eq!(Type::VOID.to_string(), "<void>");
    assert_eq!(
        Type::scalar(Tags::NONE | Tags::STRING).to_string(),
        "<none | str>"
    );
}

#[test]
fn test_comptime_value_type_follows_data() {
    let value = ComptimeValue::new(ConstValue::str("x"));
    assert_eq!(value.ty(), Type::STRING);
    assert_eq!(value.to_string(), "'x': <str>");
}

#[test]
fn test_value_to_runtime_keeps_type() {
    let value = Value::from(ComptimeValue::new(ConstValue::int(3)));
    assert_eq!(value.to_runtime(), RuntimeValue::new(Type::NUMBER));
    assert!(value.as_comptime().is_some());
    assert!(Value::from(RuntimeValue::ANY).as_comptime().is_none());
}
