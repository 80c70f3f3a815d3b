#![allow(clippy::unwrap_used, clippy::expect_used)]

use col_ir::ast::build::*;
use col_ir::ast::{BinaryOp, Definition, Qualifier, Stmt};
use col_ir::{SourceId, Span};
use pretty_assertions::assert_eq;

use super::*;
use crate::builtins::Builtins;
use crate::config::Config;
use crate::opcode::Opcode as Op;

type Ops = Vec<(Opcode, u8)>;

fn decode(code: &[u8]) -> Ops {
    code.chunks(2)
        .map(|unit| (Opcode::from_byte(unit[0]).expect("known opcode"), unit[1]))
        .collect()
}

fn compile_file_mappings(definitions: Vec<Definition>) -> Result<(Vec<Mapping>, Vec<Constant>)> {
    let file = file(definitions);
    let config = Config::default();
    let builtins = Builtins::standard();
    let mut ctx = Context::new(&file, &config, &builtins);
    let mappings = compile_mappings(&mut ctx)?;
    Ok((mappings, ctx.into_const_pool()))
}

fn compile_with(mut definitions: Vec<Definition>, body: Vec<Stmt>) -> Result<(Ops, Vec<Constant>)> {
    definitions.push(mapping("main", &[], body));
    let (mappings, pool) = compile_file_mappings(definitions)?;
    Ok((decode(&mappings[0].code), pool))
}

fn ops(body: Vec<Stmt>) -> Ops {
    compile_with(vec![], body).unwrap().0
}

fn problem(body: Vec<Stmt>) -> Problem {
    compile_with(vec![], body).unwrap_err()
}

fn width() -> Expr {
    attr("root", "width")
}

#[test]
fn test_folded_expression_is_loaded_as_constant() {
    let expr = binary(BinaryOp::Add, num(1), binary(BinaryOp::Mul, num(2), num(3)));
    assert_eq!(
        ops(vec![define(Qualifier::Var, "r", expr)]),
        vec![(Op::Int, 7), (Op::Store, 1)]
    );
}

#[test]
fn test_folded_value_matches_evaluator() {
    let exprs = [
        binary(BinaryOp::Div, num(7), num(2)),
        binary(BinaryOp::Sub, num(1), num(5)),
        binary(BinaryOp::Add, float(0.25), float(1.0)),
        binary(BinaryOp::MultipleOf, num(12), num(4)),
    ];
    for expr in exprs {
        let file = file(vec![]);
        let config = Config::default();
        let builtins = Builtins::standard();
        let ctx = Context::new(&file, &config, &builtins);
        let scope = Scope::new_call_scope(None);
        let folded = evaluate(&ctx, &scope, &expr, &[]).unwrap().unwrap();

        let (code, pool) = compile_with(vec![], vec![define(Qualifier::Var, "r", expr)]).unwrap();
        let loaded = match (code[0], folded.data()) {
            ((Op::Int, arg), ConstValue::Number(number)) => number.numeric_eq(Number::Int(i64::from(arg))),
            ((Op::Float, arg), ConstValue::Number(number)) => {
                number.numeric_eq(Number::Float(fixpoint::decode(arg)))
            }
            ((Op::Const, arg), ConstValue::Number(number)) => {
                pool[usize::from(arg)] == Constant::Number(*number)
            }
            ((Op::True, _), data) => data.as_bool() == Some(true),
            ((Op::False, _), data) => data.as_bool() == Some(false),
            (unit, data) => panic!("{unit:?} does not load {data}"),
        };
        assert!(loaded, "{folded} loaded as {:?}", code[0]);
    }
}

#[test]
fn test_constant_load_encodings() {
    let (code, pool) = compile_with(
        vec![],
        vec![
            define(Qualifier::Var, "a", num(1000)),
            define(Qualifier::Var, "b", float(0.5)),
            define(Qualifier::Var, "c", float(0.1)),
            define(Qualifier::Var, "d", none()),
            define(Qualifier::Var, "e", boolean(true)),
            define(Qualifier::Var, "f", kind("core")),
            define(Qualifier::Var, "g", num(-1)),
        ],
    )
    .unwrap();
    assert_eq!(
        code,
        vec![
            (Op::Const, 0),
            (Op::Store, 1),
            (Op::Float, 4),
            (Op::Store, 2),
            (Op::Const, 1),
            (Op::Store, 3),
            (Op::None, 0),
            (Op::Store, 4),
            (Op::True, 0),
            (Op::Store, 5),
            (Op::Kind, 2),
            (Op::Store, 6),
            (Op::Const, 3),
            (Op::Store, 7),
        ]
    );
    assert_eq!(
        pool,
        vec![
            Constant::Number(Number::Int(1000)),
            Constant::Number(Number::Float(0.1)),
            Constant::Str("core".to_string()),
            Constant::Number(Number::Int(-1)),
        ]
    );
}

#[test]
fn test_equal_strings_are_interned_once() {
    let (code, pool) = compile_with(
        vec![],
        vec![
            define(Qualifier::Var, "a", string("x")),
            define(Qualifier::Var, "b", string("x")),
        ],
    )
    .unwrap();
    assert_eq!(code, vec![(Op::Const, 0), (Op::Store, 1), (Op::Const, 0), (Op::Store, 2)]);
    assert_eq!(pool.len(), 1);
}

#[test]
fn test_attribute_read() {
    let (code, pool) = compile_with(
        vec![],
        vec![define(
            Qualifier::Var,
            "w",
            binary(BinaryOp::Add, width(), num(1)),
        )],
    )
    .unwrap();
    assert_eq!(
        code,
        vec![(Op::Load, 0), (Op::Attr, 0), (Op::Int, 1), (Op::Add, 0), (Op::Store, 1)]
    );
    assert_eq!(pool, vec![Constant::Str("width".to_string())]);
}

#[test]
fn test_if_else() {
    let code = ops(vec![if_else(
        binary(BinaryOp::Gt, width(), num(2)),
        vec![define(Qualifier::Var, "a", num(1))],
        Some(vec![define(Qualifier::Var, "b", num(2))]),
    )]);
    assert_eq!(
        code,
        vec![
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Int, 2),
            (Op::Gre, 0),
            (Op::JmpFf, 3),
            (Op::Int, 1),
            (Op::Store, 1),
            (Op::JmpF, 2),
            (Op::Int, 2),
            (Op::Store, 2),
        ]
    );
}

#[test]
fn test_empty_branches_collapse() {
    let code = ops(vec![if_else(
        binary(BinaryOp::Eq, width(), num(1)),
        vec![],
        Some(vec![]),
    )]);
    assert_eq!(
        code,
        vec![(Op::Load, 0), (Op::Attr, 0), (Op::Int, 1), (Op::Eql, 0), (Op::Drop, 0)]
    );
}

#[test]
fn test_for_loop() {
    let code = ops(vec![for_in(
        "n",
        call("range", vec![num(0), num(3)]),
        vec![define(Qualifier::Var, "x", reference("n"))],
    )]);
    assert_eq!(
        code,
        vec![
            (Op::Int, 0),
            (Op::Int, 3),
            (Op::Range, 0),
            (Op::Iter, 0),
            (Op::Store, 1),
            (Op::HasNext, 1),
            (Op::JmpFf, 5),
            (Op::Next, 1),
            (Op::Store, 2),
            (Op::Load, 2),
            (Op::Store, 3),
            (Op::JmpB, 7),
        ]
    );
}

#[test]
fn test_for_requires_list() {
    let problem = problem(vec![for_in("n", num(3), vec![])]);
    assert_eq!(
        problem.message(),
        "argument <num> not compatible with <list any>"
    );
}

#[test]
fn test_inline_with_runtime_argument() {
    let double = function(
        "double",
        &["x"],
        vec![ret(Some(binary(BinaryOp::Mul, reference("x"), num(2))))],
    );
    let (code, _) = compile_with(
        vec![double],
        vec![define(Qualifier::Var, "r", call("double", vec![width()]))],
    )
    .unwrap();
    assert_eq!(
        code,
        vec![
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Store, 1),
            (Op::Load, 1),
            (Op::Int, 2),
            (Op::Mul, 0),
            (Op::Store, 2),
        ]
    );
}

#[test]
fn test_inline_with_several_returns() {
    let pick = function(
        "pick",
        &["c"],
        vec![
            if_else(reference("c"), vec![ret(Some(num(1)))], None),
            ret(Some(num(2))),
        ],
    );
    let (code, _) = compile_with(
        vec![pick],
        vec![define(
            Qualifier::Var,
            "r",
            call("pick", vec![attr("root", "flag")]),
        )],
    )
    .unwrap();
    assert_eq!(
        code,
        vec![
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Store, 1),
            (Op::Load, 1),
            (Op::JmpFf, 2),
            (Op::Int, 1),
            (Op::JmpF, 1),
            (Op::Int, 2),
            (Op::Store, 2),
        ]
    );
}

#[test]
fn test_inline_with_constant_argument_folds() {
    let square = function(
        "square",
        &["x"],
        vec![ret(Some(binary(BinaryOp::Mul, reference("x"), reference("x"))))],
    );
    let (code, _) = compile_with(
        vec![square],
        vec![define(Qualifier::Var, "r", call("square", vec![num(12)]))],
    )
    .unwrap();
    assert_eq!(code, vec![(Op::Int, 144), (Op::Store, 1)]);
}

#[test]
fn test_void_call_cannot_be_bound() {
    let nothing = function("nothing", &[], vec![ret(None)]);
    let problem = compile_with(
        vec![nothing],
        vec![define(Qualifier::Var, "v", call("nothing", vec![]))],
    )
    .unwrap_err();
    assert_eq!(problem.message(), "cannot define void value");
}

#[test]
fn test_recursive_call_is_fatal() {
    let f = function("f", &["n"], vec![ret(Some(call("f", vec![reference("n")])))]);
    let problem = compile_with(
        vec![f],
        vec![define(Qualifier::Var, "r", call("f", vec![width()]))],
    )
    .unwrap_err();
    assert!(problem.is_fatal());
    assert_eq!(problem.message(), "recursive function call");
}

#[test]
fn test_inlined_call_checks_argument_count() {
    let file = file(vec![function(
        "pair",
        &["a", "b"],
        vec![ret(Some(reference("a")))],
    )]);
    let config = Config::default();
    let builtins = Builtins::standard();
    let mut ctx = Context::new(&file, &config, &builtins);
    let pair = file.function("pair").unwrap();
    let mut compiler = MappingCompiler::new(&mut ctx).unwrap();

    let problem = compiler
        .inline(&call_of("pair", vec![width()]), pair)
        .unwrap_err();
    assert_eq!(problem.message(), "expected 2 arguments");
    let problem = compiler
        .inline(&call_of("pair", vec![width(), num(1), num(2)]), pair)
        .unwrap_err();
    assert_eq!(problem.message(), "expected 2 arguments");

    // the evaluator sees the call first
    let problem = compile_with(
        vec![function("pair", &["a", "b"], vec![ret(Some(reference("a")))])],
        vec![define(Qualifier::Var, "r", call("pair", vec![width()]))],
    )
    .unwrap_err();
    assert_eq!(problem.message(), "not enough arguments");
}

#[test]
fn test_undefined_identifier_points_at_reference() {
    let at = Span::new(SourceId::ROOT, 19, 20);
    let x = Expr::new(ExprKind::Ref(Ident::new("x", at)), at);
    let problem = problem(vec![assign("r", x)]);
    assert_eq!(problem.message(), "undefined identifier");
    assert_eq!(problem.spans(), &[at]);
}

#[test]
fn test_redefinition_is_fatal() {
    let problem = problem(vec![
        define(Qualifier::Var, "a", num(1)),
        define(Qualifier::Var, "a", num(2)),
    ]);
    assert_eq!(problem.message(), "identifier is already defined");
}

#[test]
fn test_assignment_rules() {
    let code = ops(vec![
        define(Qualifier::Var, "a", num(1)),
        assign("a", width()),
    ]);
    assert_eq!(
        code,
        vec![(Op::Int, 1), (Op::Store, 1), (Op::Load, 0), (Op::Attr, 0), (Op::Store, 1)]
    );

    let problem = problem(vec![
        define(Qualifier::Final, "a", width()),
        assign("a", num(1)),
    ]);
    assert_eq!(problem.message(), "cannot assign to final identifier");

    let problem = self::problem(vec![
        define(Qualifier::Var, "a", num(1)),
        assign("a", string("one")),
    ]);
    assert_eq!(problem.message(), "cannot assign <str> to <num> identifier");
}

#[test]
fn test_const_requires_compile_time_value() {
    let code = ops(vec![
        define(Qualifier::Const, "k", num(3)),
        define(Qualifier::Var, "r", reference("k")),
    ]);
    assert_eq!(code, vec![(Op::Int, 3), (Op::Store, 1)]);

    let problem = problem(vec![define(Qualifier::Const, "k", width())]);
    assert_eq!(problem.message(), "cannot assign runtime value");
}

#[test]
fn test_slots_are_never_reused() {
    let code = ops(vec![
        block_stmt(vec![define(Qualifier::Var, "a", width())]),
        block_stmt(vec![define(Qualifier::Var, "a", width())]),
        define(Qualifier::Var, "b", num(1)),
    ]);
    let stores: Vec<u8> = code
        .iter()
        .filter(|(op, _)| *op == Op::Store)
        .map(|(_, slot)| *slot)
        .collect();
    assert_eq!(stores, vec![1, 2, 3]);
}

#[test]
fn test_expression_statements() {
    let code = ops(vec![
        expr_stmt(binary(BinaryOp::Add, num(1), num(1))),
        expr_stmt(width()),
    ]);
    assert_eq!(code, vec![(Op::Load, 0), (Op::Attr, 0), (Op::Drop, 0)]);
}

#[test]
fn test_fail_statement() {
    let (code, pool) = compile_with(
        vec![],
        vec![if_else(
            binary(BinaryOp::Gt, width(), num(8)),
            vec![fail(string("too wide"))],
            None,
        )],
    )
    .unwrap();
    assert_eq!(
        code,
        vec![
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Int, 8),
            (Op::Gre, 0),
            (Op::JmpFf, 2),
            (Op::Const, 1),
            (Op::Fail, 0),
        ]
    );
    assert_eq!(pool[1], Constant::Str("too wide".to_string()));
}

#[test]
fn test_return_from_mapping() {
    let code = ops(vec![
        if_else(
            binary(BinaryOp::Eq, width(), num(0)),
            vec![ret(None)],
            None,
        ),
        define(Qualifier::Var, "a", num(1)),
    ]);
    assert_eq!(
        code,
        vec![
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Int, 0),
            (Op::Eql, 0),
            (Op::JmpFf, 2),
            (Op::None, 0),
            (Op::JmpF, 2),
            (Op::Int, 1),
            (Op::Store, 1),
        ]
    );
}

#[test]
fn test_list_literals() {
    let code = ops(vec![
        define(Qualifier::Var, "a", list(vec![num(1), num(2)])),
        define(Qualifier::Var, "b", list(vec![width(), num(2)])),
    ]);
    assert_eq!(
        code,
        vec![
            (Op::List, 0),
            (Op::Int, 1),
            (Op::Append, 0),
            (Op::Int, 2),
            (Op::Append, 0),
            (Op::Store, 1),
            (Op::List, 0),
            (Op::Load, 0),
            (Op::Attr, 0),
            (Op::Append, 0),
            (Op::Int, 2),
            (Op::Append, 0),
            (Op::Store, 2),
        ]
    );
}

#[test]
fn test_jump_offsets_fit_one_byte() {
    let body = vec![
        for_in(
            "n",
            call("range", vec![num(0), width()]),
            vec![if_else(
                binary(BinaryOp::Gt, reference("n"), num(2)),
                vec![expr_stmt(reference("n"))],
                Some(vec![]),
            )],
        ),
        if_else(boolean(true), vec![], None),
    ];
    for (op, arg) in ops(body) {
        if op.is_jump() {
            assert!((1..=255).contains(&arg), "{op} {arg}");
        }
    }
}

#[test]
fn test_mapping_requirements() {
    let problem = compile_file_mappings(vec![]).unwrap_err();
    assert_eq!(problem.message(), "no mapping");

    let problem = compile_file_mappings(vec![mapping("big", &["large"], vec![])]).unwrap_err();
    assert_eq!(problem.message(), "no unconditional mapping");
}

#[test]
fn test_mapping_labels_resolve() {
    let file = file(vec![
        mapping("main", &[], vec![]),
        mapping("big", &["large"], vec![]),
    ]);
    let config = Config::default();
    let builtins = Builtins::standard();
    let mut ctx = Context::new(&file, &config, &builtins);

    let problem = compile_mappings(&mut ctx).unwrap_err();
    assert_eq!(problem.message(), "undefined identifier");

    ctx.intern_label("small");
    ctx.intern_label("large");
    let mappings = compile_mappings(&mut ctx).unwrap();
    assert_eq!(mappings[0].labels, Vec::<usize>::new());
    assert_eq!(mappings[1].labels, vec![1]);
    assert!(mappings[1].code.is_empty());
}
