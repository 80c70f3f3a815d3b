//! Construction helpers.
//!
//! Short constructors for AST nodes with dummy spans. Front ends use them and
//! re-stamp spans with `at`; tests use them to write programs compactly:
//!
//! ```text
//! file(vec![mapping("main", &[], vec![
//!     define(Qualifier::Var, "x", num(1)),
//! ])])
//! ```

use crate::{ConstValue, SourceId, Span};

use super::{
    Aggregator, BinaryOp, Block, Call, Comparison, ConstraintBlock, ConstraintMain,
    ConstraintStmt, ConstraintStmtKind, ConstraintType, Definition, Expr, ExprKind, File,
    FunctionDef, Ident, MappingDef, PredicateBlock, PredicateDef, PredicateStmt,
    PredicateStmtKind, Qualifier, Quantifier, Stmt, StmtKind, UnaryOp,
};

pub fn ident(name: &str) -> Ident {
    Ident::new(name, Span::DUMMY)
}

fn idents(names: &[&str]) -> Vec<Ident> {
    names.iter().map(|name| ident(name)).collect()
}

fn expr(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::DUMMY)
}

// Expressions

pub fn literal(value: ConstValue) -> Expr {
    expr(ExprKind::Literal(value))
}

pub fn num(value: i64) -> Expr {
    literal(ConstValue::int(value))
}

pub fn float(value: f64) -> Expr {
    literal(ConstValue::float(value))
}

pub fn string(value: &str) -> Expr {
    literal(ConstValue::str(value))
}

pub fn boolean(value: bool) -> Expr {
    literal(ConstValue::Bool(value))
}

pub fn none() -> Expr {
    literal(ConstValue::None)
}

pub fn kind(name: &str) -> Expr {
    literal(ConstValue::kind(name))
}

pub fn reference(name: &str) -> Expr {
    expr(ExprKind::Ref(ident(name)))
}

pub fn attr(target: &str, attribute: &str) -> Expr {
    expr(ExprKind::Attr {
        target: ident(target),
        attribute: ident(attribute),
    })
}

pub fn unary(op: UnaryOp, operand: Expr) -> Expr {
    expr(ExprKind::Unary {
        op,
        operand: Box::new(operand),
    })
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    expr(ExprKind::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn call_of(name: &str, args: Vec<Expr>) -> Call {
    Call {
        callee: ident(name),
        args,
        span: Span::DUMMY,
    }
}

pub fn call(name: &str, args: Vec<Expr>) -> Expr {
    expr(ExprKind::Call(call_of(name, args)))
}

pub fn list(items: Vec<Expr>) -> Expr {
    expr(ExprKind::List(items))
}

// Statements

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::new(kind, Span::DUMMY)
}

pub fn block(stmts: Vec<Stmt>) -> Block {
    Block {
        stmts,
        span: Span::DUMMY,
    }
}

pub fn block_stmt(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Block(block(stmts)))
}

pub fn define(qualifier: Qualifier, name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Define {
        qualifier,
        ident: ident(name),
        value,
    })
}

pub fn assign(name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Assign {
        ident: ident(name),
        value,
    })
}

pub fn ret(value: Option<Expr>) -> Stmt {
    stmt(StmtKind::Return(value))
}

pub fn if_else(cond: Expr, then_stmts: Vec<Stmt>, else_stmts: Option<Vec<Stmt>>) -> Stmt {
    stmt(StmtKind::If {
        cond,
        then_block: block(then_stmts),
        else_block: else_stmts.map(block),
    })
}

pub fn for_in(binding: &str, iterable: Expr, body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::For {
        binding: ident(binding),
        iterable,
        body: block(body),
    })
}

pub fn fail(message: Expr) -> Stmt {
    stmt(StmtKind::Fail(message))
}

pub fn expr_stmt(value: Expr) -> Stmt {
    stmt(StmtKind::Expr(value))
}

// Constraints and predicates

pub fn constraint_block(quantifier: Quantifier, stmts: Vec<ConstraintStmt>) -> ConstraintBlock {
    ConstraintBlock {
        quantifier,
        stmts,
        span: Span::DUMMY,
    }
}

fn constraint_stmt(kind: ConstraintStmtKind) -> ConstraintStmt {
    ConstraintStmt {
        kind,
        span: Span::DUMMY,
    }
}

pub fn c_block(quantifier: Quantifier, stmts: Vec<ConstraintStmt>) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::Block(constraint_block(quantifier, stmts)))
}

pub fn c_attr(attribute: &str, comparison: Comparison, value: Expr) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::Attr {
        attribute: ident(attribute),
        comparison,
        value,
    })
}

pub fn c_size(comparison: Comparison, value: Expr) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::Size { comparison, value })
}

pub fn c_aggregate(
    aggregator: Aggregator,
    kind: &str,
    comparison: Comparison,
    value: Expr,
) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::Aggregate {
        aggregator,
        kind: ident(kind),
        comparison,
        value,
    })
}

pub fn c_with(
    label: Option<&str>,
    predicate: Call,
    kind: &str,
    block: Option<ConstraintBlock>,
) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::With {
        label: label.map(ident),
        predicate,
        kind: ident(kind),
        block,
    })
}

pub fn c_call(label: Option<&str>, predicate: Call, constraint: Call) -> ConstraintStmt {
    constraint_stmt(ConstraintStmtKind::Call {
        label: label.map(ident),
        predicate,
        constraint,
    })
}

pub fn predicate_block(quantifier: Quantifier, stmts: Vec<PredicateStmt>) -> PredicateBlock {
    PredicateBlock {
        quantifier,
        stmts,
        span: Span::DUMMY,
    }
}

fn predicate_stmt(kind: PredicateStmtKind) -> PredicateStmt {
    PredicateStmt {
        kind,
        span: Span::DUMMY,
    }
}

pub fn p_block(quantifier: Quantifier, stmts: Vec<PredicateStmt>) -> PredicateStmt {
    predicate_stmt(PredicateStmtKind::Block(predicate_block(quantifier, stmts)))
}

pub fn p_size(comparison: Comparison, value: Expr) -> PredicateStmt {
    predicate_stmt(PredicateStmtKind::Size { comparison, value })
}

pub fn p_aggregate(
    aggregator: Aggregator,
    kind: &str,
    comparison: Comparison,
    value: Expr,
) -> PredicateStmt {
    predicate_stmt(PredicateStmtKind::Aggregate {
        aggregator,
        kind: ident(kind),
        comparison,
        value,
    })
}

// Definitions

pub fn main_constraint(block: ConstraintBlock) -> Definition {
    Definition::ConstraintMain(ConstraintMain {
        ident: ident("main"),
        block,
    })
}

pub fn constraint_type(
    name: &str,
    kind: &str,
    params: &[&str],
    block: ConstraintBlock,
) -> Definition {
    Definition::ConstraintType(ConstraintType {
        ident: ident(name),
        kind: ident(kind),
        params: idents(params),
        block,
    })
}

pub fn predicate(name: &str, params: &[&str], block: PredicateBlock) -> Definition {
    Definition::Predicate(PredicateDef {
        ident: ident(name),
        params: idents(params),
        block,
    })
}

pub fn function(name: &str, params: &[&str], body: Vec<Stmt>) -> Definition {
    Definition::Function(FunctionDef {
        ident: ident(name),
        params: idents(params),
        body: block(body),
    })
}

pub fn mapping(name: &str, labels: &[&str], body: Vec<Stmt>) -> Definition {
    Definition::Mapping(MappingDef {
        ident: ident(name),
        labels: idents(labels),
        body: block(body),
    })
}

/// A root file with the given definitions.
pub fn file(definitions: Vec<Definition>) -> File {
    File::new(SourceId::ROOT, definitions)
}
