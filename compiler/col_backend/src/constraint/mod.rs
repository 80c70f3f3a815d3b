//! Constraint lowering.
//!
//! The main constraint becomes a side-effect-free tree for the external
//! constraint engine. Predicates and constraint types are expanded in
//! place, each in a fresh scope holding its parameters. Every value in a
//! constraint must be known at compile time.

mod lexpr;

pub use lexpr::{LArg, LExpression, LFunction};

use col_diagnostic::{Problem, Result};
use col_ir::ast::{
    Aggregator, Call, Comparison, ConstraintBlock, ConstraintStmt, ConstraintStmtKind, Expr,
    Ident, PredicateBlock, PredicateStmt, PredicateStmtKind, Quantifier,
};
use col_ir::ConstValue;
use col_stack::ensure_sufficient_stack;
use tracing::trace;

use crate::checks::check_arguments;
use crate::comptime::evaluate;
use crate::config::Optimization;
use crate::context::Context;
use crate::scope::{LocalScope, Scope};

/// Lower `con main` of the file being compiled. Interns activation labels
/// into the context as a side effect.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile_constraint(ctx: &mut Context<'_>) -> Result<LExpression> {
    let main = ctx.constraint_main()?;
    let mut compiler = ConstraintCompiler {
        ctx,
        scope: Scope::new_call_scope(None),
        expanding: Vec::new(),
    };
    compiler.block(&main.block)
}

struct ConstraintCompiler<'c, 'a> {
    ctx: &'c mut Context<'a>,
    scope: LocalScope<Scope>,
    /// Constraint types being expanded, innermost last.
    expanding: Vec<&'a str>,
}

impl<'a> ConstraintCompiler<'_, 'a> {
    fn with_scope<T>(
        &mut self,
        scope: LocalScope<Scope>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }

    /// Comparison operand or call argument.
    fn value(&self, expr: &Expr) -> Result<ConstValue> {
        match evaluate(self.ctx, &self.scope, expr, &[])? {
            Some(value) => Ok(value.into_data()),
            None => Err(Problem::fatal_at(
                "expression is not known at compile time",
                expr.span,
            )),
        }
    }

    /// Bind the arguments of `call` to `params` in a new call scope.
    fn scope_from_call(&self, call: &Call, params: &[Ident]) -> Result<LocalScope<Scope>> {
        check_arguments(params, call.args.len(), call.callee.span)?;
        let scope = Scope::new_call_scope(None);
        for (param, arg) in params.iter().zip(&call.args) {
            let value = self.value(arg)?;
            scope.borrow_mut().define_comptime(param, value.into(), true)?;
        }
        Ok(scope)
    }

    fn quantified(&self, quantifier: Quantifier, mut stmts: Vec<LExpression>) -> LExpression {
        if stmts.len() == 1 && self.ctx.config().is_enabled(Optimization::RedundantQuantifier) {
            if let Some(only) = stmts.pop() {
                trace!(?quantifier, "collapsing single-statement block");
                return only;
            }
        }
        LExpression::new(
            quantifier.into(),
            stmts.into_iter().map(LArg::from).collect(),
        )
    }

    fn comparison(
        &self,
        comparison: Comparison,
        subject: LExpression,
        value: &Expr,
    ) -> Result<LExpression> {
        Ok(LExpression::new(
            comparison.into(),
            vec![subject.into(), self.value(value)?.into()],
        ))
    }

    // Constraints

    fn block(&mut self, block: &ConstraintBlock) -> Result<LExpression> {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(self.stmt(stmt)?);
        }
        Ok(self.quantified(block.quantifier, stmts))
    }

    fn stmt(&mut self, stmt: &ConstraintStmt) -> Result<LExpression> {
        ensure_sufficient_stack(|| self.stmt_inner(stmt))
    }

    fn stmt_inner(&mut self, stmt: &ConstraintStmt) -> Result<LExpression> {
        match &stmt.kind {
            ConstraintStmtKind::Block(block) => self.block(block),

            ConstraintStmtKind::Attr {
                attribute,
                comparison,
                value,
            } => {
                let subject = LExpression::new(
                    LFunction::Attr,
                    vec![ConstValue::str(attribute.name.as_str()).into()],
                );
                self.comparison(*comparison, subject, value)
            }

            ConstraintStmtKind::Size { comparison, value } => {
                self.comparison(*comparison, LExpression::leaf(LFunction::Size), value)
            }

            ConstraintStmtKind::Aggregate {
                aggregator,
                kind,
                comparison,
                value,
            } => self.comparison(*comparison, aggregate(*aggregator, kind), value),

            ConstraintStmtKind::With {
                label,
                predicate,
                kind,
                block,
            } => {
                let label = self.label(label.as_ref());
                let mut args: Vec<LArg> = vec![
                    ConstValue::str(kind.name.as_str()).into(),
                    self.predicate(predicate)?.into(),
                ];
                if let Some(block) = block {
                    args.push(self.block(block)?.into());
                }
                Ok(labelled(label, LExpression::new(LFunction::With, args)))
            }

            ConstraintStmtKind::Call {
                label,
                predicate,
                constraint,
            } => {
                let label = self.label(label.as_ref());
                let target = self.ctx.constraint_type(&constraint.callee)?;
                let name = target.ident.name.as_str();
                if self.expanding.contains(&name) {
                    return Err(Problem::fatal_at(
                        "recursive constraint",
                        constraint.callee.span,
                    ));
                }
                let scope = self.scope_from_call(constraint, &target.params)?;
                let predicate = self.predicate(predicate)?;

                self.expanding.push(name);
                let block = self.with_scope(scope, |this| this.block(&target.block));
                self.expanding.pop();

                let with = LExpression::new(
                    LFunction::With,
                    vec![
                        ConstValue::str(target.kind.name.as_str()).into(),
                        predicate.into(),
                        block?.into(),
                    ],
                );
                Ok(labelled(label, with))
            }
        }
    }

    /// Intern an activation label, in source order.
    fn label(&mut self, label: Option<&Ident>) -> Option<usize> {
        let label = label?;
        let idx = self.ctx.intern_label(&label.name);
        trace!(label = %label.name, idx, "activation label");
        Some(idx)
    }

    // Predicates

    fn predicate(&mut self, call: &Call) -> Result<LExpression> {
        let target = self.ctx.predicate(&call.callee)?;
        let scope = self.scope_from_call(call, &target.params)?;
        self.with_scope(scope, |this| this.predicate_block(&target.block))
    }

    fn predicate_block(&mut self, block: &PredicateBlock) -> Result<LExpression> {
        let mut stmts = Vec::with_capacity(block.stmts.len());
        for stmt in &block.stmts {
            stmts.push(self.predicate_stmt(stmt)?);
        }
        Ok(self.quantified(block.quantifier, stmts))
    }

    fn predicate_stmt(&mut self, stmt: &PredicateStmt) -> Result<LExpression> {
        ensure_sufficient_stack(|| match &stmt.kind {
            PredicateStmtKind::Block(block) => self.predicate_block(block),
            PredicateStmtKind::Size { comparison, value } => {
                self.comparison(*comparison, LExpression::leaf(LFunction::Size), value)
            }
            PredicateStmtKind::Aggregate {
                aggregator,
                kind,
                comparison,
                value,
            } => self.comparison(*comparison, aggregate(*aggregator, kind), value),
        })
    }
}

fn aggregate(aggregator: Aggregator, kind: &Ident) -> LExpression {
    LExpression::new(
        aggregator.into(),
        vec![ConstValue::str(kind.name.as_str()).into()],
    )
}

/// `[LABEL, idx, stmt]` for a labelled statement.
fn labelled(label: Option<usize>, stmt: LExpression) -> LExpression {
    match label {
        Some(idx) => LExpression::new(
            LFunction::Label,
            vec![ConstValue::int(label_index(idx)).into(), stmt.into()],
        ),
        None => stmt,
    }
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "label pools never approach i64::MAX entries"
)]
fn label_index(idx: usize) -> i64 {
    idx as i64
}
