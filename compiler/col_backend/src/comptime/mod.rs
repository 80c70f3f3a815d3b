//! Compile-time evaluation.
//!
//! The evaluator folds an expression to constant data when every value it
//! depends on is known. It runs user functions by interpreting their bodies
//! with constant arguments. As soon as something is only known at runtime
//! (an attribute, a runtime binding, a loop, a builtin without a native
//! implementation) evaluation stops, and the caller falls back to emitting
//! code for the expression.
//!
//! Problems found while evaluating are real: an undefined identifier or a
//! division by zero is reported, not retried at runtime.

use col_diagnostic::{Problem, Result};
use col_ir::ast::{Block, Call, Expr, ExprKind, FunctionDef, Stmt, StmtKind};
use col_ir::{ConstValue, Span};
use col_stack::ensure_sufficient_stack;
use col_types::{ComptimeValue, Type, Value};

use crate::builtins::Overloads;
use crate::checks::{check_arguments, check_compatible, check_list_element};
use crate::context::{Callee, Context};
use crate::scope::{Binding, LocalScope, Scope};

/// Why evaluation stopped early.
enum Abort {
    /// Something depends on runtime data.
    Runtime,
    Problem(Problem),
}

impl From<Problem> for Abort {
    fn from(problem: Problem) -> Self {
        Abort::Problem(problem)
    }
}

type Eval<T> = std::result::Result<T, Abort>;

/// How a statement list finished.
enum Flow {
    Continue,
    /// `return`, with its value unless bare.
    Returned(Option<ComptimeValue>),
}

/// Fold `expr` in `scope`.
///
/// `Ok(None)` means the value is only known at runtime. `inlining` lists
/// the functions whose bodies the caller is currently inside, so recursion
/// through the evaluator is caught as well.
pub fn evaluate<'a>(
    ctx: &Context<'a>,
    scope: &LocalScope<Scope>,
    expr: &Expr,
    inlining: &[&'a str],
) -> Result<Option<ComptimeValue>> {
    let mut evaluator = Evaluator {
        ctx,
        inlining: inlining.to_vec(),
    };
    match evaluator.expr(scope, expr) {
        Ok(value) => Ok(Some(value)),
        Err(Abort::Runtime) => Ok(None),
        Err(Abort::Problem(problem)) => Err(problem),
    }
}

struct Evaluator<'c, 'a> {
    ctx: &'c Context<'a>,
    inlining: Vec<&'a str>,
}

impl<'a> Evaluator<'_, 'a> {
    fn expr(&mut self, scope: &LocalScope<Scope>, expr: &Expr) -> Eval<ComptimeValue> {
        ensure_sufficient_stack(|| self.expr_inner(scope, expr))
    }

    fn expr_inner(&mut self, scope: &LocalScope<Scope>, expr: &Expr) -> Eval<ComptimeValue> {
        match &expr.kind {
            ExprKind::Literal(data) => Ok(ComptimeValue::new(data.clone())),

            ExprKind::Ref(ident) => {
                let binding = scope.borrow().lookup(ident)?;
                match binding {
                    Binding::Comptime { value, .. } => Ok(value),
                    Binding::Runtime { .. } => Err(Abort::Runtime),
                }
            }

            ExprKind::Attr { .. } => Err(Abort::Runtime),

            ExprKind::Unary { op, operand } => {
                let operand = self.expr(scope, operand)?;
                let overloads = self.ctx.operator(op.as_symbol())?;
                apply(overloads, vec![operand], expr.span)
            }

            ExprKind::Binary { op, left, right } => {
                let left = self.expr(scope, left)?;
                let right = self.expr(scope, right)?;
                let overloads = self.ctx.operator(op.as_symbol())?;
                apply(overloads, vec![left, right], expr.span)
            }

            ExprKind::Call(call) => self.call(scope, call),

            ExprKind::List(items) => {
                let mut data = Vec::with_capacity(items.len());
                for item in items {
                    let value = self.expr(scope, item)?;
                    check_list_element(value.ty(), item.span)?;
                    data.push(value.into_data());
                }
                Ok(ComptimeValue::new(ConstValue::List(data)))
            }
        }
    }

    fn call(&mut self, scope: &LocalScope<Scope>, call: &Call) -> Eval<ComptimeValue> {
        match self.ctx.callee(&call.callee)? {
            Callee::Builtin(overloads) => {
                overloads.check_arity(call.args.len(), call.callee.span)?;
                let args = self.args(scope, call)?;
                apply(overloads, args, call.span)
            }
            Callee::Function(function) => self.inline(scope, call, function),
        }
    }

    fn args(&mut self, scope: &LocalScope<Scope>, call: &Call) -> Eval<Vec<ComptimeValue>> {
        call.args.iter().map(|arg| self.expr(scope, arg)).collect()
    }

    /// Run a user function with constant arguments.
    fn inline(
        &mut self,
        scope: &LocalScope<Scope>,
        call: &Call,
        function: &'a FunctionDef,
    ) -> Eval<ComptimeValue> {
        check_arguments(&function.params, call.args.len(), call.callee.span)?;
        let name = function.ident.name.as_str();
        if self.inlining.contains(&name) {
            return Err(Problem::fatal_at("recursive function call", call.callee.span).into());
        }

        let args = self.args(scope, call)?;
        let callee_scope = Scope::new_call_scope(None);
        for (param, arg) in function.params.iter().zip(args) {
            callee_scope.borrow_mut().define_comptime(param, arg, true)?;
        }

        self.inlining.push(name);
        let flow = self.stmts(&callee_scope, &function.body.stmts);
        self.inlining.pop();

        match flow? {
            Flow::Returned(Some(value)) => Ok(value),
            // no value: leave the void result to the emitter
            Flow::Returned(None) | Flow::Continue => Err(Abort::Runtime),
        }
    }

    fn block(&mut self, scope: &LocalScope<Scope>, block: &Block) -> Eval<Flow> {
        let child = Scope::new_child_scope(scope, None);
        self.stmts(&child, &block.stmts)
    }

    fn stmts(&mut self, scope: &LocalScope<Scope>, stmts: &[Stmt]) -> Eval<Flow> {
        for stmt in stmts {
            if let Flow::Returned(value) = self.stmt(scope, stmt)? {
                return Ok(Flow::Returned(value));
            }
        }
        Ok(Flow::Continue)
    }

    fn stmt(&mut self, scope: &LocalScope<Scope>, stmt: &Stmt) -> Eval<Flow> {
        ensure_sufficient_stack(|| self.stmt_inner(scope, stmt))
    }

    fn stmt_inner(&mut self, scope: &LocalScope<Scope>, stmt: &Stmt) -> Eval<Flow> {
        match &stmt.kind {
            StmtKind::Block(block) => self.block(scope, block),

            StmtKind::Define {
                qualifier,
                ident,
                value,
            } => {
                let value = self.expr(scope, value)?;
                scope
                    .borrow_mut()
                    .define_comptime(ident, value, qualifier.is_final())?;
                Ok(Flow::Continue)
            }

            StmtKind::Assign { ident, value } => {
                let value = self.expr(scope, value)?;
                scope
                    .borrow_mut()
                    .assign(ident, Value::Comptime(value), None)?;
                Ok(Flow::Continue)
            }

            StmtKind::Return(None) => Ok(Flow::Returned(None)),
            StmtKind::Return(Some(value)) => Ok(Flow::Returned(Some(self.expr(scope, value)?))),

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let value = self.expr(scope, cond)?;
                check_compatible(value.ty(), Type::BOOLEAN, cond.span)?;
                match (value.data().as_bool(), else_block) {
                    (Some(true), _) => self.block(scope, then_block),
                    (Some(false), Some(else_block)) => self.block(scope, else_block),
                    (Some(false), None) => Ok(Flow::Continue),
                    (None, _) => Err(Problem::internal("boolean value without boolean data").into()),
                }
            }

            StmtKind::For { .. } => Err(Abort::Runtime),

            StmtKind::Fail(message) => {
                let value = self.expr(scope, message)?;
                check_compatible(value.ty(), Type::STRING, message.span)?;
                let text = value.data().as_str().unwrap_or_default();
                Err(Problem::fatal_at(text, stmt.span).into())
            }

            StmtKind::Expr(value) => {
                self.expr(scope, value)?;
                Ok(Flow::Continue)
            }
        }
    }
}

/// Fold a builtin application.
fn apply(overloads: Overloads<'_>, args: Vec<ComptimeValue>, span: Span) -> Eval<ComptimeValue> {
    let types: Vec<Type> = args.iter().map(ComptimeValue::ty).collect();
    let builtin = overloads.select(&types, span)?;
    let Some(native) = builtin.native else {
        return Err(Abort::Runtime);
    };
    let data: Vec<ConstValue> = args.into_iter().map(ComptimeValue::into_data).collect();
    match native(&data) {
        Ok(Some(result)) => Ok(ComptimeValue::new(result)),
        Ok(None) => Err(Abort::Runtime),
        Err(error) => {
            let operands: Vec<_> = data.iter().map(ToString::to_string).collect();
            let application = match operands.as_slice() {
                [operand] => format!("{}{operand}", builtin.name),
                [left, right] => format!("{left} {} {right}", builtin.name),
                _ => format!("{}({})", builtin.name, operands.join(", ")),
            };
            Err(Problem::fatal_at(format!("{error}: {application}"), span).into())
        }
    }
}
