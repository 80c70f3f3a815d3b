//! Mapping bytecode emission.
//!
//! Every expression is first handed to the constant evaluator; only when
//! its value depends on runtime data is code generated for its structure.
//! User functions are inlined at each call site. A `return` jumps to the
//! end of the innermost inlined body, or of the mapping itself.
//!
//! Storage slots are allocated once per mapping and never reused. Slot 0
//! holds the root node the mapping runs on, bound as `root`.

mod buffer;
pub mod fixpoint;

pub use buffer::{Instruction, InstructionBuffer, JumpAnchor, LoopHead, Operand};

use col_diagnostic::{Problem, Result};
use col_ir::ast::{
    Block, Call, Expr, ExprKind, FunctionDef, Ident, MappingDef, Qualifier, Stmt, StmtKind,
};
use col_ir::{ConstValue, Number, Span};
use col_stack::ensure_sufficient_stack;
use col_types::{ComptimeValue, RuntimeValue, Type, Value};
use tracing::{debug, trace};

use crate::checks::{check_argument_count, check_compatible, check_list_element};
use crate::comptime::evaluate;
use crate::context::{Callee, Context};
use crate::object::{Constant, Mapping};
use crate::opcode::Opcode;
use crate::scope::{Assignment, FrameId, LocalScope, Scope, ScopeContext, SlotAllocator};

/// Compile every mapping of the file being compiled.
///
/// Activation labels must already be interned, so the constraint is
/// compiled first.
pub fn compile_mappings(ctx: &mut Context<'_>) -> Result<Vec<Mapping>> {
    let definitions: Vec<&MappingDef> = ctx.file().mappings().collect();
    if definitions.is_empty() {
        return Err(Problem::fatal_unspanned("no mapping"));
    }
    if definitions.iter().all(|def| !def.labels.is_empty()) {
        return Err(Problem::fatal_unspanned("no unconditional mapping"));
    }

    definitions
        .into_iter()
        .map(|def| {
            let labels = def
                .labels
                .iter()
                .map(|label| ctx.label(label))
                .collect::<Result<Vec<_>>>()?;
            let code = compile_mapping(ctx, def)?;
            Ok(Mapping {
                name: def.ident.name.clone(),
                labels,
                code,
            })
        })
        .collect()
}

/// Compile one mapping body to bytecode.
#[tracing::instrument(level = "debug", skip_all, fields(mapping = %mapping.ident.name))]
pub fn compile_mapping(ctx: &mut Context<'_>, mapping: &MappingDef) -> Result<Vec<u8>> {
    let mut compiler = MappingCompiler::new(ctx)?;
    compiler.stmts(&mapping.body.stmts)?;
    let code = compiler.finish()?;
    debug!(bytes = code.len(), "mapping compiled");
    Ok(code)
}

/// Return bookkeeping of the mapping body or one inlined call.
#[derive(Debug, Default)]
struct Frame {
    returns: Vec<Type>,
    exits: Vec<JumpAnchor>,
}

pub struct MappingCompiler<'c, 'a> {
    ctx: &'c mut Context<'a>,
    buffer: InstructionBuffer,
    slots: SlotAllocator,
    scope: LocalScope<Scope>,
    frames: Vec<Frame>,
    /// Functions whose bodies are being inlined, innermost last.
    inlining: Vec<&'a str>,
}

impl<'c, 'a> MappingCompiler<'c, 'a> {
    pub fn new(ctx: &'c mut Context<'a>) -> Result<Self> {
        let mut slots = SlotAllocator::new();
        let scope = Scope::new_call_scope(Some(ScopeContext::Root(FrameId(0))));
        let root = slots.alloc()?;
        scope.borrow_mut().define_runtime(
            &Ident::new("root", Span::DUMMY),
            RuntimeValue::new(Type::NODE),
            root,
            true,
        )?;
        Ok(MappingCompiler {
            ctx,
            buffer: InstructionBuffer::new(),
            slots,
            scope,
            frames: vec![Frame::default()],
            inlining: Vec::new(),
        })
    }

    /// Resolve the mapping's own returns and encode the buffer.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Problem::internal("mapping frame is missing"))?;
        if !self.frames.is_empty() {
            return Err(Problem::internal("inlined call frame left open"));
        }
        self.patch_exits(frame.exits)?;
        self.buffer.build()
    }

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

    fn patch_exits(&mut self, exits: Vec<JumpAnchor>) -> Result<()> {
        // nearest first, so an elided exit does not shift the others
        for exit in exits.into_iter().rev() {
            self.buffer.patch(exit)?;
        }
        Ok(())
    }

    // Constants

    fn load_const(&mut self, data: &ConstValue) -> Result<()> {
        match data {
            ConstValue::List(items) => {
                self.buffer.push_op(Opcode::List);
                for item in items {
                    self.load_scalar(item)?;
                    self.buffer.push_op(Opcode::Append);
                }
                Ok(())
            }
            scalar => self.load_scalar(scalar),
        }
    }

    fn load_scalar(&mut self, data: &ConstValue) -> Result<()> {
        match data {
            ConstValue::None => self.buffer.push_op(Opcode::None),
            ConstValue::Bool(true) => self.buffer.push_op(Opcode::True),
            ConstValue::Bool(false) => self.buffer.push_op(Opcode::False),
            ConstValue::Number(number) => return self.load_number(*number),
            ConstValue::Str(text) => {
                let idx = self.ctx.intern_constant(Constant::Str(text.clone()));
                return self.buffer.push_index(Opcode::Const, idx, "constant");
            }
            ConstValue::Kind(name) => {
                let idx = self.ctx.intern_constant(Constant::Str(name.clone()));
                return self.buffer.push_index(Opcode::Kind, idx, "constant");
            }
            ConstValue::List(_) => {
                return Err(Problem::internal("nested list reached the emitter"));
            }
        }
        Ok(())
    }

    fn load_number(&mut self, number: Number) -> Result<()> {
        let immediate = match number {
            Number::Int(value) => u8::try_from(value).ok().map(|arg| (Opcode::Int, arg)),
            Number::Float(value) => fixpoint::encode(value).map(|arg| (Opcode::Float, arg)),
        };
        if let Some((opcode, arg)) = immediate {
            self.buffer.push(opcode, arg);
            return Ok(());
        }
        let idx = self.ctx.intern_constant(Constant::Number(number));
        self.buffer.push_index(Opcode::Const, idx, "constant")
    }

    // Expressions

    /// Compile `expr`, folding it when possible.
    ///
    /// With `load`, the value ends up on the stack even when folded.
    /// Without, a folded value emits nothing.
    pub fn accept_expr(&mut self, expr: &Expr, load: bool) -> Result<Value> {
        let value = match evaluate(self.ctx, &self.scope, expr, &self.inlining)? {
            Some(value) => {
                trace!(value = %value, "folded expression");
                Value::Comptime(value)
            }
            None => self.expr(expr)?,
        };
        if load {
            if let Value::Comptime(value) = &value {
                self.load_const(value.data())?;
            }
        }
        Ok(value)
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value> {
        ensure_sufficient_stack(|| self.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expr) -> Result<Value> {
        match &expr.kind {
            ExprKind::Literal(data) => Ok(Value::Comptime(ComptimeValue::new(data.clone()))),

            ExprKind::Ref(ident) => {
                let binding = self.scope.borrow().lookup(ident)?;
                if let Some(slot) = binding.slot() {
                    self.buffer.push(Opcode::Load, slot);
                }
                Ok(binding.value())
            }

            ExprKind::Attr { target, attribute } => {
                let binding = self.scope.borrow().lookup(target)?;
                check_compatible(binding.ty(), Type::NODE, target.span)?;
                let Some(slot) = binding.slot() else {
                    return Err(Problem::internal("node binding without storage"));
                };
                self.buffer.push(Opcode::Load, slot);
                let idx = self
                    .ctx
                    .intern_constant(Constant::Str(attribute.name.clone()));
                self.buffer.push_index(Opcode::Attr, idx, "constant")?;
                // attributes are untyped until the node graph exists
                Ok(Value::Runtime(RuntimeValue::ANY))
            }

            ExprKind::Unary { op, operand } => {
                let operand = self.accept_expr(operand, true)?;
                let overloads = self.ctx.operator(op.as_symbol())?;
                let (ty, opcode) = overloads.infer(&[operand.ty()], expr.span)?;
                self.buffer.push_op(opcode);
                Ok(Value::Runtime(RuntimeValue::new(ty)))
            }

            ExprKind::Binary { op, left, right } => {
                let left = self.accept_expr(left, true)?;
                let right = self.accept_expr(right, true)?;
                let overloads = self.ctx.operator(op.as_symbol())?;
                let (ty, opcode) = overloads.infer(&[left.ty(), right.ty()], expr.span)?;
                self.buffer.push_op(opcode);
                Ok(Value::Runtime(RuntimeValue::new(ty)))
            }

            ExprKind::Call(call) => match self.ctx.callee(&call.callee)? {
                Callee::Builtin(overloads) => {
                    overloads.check_arity(call.args.len(), call.callee.span)?;
                    let mut types = Vec::with_capacity(call.args.len());
                    for arg in &call.args {
                        types.push(self.accept_expr(arg, true)?.ty());
                    }
                    let (ty, opcode) = overloads.infer(&types, call.span)?;
                    self.buffer.push_op(opcode);
                    Ok(Value::Runtime(RuntimeValue::new(ty)))
                }
                Callee::Function(function) => self.inline(call, function),
            },

            ExprKind::List(items) => {
                self.buffer.push_op(Opcode::List);
                let mut types = Vec::with_capacity(items.len());
                for item in items {
                    let ty = self.accept_expr(item, true)?.ty();
                    check_list_element(ty, item.span)?;
                    self.buffer.push_op(Opcode::Append);
                    types.push(ty);
                }
                let ty = if types.is_empty() {
                    Type::ANY_LIST
                } else {
                    Type::lup(types).as_list()
                };
                Ok(Value::Runtime(RuntimeValue::new(ty)))
            }
        }
    }

    /// Inline the body of `function` at a call site.
    ///
    /// Constant arguments stay constant in the callee; runtime ones are
    /// stored into fresh slots. The call's type is the union of the types
    /// of every `return`.
    fn inline(&mut self, call: &Call, function: &'a FunctionDef) -> Result<Value> {
        check_argument_count(&function.params, call.args.len(), call.span)?;
        let name = function.ident.name.as_str();
        if self.inlining.contains(&name) {
            return Err(Problem::fatal_at(
                "recursive function call",
                call.callee.span,
            ));
        }
        debug!(function = name, depth = self.inlining.len(), "inlining call");

        let frame = FrameId(self.frames.len());
        let callee_scope = Scope::new_call_scope(Some(ScopeContext::Function(frame)));
        for (param, arg) in function.params.iter().zip(&call.args) {
            match self.accept_expr(arg, false)? {
                Value::Comptime(value) => {
                    callee_scope.borrow_mut().define_comptime(param, value, true)?;
                }
                Value::Runtime(value) => {
                    let slot = self.slots.alloc()?;
                    callee_scope
                        .borrow_mut()
                        .define_runtime(param, value, slot, true)?;
                    self.buffer.push(Opcode::Store, slot);
                }
            }
        }

        self.frames.push(Frame::default());
        self.inlining.push(name);
        let returns = self.with_scope(callee_scope, |this| this.stmts(&function.body.stmts));
        self.inlining.pop();
        let mut frame = self
            .frames
            .pop()
            .ok_or_else(|| Problem::internal("inlined call frame is missing"))?;

        if !returns? {
            self.buffer.push_op(Opcode::None);
            frame.returns.push(Type::VOID);
        }
        self.patch_exits(frame.exits)?;
        Ok(Value::Runtime(RuntimeValue::new(Type::lup(frame.returns))))
    }

    // Statements

    /// Compile a statement list; true when every path through it returns.
    pub fn stmts(&mut self, stmts: &[Stmt]) -> Result<bool> {
        let mut returns = false;
        for stmt in stmts {
            returns |= self.stmt(stmt)?;
        }
        Ok(returns)
    }

    fn child_block(&mut self, block: &Block, context: Option<ScopeContext>) -> Result<bool> {
        let child = Scope::new_child_scope(&self.scope, context);
        self.with_scope(child, |this| this.stmts(&block.stmts))
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<bool> {
        ensure_sufficient_stack(|| self.stmt_inner(stmt))
    }

    fn stmt_inner(&mut self, stmt: &Stmt) -> Result<bool> {
        match &stmt.kind {
            StmtKind::Block(block) => self.child_block(block, None),

            StmtKind::Define {
                qualifier: Qualifier::Const,
                ident,
                value,
            } => match self.accept_expr(value, false)? {
                Value::Comptime(value) => {
                    self.scope.borrow_mut().define_comptime(ident, value, true)?;
                    Ok(false)
                }
                Value::Runtime(_) => Err(Problem::fatal_at(
                    "cannot assign runtime value",
                    ident.span,
                )),
            },

            StmtKind::Define {
                qualifier,
                ident,
                value,
            } => {
                let value = self.accept_expr(value, true)?;
                let slot = self.slots.alloc()?;
                self.scope.borrow_mut().define_runtime(
                    ident,
                    value.to_runtime(),
                    slot,
                    qualifier.is_final(),
                )?;
                self.buffer.push(Opcode::Store, slot);
                Ok(false)
            }

            StmtKind::Assign { ident, value } => {
                let value = self.accept_expr(value, true)?;
                let assignment = self
                    .scope
                    .borrow_mut()
                    .assign(ident, value, Some(&mut self.slots))?;
                match assignment {
                    Assignment::Store(slot) => {
                        self.buffer.push(Opcode::Store, slot);
                        Ok(false)
                    }
                    Assignment::Replaced => Err(Problem::internal(
                        "constant binding reassigned in emitted code",
                    )),
                }
            }

            StmtKind::Return(value) => {
                let ty = match value {
                    Some(value) => self.accept_expr(value, true)?.ty(),
                    None => {
                        self.buffer.push_op(Opcode::None);
                        Type::VOID
                    }
                };
                let frame = self
                    .scope
                    .borrow()
                    .enclosing_frame()
                    .ok_or_else(|| Problem::internal("return outside of a frame"))?;
                let exit = self.buffer.reserve_jump(Opcode::JmpF);
                let frame = self
                    .frames
                    .get_mut(frame.0)
                    .ok_or_else(|| Problem::internal("return into a closed frame"))?;
                frame.returns.push(ty);
                frame.exits.push(exit);
                Ok(true)
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let ty = self.accept_expr(cond, true)?.ty();
                check_compatible(ty, Type::BOOLEAN, cond.span)?;
                let if_false = self.buffer.reserve_jump(Opcode::JmpFf);
                let then_returns = self.child_block(then_block, None)?;
                match else_block {
                    Some(else_block) => {
                        let if_end = self.buffer.reserve_jump(Opcode::JmpF);
                        self.buffer.patch(if_false)?;
                        let else_returns = self.child_block(else_block, None)?;
                        self.buffer.patch(if_end)?;
                        Ok(then_returns && else_returns)
                    }
                    None => {
                        self.buffer.patch(if_false)?;
                        Ok(false)
                    }
                }
            }

            StmtKind::For {
                binding,
                iterable,
                body,
            } => {
                let ty = self.accept_expr(iterable, true)?.ty();
                check_compatible(ty, Type::ANY_LIST, iterable.span)?;
                let iter = self.slots.alloc()?;
                self.buffer.push_op(Opcode::Iter);
                self.buffer.push(Opcode::Store, iter);

                let head = self.buffer.loop_head();
                self.buffer.push(Opcode::HasNext, iter);
                let exit = self.buffer.reserve_jump(Opcode::JmpFf);
                self.buffer.push(Opcode::Next, iter);
                let element = self.slots.alloc()?;
                self.buffer.push(Opcode::Store, element);

                let body_scope = Scope::new_child_scope(&self.scope, Some(ScopeContext::Loop));
                body_scope.borrow_mut().define_runtime(
                    binding,
                    RuntimeValue::new(ty.as_scalar()),
                    element,
                    true,
                )?;
                self.with_scope(body_scope, |this| this.stmts(&body.stmts))?;

                self.buffer.jump_back(head)?;
                self.buffer.patch(exit)?;
                Ok(false)
            }

            StmtKind::Fail(message) => {
                let ty = self.accept_expr(message, true)?.ty();
                check_compatible(ty, Type::STRING, message.span)?;
                self.buffer.push_op(Opcode::Fail);
                Ok(true)
            }

            StmtKind::Expr(value) => {
                if let Value::Runtime(_) = self.accept_expr(value, false)? {
                    self.buffer.push_op(Opcode::Drop);
                }
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests;
