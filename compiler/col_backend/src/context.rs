//! Shared state of one compilation.

use col_diagnostic::{Problem, Result};
use col_ir::ast::{ConstraintMain, ConstraintType, File, FunctionDef, Ident, PredicateDef};

use crate::builtins::{Builtins, Overloads};
use crate::config::Config;
use crate::object::Constant;
use crate::pool::Pool;

/// What a call site refers to.
#[derive(Copy, Clone, Debug)]
pub enum Callee<'a> {
    Builtin(Overloads<'a>),
    Function(&'a FunctionDef),
}

/// The file being compiled, its settings, and the pools shared by the
/// constraint and every mapping.
#[derive(Debug)]
pub struct Context<'a> {
    file: &'a File,
    config: &'a Config,
    builtins: &'a Builtins,
    const_pool: Pool<Constant>,
    label_pool: Pool<String>,
}

impl<'a> Context<'a> {
    pub fn new(file: &'a File, config: &'a Config, builtins: &'a Builtins) -> Self {
        Context {
            file,
            config,
            builtins,
            const_pool: Pool::new(),
            label_pool: Pool::new(),
        }
    }

    #[inline]
    pub fn file(&self) -> &'a File {
        self.file
    }

    #[inline]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Index of `constant` in the shared constant pool.
    pub fn intern_constant(&mut self, constant: Constant) -> usize {
        self.const_pool.intern(constant)
    }

    /// Index of an activation label, interning it.
    pub fn intern_label(&mut self, name: &str) -> usize {
        match self.label_pool.find(name) {
            Some(idx) => idx,
            None => self.label_pool.intern(name.to_string()),
        }
    }

    /// Index of an activation label declared by the constraint.
    pub fn label(&self, ident: &Ident) -> Result<usize> {
        self.label_pool
            .find(ident.name.as_str())
            .ok_or_else(|| Problem::fatal_at("undefined identifier", ident.span))
    }

    pub fn const_pool(&self) -> &Pool<Constant> {
        &self.const_pool
    }

    pub fn into_const_pool(self) -> Vec<Constant> {
        self.const_pool.into_vec()
    }

    pub fn constraint_main(&self) -> Result<&'a ConstraintMain> {
        self.file
            .constraint_main()
            .ok_or_else(|| Problem::fatal_unspanned("undefined main constraint"))
    }

    pub fn constraint_type(&self, ident: &Ident) -> Result<&'a ConstraintType> {
        self.file
            .constraint_type(&ident.name)
            .ok_or_else(|| Problem::fatal_at("undefined identifier", ident.span))
    }

    pub fn predicate(&self, ident: &Ident) -> Result<&'a PredicateDef> {
        self.file
            .predicate(&ident.name)
            .ok_or_else(|| Problem::fatal_at("undefined identifier", ident.span))
    }

    /// Resolve a call: builtins first, then functions of the file graph.
    pub fn callee(&self, ident: &Ident) -> Result<Callee<'a>> {
        if let Some(overloads) = self.builtins.overloads(&ident.name) {
            return Ok(Callee::Builtin(overloads));
        }
        self.file
            .function(&ident.name)
            .map(Callee::Function)
            .ok_or_else(|| Problem::fatal_at("undefined identifier", ident.span))
    }

    /// Overloads of an operator symbol.
    pub fn operator(&self, symbol: &str) -> Result<Overloads<'a>> {
        self.builtins
            .overloads(symbol)
            .ok_or_else(|| Problem::internal(format!("operator '{symbol}' is not registered")))
    }
}
