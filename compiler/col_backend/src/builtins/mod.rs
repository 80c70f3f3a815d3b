//! Builtin operators and functions.
//!
//! Every operator symbol and builtin function name maps to a set of
//! overloads. An overload has fixed parameter types, a return type, the
//! single opcode the emitter writes for it and, when it can be folded, a
//! native implementation used by the constant evaluator.
//!
//! Two kinds of resolution:
//! - static inference for emitted code unions the return types of every
//!   overload whose parameters are compatible with the argument types
//! - evaluation picks the one overload matching the concrete argument
//!   types of constant data

mod native;

use rustc_hash::FxHashMap;

use col_diagnostic::{Problem, Result};
use col_ir::{ConstValue, Span};
use col_types::Type;

use crate::opcode::Opcode;

pub use native::ArithmeticError;

/// Native implementation of an overload.
///
/// `Ok(None)` declines: the value is left to the runtime.
pub type NativeFn = fn(&[ConstValue]) -> std::result::Result<Option<ConstValue>, ArithmeticError>;

/// One overload of a builtin.
#[derive(Clone, Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub params: &'static [Type],
    pub returns: Type,
    pub opcode: Opcode,
    /// `None` for builtins that only exist at runtime.
    pub native: Option<NativeFn>,
}

impl Builtin {
    #[inline]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameters are compatible with the given argument types.
    pub fn accepts(&self, args: &[Type]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.compatible(*arg))
    }
}

/// Table of builtins by name, built once per compilation.
#[derive(Clone, Debug, Default)]
pub struct Builtins {
    table: FxHashMap<&'static str, Vec<Builtin>>,
}

const NUM_NUM: &[Type] = &[Type::NUMBER, Type::NUMBER];
const STR_STR: &[Type] = &[Type::STRING, Type::STRING];
const BOOL_BOOL: &[Type] = &[Type::BOOLEAN, Type::BOOLEAN];
const KIND_KIND: &[Type] = &[Type::KIND, Type::KIND];
const NONE_NONE: &[Type] = &[Type::NONE, Type::NONE];
const NUM: &[Type] = &[Type::NUMBER];
const BOOL: &[Type] = &[Type::BOOLEAN];
const NODE: &[Type] = &[Type::NODE];

impl Builtins {
    /// The builtins of the language.
    pub fn standard() -> Self {
        let mut builtins = Builtins::default();
        let mut add = |name: &'static str,
                       params: &'static [Type],
                       returns: Type,
                       opcode: Opcode,
                       native: Option<NativeFn>| {
            builtins.register(Builtin {
                name,
                params,
                returns,
                opcode,
                native,
            });
        };

        // Arithmetic
        add("+", NUM_NUM, Type::NUMBER, Opcode::Add, Some(native::add));
        add("+", STR_STR, Type::STRING, Opcode::Add, Some(native::add));
        add("-", NUM_NUM, Type::NUMBER, Opcode::Sub, Some(native::sub));
        add("*", NUM_NUM, Type::NUMBER, Opcode::Mul, Some(native::mul));
        add("/", NUM_NUM, Type::NUMBER, Opcode::Div, Some(native::div));
        add("-", NUM, Type::NUMBER, Opcode::Neg, Some(native::neg));

        // Equality
        for params in [NUM_NUM, STR_STR, BOOL_BOOL, KIND_KIND, NONE_NONE] {
            add("==", params, Type::BOOLEAN, Opcode::Eql, Some(native::eql));
            add("!=", params, Type::BOOLEAN, Opcode::Neq, Some(native::neq));
        }

        // Ordering
        add("<", NUM_NUM, Type::BOOLEAN, Opcode::Les, Some(native::les));
        add("<=", NUM_NUM, Type::BOOLEAN, Opcode::Leq, Some(native::leq));
        add(">", NUM_NUM, Type::BOOLEAN, Opcode::Gre, Some(native::gre));
        add(">=", NUM_NUM, Type::BOOLEAN, Opcode::Geq, Some(native::geq));
        add("*=", NUM_NUM, Type::BOOLEAN, Opcode::Mut, Some(native::multiple_of));
        add("**=", NUM_NUM, Type::BOOLEAN, Opcode::Pow, Some(native::power_of));

        // Logic
        add("&&", BOOL_BOOL, Type::BOOLEAN, Opcode::And, Some(native::and));
        add("||", BOOL_BOOL, Type::BOOLEAN, Opcode::Or, Some(native::or));
        add("!", BOOL, Type::BOOLEAN, Opcode::Not, Some(native::not));

        // Runtime only
        add("range", NUM_NUM, Type::NUMBER_LIST, Opcode::Range, None);
        add("kind", NODE, Type::KIND, Opcode::KindOf, None);

        builtins
    }

    pub fn register(&mut self, builtin: Builtin) {
        self.table.entry(builtin.name).or_default().push(builtin);
    }

    /// All overloads registered under `name`.
    pub fn overloads(&self, name: &str) -> Option<Overloads<'_>> {
        self.table.get(name).map(|all| Overloads {
            name: all.first().map_or("", |b| b.name),
            all,
        })
    }
}

/// The overload set of one name.
#[derive(Copy, Clone, Debug)]
pub struct Overloads<'b> {
    name: &'static str,
    all: &'b [Builtin],
}

impl<'b> Overloads<'b> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fatal problem unless some overload takes `arity` arguments.
    pub fn check_arity(&self, arity: usize, span: Span) -> Result<()> {
        if self.all.iter().any(|b| b.arity() == arity) {
            return Ok(());
        }
        let expected = self.all.first().map_or(0, Builtin::arity);
        Err(Problem::fatal_at(
            format!("expected {expected} arguments"),
            span,
        ))
    }

    /// Union of the return types of every overload accepting `args`, with
    /// the opcode they share.
    pub fn infer(&self, args: &[Type], span: Span) -> Result<(Type, Opcode)> {
        let mut candidates = self.all.iter().filter(|b| b.accepts(args));
        let Some(first) = candidates.next() else {
            return Err(no_overload(self.name, args, span));
        };
        let mut ty = first.returns;
        for other in candidates {
            if other.opcode != first.opcode {
                return Err(Problem::internal(format!(
                    "overloads of '{}' disagree on their opcode",
                    self.name
                )));
            }
            ty = Type::lup([ty, other.returns]);
        }
        Ok((ty, first.opcode))
    }

    /// The single overload matching concrete argument types.
    pub fn select(&self, args: &[Type], span: Span) -> Result<&'b Builtin> {
        let mut candidates = self.all.iter().filter(|b| b.accepts(args));
        match (candidates.next(), candidates.next()) {
            (Some(builtin), None) => Ok(builtin),
            (None, _) => Err(no_overload(self.name, args, span)),
            (Some(_), Some(_)) => Err(Problem::internal(format!(
                "ambiguous overload {}",
                describe(self.name, args)
            ))),
        }
    }
}

/// Fatal problem for argument types no overload accepts.
fn no_overload(name: &str, args: &[Type], span: Span) -> Problem {
    let what = if is_operator(name) {
        "undefined operator"
    } else {
        "undefined function"
    };
    Problem::fatal_at(format!("{what} {}", describe(name, args)), span)
}

fn is_operator(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_alphabetic())
}

/// Source-like rendering of an application, such as `<num> + <str>`.
fn describe(name: &str, args: &[Type]) -> String {
    match args {
        [operand] if is_operator(name) => format!("{name}{operand}"),
        [left, right] if is_operator(name) => format!("{left} {name} {right}"),
        _ => {
            let args: Vec<_> = args.iter().map(ToString::to_string).collect();
            format!("{name}({})", args.join(", "))
        }
    }
}
