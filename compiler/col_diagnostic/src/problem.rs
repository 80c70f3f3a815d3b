use std::backtrace::Backtrace;

use col_ir::Span;
use thiserror::Error;

/// Result type of every fallible compiler operation.
pub type Result<T> = std::result::Result<T, Problem>;

/// The first problem compilation ran into.
#[derive(Debug, Error)]
pub enum Problem {
    #[error("fatal problem: {0}")]
    Fatal(#[from] FatalProblem),

    #[error("internal problem: {0}")]
    Internal(#[from] InternalProblem),
}

impl Problem {
    /// A problem with the input at the given spans.
    pub fn fatal(message: impl Into<String>, spans: impl IntoIterator<Item = Span>) -> Self {
        Problem::Fatal(FatalProblem::new(message, spans))
    }

    /// A problem with the input at one span.
    pub fn fatal_at(message: impl Into<String>, span: Span) -> Self {
        Problem::fatal(message, [span])
    }

    /// A problem with the input that no source location explains, such as
    /// a missing definition or a bad configuration flag.
    pub fn fatal_unspanned(message: impl Into<String>) -> Self {
        Problem::fatal(message, [])
    }

    /// A problem inside the compiler. Captures a backtrace when enabled by
    /// `RUST_BACKTRACE`.
    pub fn internal(message: impl Into<String>) -> Self {
        Problem::Internal(InternalProblem::new(message))
    }

    pub fn message(&self) -> &str {
        match self {
            Problem::Fatal(p) => &p.message,
            Problem::Internal(p) => &p.message,
        }
    }

    /// Spans of a fatal problem; empty for internal ones.
    pub fn spans(&self) -> &[Span] {
        match self {
            Problem::Fatal(p) => &p.spans,
            Problem::Internal(_) => &[],
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Problem::Fatal(_))
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Problem::Internal(_))
    }
}

/// A problem with the input program.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FatalProblem {
    pub message: String,
    pub spans: Vec<Span>,
}

impl FatalProblem {
    pub fn new(message: impl Into<String>, spans: impl IntoIterator<Item = Span>) -> Self {
        FatalProblem {
            message: message.into(),
            spans: spans.into_iter().collect(),
        }
    }
}

/// A bug or format limit inside the compiler.
///
/// Boxed trace: the derive must not see a bare `Backtrace` field.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct InternalProblem {
    pub message: String,
    pub backtrace: Box<Backtrace>,
}

impl InternalProblem {
    pub fn new(message: impl Into<String>) -> Self {
        InternalProblem {
            message: message.into(),
            backtrace: Box::new(Backtrace::capture()),
        }
    }
}
