//! Plain-text rendering of problems.
//!
//! A fatal problem prints each span as a file and line header, the source
//! line, and a caret marker under the spanned columns:
//!
//! ```text
//! main.col @ line 3
//! >>     x = y + 1;
//! >>         ^
//! fatal problem: undefined identifier
//! ```

use std::backtrace::BacktraceStatus;
use std::fmt::Write;

use col_ir::{SourceMap, Span};

use crate::{FatalProblem, InternalProblem, Problem};

impl Problem {
    pub fn render(&self, sources: &SourceMap) -> String {
        match self {
            Problem::Fatal(p) => p.render(sources),
            Problem::Internal(p) => p.render(),
        }
    }
}

impl FatalProblem {
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        for span in &self.spans {
            render_span(&mut out, sources, *span);
        }
        out.push_str("fatal problem: ");
        out.push_str(&self.message);
        out
    }
}

impl InternalProblem {
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.backtrace.status() == BacktraceStatus::Captured {
            let _ = writeln!(out, "{}", self.backtrace);
        }
        out.push_str("internal problem: ");
        out.push_str(&self.message);
        out
    }
}

fn render_span(out: &mut String, sources: &SourceMap, span: Span) {
    let Some(file) = sources.get(span.source) else {
        let _ = writeln!(out, "<unknown source> @ byte {}", span.start);
        return;
    };

    let start = file.position(span.start);
    let end = file.position(span.end);
    let line = file.line(start.line).unwrap_or_default();
    let line_width = line.chars().count();

    // Spans running past their first line are marked to the line end.
    let (end_column, ellipsis) = if end.line == start.line {
        (end.column, "")
    } else {
        (line_width, "...")
    };
    let width = end_column.saturating_sub(start.column).max(1);

    let _ = writeln!(out, "{} @ line {}", file.path().display(), start.line + 1);
    let _ = writeln!(out, ">> {line}{ellipsis}");
    let _ = writeln!(
        out,
        ">> {}{}",
        " ".repeat(start.column),
        "^".repeat(width)
    );
}
