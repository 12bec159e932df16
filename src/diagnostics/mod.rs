//! Source positions and the diagnostic sink.
//!
//! Every stage of the pipeline (scanner, parser, resolver) reports problems
//! through a [`DiagnosticSink`] installed at construction time, carrying a
//! [`Position`] that text editors and terminals can interpret as a jumpable
//! location (`file:line:col` or `file:line:start-end`).

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

/// An arbitrary source file position including file, line and column
/// information. It can also express a range of source via `start_col` and
/// `end_col`, which is useful for error reporting.
///
/// Positions without a filename are considered invalid; for stdin the
/// string `"stdin"` may be used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Name of the source, typically a file path.
    pub name: String,

    /// Byte offset from the start of the source.
    pub offset: usize,

    /// Line number, 1 indexed.
    pub line: usize,

    /// Start column, 1 indexed.
    pub start_col: usize,

    /// End column, 1 indexed. `end_col == start_col` when the position
    /// points at a single character.
    pub end_col: usize,
}

impl Position {
    /// Reports whether the position describes a valid source location.
    ///
    /// The rules are:
    ///
    /// - `name` must be non-empty
    /// - `line` and `start_col` are 1 indexed so must be non-zero
    /// - `end_col` may only be `start_col` or greater
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && self.line >= 1 && self.start_col >= 1 && self.end_col >= self.start_col
    }
}

impl fmt::Display for Position {
    /// Formats the position such that most terminals and editors support
    /// clicking on it and navigating to the location:
    ///
    /// - `file:line:start-end` for a range of text on the line
    /// - `file:line:start` for a single character (`end_col == start_col`)
    ///
    /// Invalid positions render as a `BadPosition` debug string instead.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return write!(
                f,
                "BadPosition: {{name: {:?}, line: {}, start_col: {}, end_col: {}}}",
                self.name, self.line, self.start_col, self.end_col
            );
        }

        if self.start_col == self.end_col {
            write!(f, "{}:{}:{}", self.name, self.line, self.start_col)
        } else {
            write!(f, "{}:{}:{}-{}", self.name, self.line, self.start_col, self.end_col)
        }
    }
}

/// A consumer of positioned error messages.
///
/// A sink is installed when the scanner and parser are constructed and is
/// called once per diagnostic. Implementations must be safe against
/// concurrent invocation; the provided sinks serialise internally with a
/// mutex.
pub trait DiagnosticSink: Send + Sync {
    /// Receives a single diagnostic.
    fn report(&self, position: Position, message: &str);
}

impl<F> DiagnosticSink for F
where
    F: Fn(Position, &str) + Send + Sync,
{
    fn report(&self, position: Position, message: &str) {
        self(position, message);
    }
}

/// A sink that silently discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&self, _position: Position, _message: &str) {}
}

/// A single recorded diagnostic, as captured by a [`CollectingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the problem was found.
    pub position: Position,

    /// Human readable description of the problem.
    pub message: String,
}

/// A sink that records every diagnostic it receives, for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates a new, empty [`CollectingSink`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all diagnostics recorded so far, leaving the sink empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *diagnostics)
    }

    /// Returns the number of diagnostics recorded so far.
    pub fn len(&self) -> usize {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Reports whether no diagnostics have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, position: Position, message: &str) {
        let mut diagnostics = self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner);
        diagnostics.push(Diagnostic {
            position,
            message: message.to_string(),
        });
    }
}

/// The default console sink.
///
/// Prints `position: message` followed by a source listing excerpt: up to
/// three lines of context either side of the offending line, each prefixed
/// with a right-aligned line-number gutter, and a red underline of U+2500
/// characters beneath the offending column range.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleSink {
    /// Number of context lines shown either side of the offending line.
    const CONTEXT: usize = 3;

    /// Creates a [`ConsoleSink`] writing to the given writer.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
        }
    }

    /// Creates a [`ConsoleSink`] writing to stderr.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Renders the source excerpt for a position, reading the source from
    /// the file the position names. Returns `None` when the file cannot be
    /// read, in which case only the headline is printed.
    fn excerpt(position: &Position) -> Option<String> {
        if !position.is_valid() {
            return None;
        }

        let source = fs::read_to_string(&position.name).ok()?;
        let lines: Vec<&str> = source.lines().collect();
        if position.line > lines.len() {
            return None;
        }

        let first = position.line.saturating_sub(Self::CONTEXT + 1) + 1;
        let last = (position.line + Self::CONTEXT).min(lines.len());
        let gutter = last.to_string().len();

        let mut rendered = String::new();
        for number in first..=last {
            rendered.push_str(&format!("{number:>gutter$} | {}\n", lines[number - 1]));

            if number == position.line {
                let pad = " ".repeat(gutter);
                let lead = " ".repeat(position.start_col.saturating_sub(1));
                let width = (position.end_col - position.start_col).max(1);
                let underline = "\u{2500}".repeat(width);
                rendered.push_str(&format!("{pad} | {lead}{}\n", underline.as_str().red()));
            }
        }

        Some(rendered)
    }
}

impl DiagnosticSink for ConsoleSink {
    fn report(&self, position: Position, message: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);

        let headline = position.to_string();
        let _ = writeln!(out, "{}: {}", headline.as_str().bold(), message.red());
        if let Some(excerpt) = Self::excerpt(&position) {
            let _ = write!(out, "{excerpt}");
        }
    }
}
