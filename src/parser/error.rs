//! Error types for `.http` file parsing.

use std::fmt;

/// A summary parse error.
///
/// The parser reports each individual problem to the installed
/// [`crate::diagnostics::DiagnosticSink`] with a precise position as it
/// occurs; this error only signals that at least one of them happened and
/// should be preferred only for control flow and exit codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Name of the file that failed to parse.
    pub name: String,

    /// How many diagnostics were reported.
    pub errors: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors == 1 {
            write!(f, "{}: found 1 syntax error", self.name)
        } else {
            write!(f, "{}: found {} syntax errors", self.name, self.errors)
        }
    }
}

impl std::error::Error for ParseError {}
