//! The raw `.http` file model.

use crate::models::{format_duration, HttpRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// A variable whose value the user supplies by answering a prompt.
///
/// Prompts are constructed at parse time and copied unchanged into the
/// resolved plan; collecting the answers is the caller's job, via a
/// [`crate::resolver::PromptAnswers`] provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Name of the variable the answer is stored in.
    pub name: String,

    /// Optional free-text description shown when prompting.
    pub description: Option<String>,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => write!(f, "@prompt {} {description}", self.name),
            None => write!(f, "@prompt {}", self.name),
        }
    }
}

/// A single `.http` file as parsed.
///
/// Nearly concrete, but variable interpolation may still be pending in a
/// number of fields; see [`crate::resolver::resolve_file`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpFile {
    /// Name of the file, or `@name` in global scope if given.
    pub name: String,

    /// Global variables defined at the top of the file, e.g. a base URL.
    pub vars: HashMap<String, String>,

    /// Global prompts, answered once per file.
    pub prompts: Vec<Prompt>,

    /// The HTTP requests described in the file, in source order.
    pub requests: Vec<HttpRequest>,

    /// Global timeout applied to every request that does not set its own.
    pub timeout: Option<Duration>,

    /// Global connection timeout applied to every request that does not set
    /// its own.
    pub connection_timeout: Option<Duration>,

    /// Disable following redirects globally.
    pub no_redirect: bool,
}

impl HttpFile {
    /// Creates an empty [`HttpFile`] with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the request with the given name, if any.
    pub fn get_request(&self, name: &str) -> Option<&HttpRequest> {
        self.requests.iter().find(|request| request.name == name)
    }
}

impl fmt::Display for HttpFile {
    /// Renders the file back in `.http` syntax: global directives, a blank
    /// line, then each request.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.name.is_empty() {
            writeln!(f, "@name = {}\n", self.name)?;
        }

        for prompt in &self.prompts {
            writeln!(f, "{prompt}")?;
        }

        let mut keys: Vec<&String> = self.vars.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "@{key} = {}", self.vars[key])?;
        }

        if let Some(timeout) = self.timeout {
            writeln!(f, "@timeout = {}", format_duration(timeout))?;
        }

        if let Some(timeout) = self.connection_timeout {
            writeln!(f, "@connection-timeout = {}", format_duration(timeout))?;
        }

        if self.no_redirect {
            writeln!(f, "@no-redirect")?;
        }

        // Separate the requests from the globals
        writeln!(f)?;

        for request in &self.requests {
            write!(f, "{request}")?;
        }

        Ok(())
    }
}
