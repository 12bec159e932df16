//! The resolved request plan.
//!
//! [`ResolvedFile`] and [`ResolvedRequest`] differ from their raw
//! counterparts in that they are concrete: variable interpolation has been
//! performed, URLs are known to parse as absolute request URIs, and default
//! configuration is in place where the file provided none. A resolved
//! request can be executed as-is.

use crate::models::{format_duration, HttpMethod, Prompt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Default overall timeout for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout for HTTP requests.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// A `.http` file with every request resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFile {
    /// Name of the file, or the global `@name` if one was given.
    pub name: String,

    /// Global variables, concrete.
    pub vars: HashMap<String, String>,

    /// Global prompts, copied through unchanged so the caller can collect
    /// answers and resolve again.
    pub prompts: Vec<Prompt>,

    /// The resolved requests, in file order.
    pub requests: Vec<ResolvedRequest>,

    /// Global timeout, defaulted if the file did not set one.
    pub timeout: Duration,

    /// Global connection timeout, defaulted if the file did not set one.
    pub connection_timeout: Duration,

    /// Disable following redirects globally.
    pub no_redirect: bool,
}

impl ResolvedFile {
    /// Returns the request with the given name, if any.
    ///
    /// Names are unique within a file: either user-supplied via `@name` or
    /// synthesised as `#k` from the request's position.
    pub fn get_request(&self, name: &str) -> Option<&ResolvedRequest> {
        self.requests.iter().find(|request| request.name == name)
    }
}

impl fmt::Display for ResolvedFile {
    /// Canonical rendering: global directives, a blank line, then each
    /// request.
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

        if !self.timeout.is_zero() {
            writeln!(f, "@timeout = {}", format_duration(self.timeout))?;
        }

        if !self.connection_timeout.is_zero() {
            writeln!(f, "@connection-timeout = {}", format_duration(self.connection_timeout))?;
        }

        if self.no_redirect {
            writeln!(f, "@no-redirect")?;
        }

        writeln!(f)?;

        for request in &self.requests {
            write!(f, "{request}")?;
        }

        Ok(())
    }
}

/// A single HTTP request with all templates substituted and defaults
/// applied, ready to execute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    /// Request-scoped variables, concrete.
    pub vars: HashMap<String, String>,

    /// Request headers, values substituted.
    pub headers: HashMap<String, String>,

    /// Request-scoped prompts, copied through unchanged.
    pub prompts: Vec<Prompt>,

    /// The request name, never empty: `@name` or `#k`.
    pub name: String,

    /// Optional human-readable comment from the separator line.
    pub comment: Option<String>,

    /// The HTTP method.
    pub method: HttpMethod,

    /// The URL, substituted and known to parse as an absolute request URI.
    pub url: String,

    /// Version of the HTTP protocol to use, e.g. `HTTP/1.1`. When set to
    /// `HTTP/1.*` the executor disables HTTP/2; otherwise HTTP/2 is
    /// attempted.
    pub http_version: Option<String>,

    /// Path of the file to read the body from, relative to the `.http`
    /// file. Mutually exclusive with a non-empty `body`.
    pub body_file: Option<PathBuf>,

    /// Path of the file to write the response to, relative to the `.http`
    /// file.
    pub response_file: Option<PathBuf>,

    /// The request body post-substitution. Empty when there is no inline
    /// body.
    pub body: Vec<u8>,

    /// Overall timeout for this request, never zero.
    pub timeout: Duration,

    /// Connection timeout for this request, never zero.
    pub connection_timeout: Duration,

    /// Disable following redirects for this request.
    pub no_redirect: bool,
}

impl fmt::Display for ResolvedRequest {
    /// Canonical rendering: `### [comment]`, `# @name = …`, variables
    /// sorted by key, non-default directives, the method line, headers
    /// sorted by name, and the body section separated by a blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.comment {
            Some(comment) => writeln!(f, "### {comment}")?,
            None => writeln!(f, "###")?,
        }

        // Positional '#k' names regenerate on parse, only explicit names
        // are worth rendering
        if !self.name.is_empty() && !self.name.starts_with('#') {
            writeln!(f, "# @name = {}", self.name)?;
        }

        for prompt in &self.prompts {
            writeln!(f, "# {prompt}")?;
        }

        let mut keys: Vec<&String> = self.vars.keys().collect();
        keys.sort();
        for key in keys {
            writeln!(f, "# @{key} = {}", self.vars[key])?;
        }

        if !self.timeout.is_zero() {
            writeln!(f, "# @timeout = {}", format_duration(self.timeout))?;
        }

        if !self.connection_timeout.is_zero() {
            writeln!(f, "# @connection-timeout = {}", format_duration(self.connection_timeout))?;
        }

        if self.no_redirect {
            writeln!(f, "# @no-redirect")?;
        }

        match &self.http_version {
            Some(version) => writeln!(f, "{} {} {version}", self.method, self.url)?,
            None => writeln!(f, "{} {}", self.method, self.url)?,
        }

        let mut names: Vec<&String> = self.headers.keys().collect();
        names.sort();
        for name in names {
            writeln!(f, "{name}: {}", self.headers[name])?;
        }

        if !self.body.is_empty() || self.body_file.is_some() || self.response_file.is_some() {
            writeln!(f)?;
        }

        if let Some(path) = &self.body_file {
            writeln!(f, "< {}", path.display())?;
        }

        if !self.body.is_empty() {
            writeln!(f, "{}", String::from_utf8_lossy(&self.body))?;
        }

        if let Some(path) = &self.response_file {
            writeln!(f, "> {}", path.display())?;
        }

        Ok(())
    }
}
