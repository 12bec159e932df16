//! The raw HTTP request model.
//!
//! A [`HttpRequest`] is a single request as parsed from a `.http` file,
//! before variable resolution: the URL, header values, and body may still
//! contain `{{ … }}` template expressions.

use crate::models::{format_duration, Prompt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// HTTP request method.
///
/// The nine standard methods of RFC 7231 and RFC 5789. Methods are
/// recognised case-sensitively in source files: `GET` is a method, `get` is
/// plain text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    /// HTTP GET method.
    #[default]
    GET,
    /// HTTP HEAD method.
    HEAD,
    /// HTTP POST method.
    POST,
    /// HTTP PUT method.
    PUT,
    /// HTTP DELETE method.
    DELETE,
    /// HTTP CONNECT method.
    CONNECT,
    /// HTTP PATCH method.
    PATCH,
    /// HTTP OPTIONS method.
    OPTIONS,
    /// HTTP TRACE method.
    TRACE,
}

impl HttpMethod {
    /// Returns the string representation of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::CONNECT => "CONNECT",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }

    /// Parses a string into an [`HttpMethod`], or `None` if it is not one
    /// of the nine methods spelled exactly.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(HttpMethod::GET),
            "HEAD" => Some(HttpMethod::HEAD),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "CONNECT" => Some(HttpMethod::CONNECT),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "TRACE" => Some(HttpMethod::TRACE),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single HTTP request as parsed from a `.http` file.
///
/// Everything is literal: the URL, header values, and body carry whatever
/// text appeared in the source, template expressions included. The resolver
/// turns this into a [`crate::models::ResolvedRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// Request-scoped variables, override globals if specified.
    pub vars: HashMap<String, String>,

    /// Request headers. Values may contain template expressions, names may
    /// not.
    pub headers: HashMap<String, String>,

    /// Request-scoped prompts, answered whenever this request is invoked.
    pub prompts: Vec<Prompt>,

    /// The request name: either an explicit `@name`, or `#k` where `k` is
    /// the request's 1-indexed position in the file.
    pub name: String,

    /// Optional human-readable comment from the separator line.
    pub comment: Option<String>,

    /// The HTTP method.
    pub method: HttpMethod,

    /// The URL, possibly templated.
    pub url: String,

    /// Version of the HTTP protocol to use, e.g. `HTTP/1.1`.
    pub http_version: Option<String>,

    /// If the body is to be read from a local file, the path to that file
    /// (relative to the `.http` file).
    pub body_file: Option<PathBuf>,

    /// If a response redirect was given, the path of the file to write the
    /// response to (relative to the `.http` file).
    pub response_file: Option<PathBuf>,

    /// The inline request body, if provided, pre-templating.
    pub body: Option<Vec<u8>>,

    /// Request-scoped timeout, overrides the file's if set.
    pub timeout: Option<Duration>,

    /// Request-scoped connection timeout, overrides the file's if set.
    pub connection_timeout: Option<Duration>,

    /// Disable following redirects for this request.
    pub no_redirect: bool,
}

impl fmt::Display for HttpRequest {
    /// Renders the request back in `.http` syntax: separator and comment,
    /// directives in the leading comment block, the method line, sorted
    /// headers, then the body section.
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

        if let Some(timeout) = self.timeout {
            writeln!(f, "# @timeout = {}", format_duration(timeout))?;
        }

        if let Some(timeout) = self.connection_timeout {
            writeln!(f, "# @connection-timeout = {}", format_duration(timeout))?;
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

        // Separate the body section
        if self.body.is_some() || self.body_file.is_some() || self.response_file.is_some() {
            writeln!(f)?;
        }

        if let Some(path) = &self.body_file {
            writeln!(f, "< {}", path.display())?;
        }

        if let Some(body) = &self.body {
            writeln!(f, "{}", String::from_utf8_lossy(body))?;
        }

        if let Some(path) = &self.response_file {
            writeln!(f, "> {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_as_str() {
        assert_eq!(HttpMethod::GET.as_str(), "GET");
        assert_eq!(HttpMethod::POST.as_str(), "POST");
        assert_eq!(HttpMethod::DELETE.as_str(), "DELETE");
    }

    #[test]
    fn test_http_method_from_str() {
        assert_eq!(HttpMethod::from_str("GET"), Some(HttpMethod::GET));
        assert_eq!(HttpMethod::from_str("PATCH"), Some(HttpMethod::PATCH));

        // Methods are case-sensitive
        assert_eq!(HttpMethod::from_str("get"), None);
        assert_eq!(HttpMethod::from_str("Post"), None);
        assert_eq!(HttpMethod::from_str("INVALID"), None);
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(format!("{}", HttpMethod::GET), "GET");
        assert_eq!(format!("{}", HttpMethod::OPTIONS), "OPTIONS");
    }

    #[test]
    fn test_request_display_minimal() {
        let request = HttpRequest {
            name: "#1".to_string(),
            comment: Some("Hello".to_string()),
            method: HttpMethod::GET,
            url: "https://example.com/ping".to_string(),
            ..Default::default()
        };

        // Positional names are not rendered, they come back on re-parse
        let want = "### Hello\nGET https://example.com/ping\n";
        assert_eq!(request.to_string(), want);
    }

    #[test]
    fn test_request_display_full() {
        let mut request = HttpRequest {
            name: "CreateUser".to_string(),
            method: HttpMethod::POST,
            url: "https://api.example.com/users".to_string(),
            http_version: Some("HTTP/1.1".to_string()),
            body: Some(b"{\"name\": \"John\"}".to_vec()),
            response_file: Some(PathBuf::from("./response.json")),
            timeout: Some(Duration::from_secs(5)),
            no_redirect: true,
            ..Default::default()
        };
        request
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        request
            .headers
            .insert("Accept".to_string(), "application/json".to_string());

        let want = "###\n\
                    # @name = CreateUser\n\
                    # @timeout = 5s\n\
                    # @no-redirect\n\
                    POST https://api.example.com/users HTTP/1.1\n\
                    Accept: application/json\n\
                    Content-Type: application/json\n\
                    \n\
                    {\"name\": \"John\"}\n\
                    > ./response.json\n";
        assert_eq!(request.to_string(), want);
    }

    #[test]
    fn test_request_serialization() {
        let request = HttpRequest {
            name: "GetItem".to_string(),
            method: HttpMethod::GET,
            url: "https://api.example.com/items/1".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&request).unwrap();
        let back: HttpRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
