//! Template substitution for `{{ .Global.key }}` and `{{ .Local.key }}`
//! expressions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Matches a single `{{ … }}` template expression. Compiled once and reused
/// to avoid repeated regex compilation overhead.
static TEMPLATE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("template regex must compile"));

/// The two named scopes a template may reference.
///
/// `Global` holds file-level variables (plus answered global prompts),
/// `Local` request-level ones. During request resolution the scope is
/// passed by value, so local mutations never escape the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scope {
    /// Variables available to the entire file.
    pub global: HashMap<String, String>,

    /// Variables available only to a single request.
    pub local: HashMap<String, String>,
}

impl Scope {
    /// Creates an empty [`Scope`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a dotted template path, e.g. `.Global.base`.
    fn lookup(&self, path: &str) -> Option<&str> {
        if let Some(key) = path.strip_prefix(".Global.") {
            return self.global.get(key).map(String::as_str);
        }

        if let Some(key) = path.strip_prefix(".Local.") {
            return self.local.get(key).map(String::as_str);
        }

        None
    }
}

/// Errors raised during template substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{` opener with no matching `}}`.
    Unterminated,

    /// A template referenced a path not present in the scope.
    UnknownVariable {
        /// The full dotted path that failed to resolve.
        path: String,
    },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unterminated => write!(f, "unterminated template expression"),
            TemplateError::UnknownVariable { path } => {
                write!(f, "unknown variable {path:?}")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Substitutes every `{{ .Scope.key }}` expression in `text` with its value
/// from `scope`.
///
/// An unterminated opener is an error, as is a path that does not resolve.
/// The substituted result is also rejected if it reintroduces a template
/// opener, so no `{{` ever survives into resolved output.
pub fn substitute(text: &str, scope: &Scope) -> Result<String, TemplateError> {
    // Fast path: nothing templated
    if !text.contains("{{") {
        return Ok(text.to_string());
    }

    // Every opener must have a closer before the substitution pass
    let mut search = 0;
    while let Some(found) = text[search..].find("{{") {
        let open = search + found;
        match text[open + 2..].find("}}") {
            Some(close) => search = open + 2 + close + 2,
            None => return Err(TemplateError::Unterminated),
        }
    }

    let mut result = String::with_capacity(text.len());
    let mut last_match_end = 0;

    for capture in TEMPLATE_REGEX.captures_iter(text) {
        let full = capture.get(0).expect("capture group 0 always exists");
        let path = capture
            .get(1)
            .expect("capture group 1 always exists")
            .as_str()
            .trim();

        result.push_str(&text[last_match_end..full.start()]);

        let value = scope.lookup(path).ok_or_else(|| TemplateError::UnknownVariable {
            path: path.to_string(),
        })?;
        result.push_str(value);

        last_match_end = full.end();
    }

    result.push_str(&text[last_match_end..]);

    // Defend against values that smuggle template syntax back in
    if result.contains("{{") {
        return Err(TemplateError::Unterminated);
    }

    Ok(result)
}
