//! Resolution of a raw [`HttpFile`] into a concrete request plan.
//!
//! The resolver is a pure function over the parsed tree: it performs
//! variable interpolation, validates every URL strictly, applies default
//! timeouts, and copies prompts through. It does no I/O and reports no
//! diagnostics; by this stage the file is syntactically sound, so problems
//! are semantic and come back as [`ResolveError`] values.

pub mod error;
pub mod template;

pub use error::ResolveError;

use crate::models::resolved::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_TIMEOUT};
use crate::models::{HttpFile, HttpRequest, Prompt, ResolvedFile, ResolvedRequest};
use std::time::Duration;
use template::{substitute, Scope};
use url::Url;

/// A provider of answers to `@prompt` declarations, consulted during
/// resolution.
///
/// Answered global prompts are injected into the `Global` scope and
/// answered request prompts into the `Local` scope before substitution.
/// Prompts themselves are copied into the resolved output untouched, so a
/// caller can collect answers and resolve again.
pub trait PromptAnswers {
    /// The answer for `prompt`, or `None` to leave it unanswered.
    fn answer(&self, prompt: &Prompt) -> Option<String>;
}

/// The default provider: answers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAnswers;

impl PromptAnswers for NoAnswers {
    fn answer(&self, _prompt: &Prompt) -> Option<String> {
        None
    }
}

impl PromptAnswers for std::collections::HashMap<String, String> {
    fn answer(&self, prompt: &Prompt) -> Option<String> {
        self.get(&prompt.name).cloned()
    }
}

/// Resolves a raw [`HttpFile`] into a [`ResolvedFile`], leaving every
/// prompt unanswered.
pub fn resolve_file(file: &HttpFile) -> Result<ResolvedFile, ResolveError> {
    resolve_file_with(file, &NoAnswers)
}

/// Resolves a raw [`HttpFile`] into a [`ResolvedFile`], consulting
/// `answers` for prompt values.
///
/// Requests are resolved independently, in file order. Each gets its own
/// copy of the global scope, so request-local variables never leak between
/// requests. The first failure aborts resolution of the whole file.
pub fn resolve_file_with(
    file: &HttpFile,
    answers: &dyn PromptAnswers,
) -> Result<ResolvedFile, ResolveError> {
    let mut scope = Scope::new();
    scope.global = file.vars.clone();

    // Global variable values are concrete at the syntax level, so the scope
    // is fully populated once answered prompts are added
    for prompt in &file.prompts {
        if let Some(value) = answers.answer(prompt) {
            scope.global.insert(prompt.name.clone(), value);
        }
    }

    let mut requests = Vec::with_capacity(file.requests.len());
    for request in &file.requests {
        requests.push(resolve_request(request, scope.clone(), answers)?);
    }

    Ok(ResolvedFile {
        name: file.name.clone(),
        vars: scope.global,
        prompts: file.prompts.clone(),
        requests,
        timeout: or_default(file.timeout, DEFAULT_TIMEOUT),
        connection_timeout: or_default(file.connection_timeout, DEFAULT_CONNECTION_TIMEOUT),
        no_redirect: file.no_redirect,
    })
}

/// Resolves a single request against a scope.
///
/// `scope` is taken by value deliberately: local variables are added to the
/// copy, giving each request isolation for free.
fn resolve_request(
    request: &HttpRequest,
    mut scope: Scope,
    answers: &dyn PromptAnswers,
) -> Result<ResolvedRequest, ResolveError> {
    let name = &request.name;

    for prompt in &request.prompts {
        if let Some(value) = answers.answer(prompt) {
            scope.local.insert(prompt.name.clone(), value);
        }
    }

    // Variables first, in sorted key order for determinism: each may
    // reference the globals and any local resolved before it
    let mut keys: Vec<&String> = request.vars.keys().collect();
    keys.sort();
    for key in keys {
        let value = substitute(&request.vars[key], &scope)
            .map_err(|e| ResolveError::from_template(e, name, &format!("var {key}")))?;
        scope.local.insert(key.clone(), value);
    }

    // Then headers
    let mut headers = std::collections::HashMap::with_capacity(request.headers.len());
    for (key, value) in &request.headers {
        let value = substitute(value, &scope)
            .map_err(|e| ResolveError::from_template(e, name, &format!("header {key}")))?;
        headers.insert(key.clone(), value);
    }

    // Then the URL, which must come out the other side absolute
    let url = substitute(&request.url, &scope)
        .map_err(|e| ResolveError::from_template(e, name, "URL"))?;
    Url::parse(&url).map_err(|e| ResolveError::InvalidUrl {
        request: name.clone(),
        url: url.clone(),
        reason: e.to_string(),
    })?;

    // And finally the body
    let body = match &request.body {
        Some(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            substitute(&text, &scope)
                .map_err(|e| ResolveError::from_template(e, name, "body"))?
                .into_bytes()
        }
        None => Vec::new(),
    };

    Ok(ResolvedRequest {
        vars: scope.local,
        headers,
        prompts: request.prompts.clone(),
        name: name.clone(),
        comment: request.comment.clone(),
        method: request.method,
        url,
        http_version: request.http_version.clone(),
        body_file: request.body_file.clone(),
        response_file: request.response_file.clone(),
        body,
        timeout: or_default(request.timeout, DEFAULT_TIMEOUT),
        connection_timeout: or_default(request.connection_timeout, DEFAULT_CONNECTION_TIMEOUT),
        no_redirect: request.no_redirect,
    })
}

/// An unset or zero duration resolves to the default; timeouts are always
/// non-zero after resolution.
fn or_default(duration: Option<Duration>, default: Duration) -> Duration {
    match duration {
        Some(duration) if !duration.is_zero() => duration,
        _ => default,
    }
}
