//! Error types for resolution.

use crate::resolver::template::TemplateError;
use std::fmt;

/// Errors that can occur while resolving a raw file into a concrete
/// request plan.
///
/// Unlike scanner and parser problems, which go to the diagnostic sink,
/// resolution errors are returned as values: by the time the resolver runs
/// the file is syntactically sound and the problem is semantic. Every
/// variant names the request it occurred in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A template referenced a variable not present in its scope.
    UnknownVariable {
        /// Name of the request being resolved.
        request: String,
        /// What was being substituted, e.g. `URL` or `header Accept`.
        context: String,
        /// The dotted path that failed to resolve.
        path: String,
    },

    /// A `{{` opener with no matching `}}`, or a substitution that
    /// reintroduced one.
    UnterminatedTemplate {
        /// Name of the request being resolved.
        request: String,
        /// What was being substituted.
        context: String,
    },

    /// The URL did not parse as an absolute request URI after substitution.
    InvalidUrl {
        /// Name of the request being resolved.
        request: String,
        /// The offending URL.
        url: String,
        /// Why it failed to parse.
        reason: String,
    },
}

impl ResolveError {
    /// Builds the matching [`ResolveError`] for a template failure.
    pub(crate) fn from_template(err: TemplateError, request: &str, context: &str) -> Self {
        match err {
            TemplateError::Unterminated => ResolveError::UnterminatedTemplate {
                request: request.to_string(),
                context: context.to_string(),
            },
            TemplateError::UnknownVariable { path } => ResolveError::UnknownVariable {
                request: request.to_string(),
                context: context.to_string(),
                path,
            },
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownVariable {
                request,
                context,
                path,
            } => {
                write!(
                    f,
                    "could not resolve request {request}: unknown variable {path:?} in {context}"
                )
            }
            ResolveError::UnterminatedTemplate { request, context } => {
                write!(
                    f,
                    "could not resolve request {request}: unterminated template expression in {context}"
                )
            }
            ResolveError::InvalidUrl {
                request,
                url,
                reason,
            } => {
                write!(f, "invalid URL {url:?} for request {request}: {reason}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_unknown_variable() {
        let err = ResolveError::UnknownVariable {
            request: "GetItem".to_string(),
            context: "URL".to_string(),
            path: ".Global.missing".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "could not resolve request GetItem: unknown variable \".Global.missing\" in URL"
        );
    }

    #[test]
    fn test_display_invalid_url() {
        let err = ResolveError::InvalidUrl {
            request: "#1".to_string(),
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "invalid URL \"nope\" for request #1: relative URL without a base"
        );
    }

    #[test]
    fn test_from_template() {
        let err = ResolveError::from_template(
            TemplateError::UnknownVariable {
                path: ".Local.x".to_string(),
            },
            "#1",
            "body",
        );

        assert_eq!(
            err,
            ResolveError::UnknownVariable {
                request: "#1".to_string(),
                context: "body".to_string(),
                path: ".Local.x".to_string(),
            }
        );
    }
}
