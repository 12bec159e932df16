//! HTTP request execution error types.

use std::fmt;

/// Errors that can occur while executing a resolved request.
#[derive(Debug)]
pub enum RequestError {
    /// A network-level failure: connection refused, DNS, broken transport.
    Network(String),

    /// The request exceeded its timeout.
    Timeout,

    /// The URL was rejected by the HTTP client.
    InvalidUrl(String),

    /// TLS handshake or certificate failure.
    Tls(String),

    /// The client or request could not be built.
    Build(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Network(msg) => write!(f, "network error: {msg}"),
            RequestError::Timeout => write!(f, "request timed out"),
            RequestError::InvalidUrl(url) => write!(f, "invalid URL: {url}"),
            RequestError::Tls(msg) => write!(f, "TLS error: {msg}"),
            RequestError::Build(msg) => write!(f, "could not build request: {msg}"),
        }
    }
}

impl std::error::Error for RequestError {}

/// Maps reqwest's error types onto our variants for consistent reporting.
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RequestError::Timeout;
        }

        if err.is_builder() {
            return RequestError::Build(err.to_string());
        }

        let message = err.to_string();
        if message.contains("certificate") || message.contains("TLS") || message.contains("SSL") {
            return RequestError::Tls(message);
        }

        RequestError::Network(message)
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RequestError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "network error: connection refused");

        assert_eq!(RequestError::Timeout.to_string(), "request timed out");

        let err = RequestError::Build("bad header value".to_string());
        assert_eq!(err.to_string(), "could not build request: bad header value");
    }

    #[test]
    fn test_from_url_error() {
        let parse_err = url::Url::parse("not absolute").unwrap_err();
        let err = RequestError::from(parse_err);
        assert!(matches!(err, RequestError::InvalidUrl(_)));
    }
}
