//! The set of lexical tokens for a `.http` file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a [`Token`].
///
/// The alphabet is closed: every token the scanner can emit is one of these
/// kinds. Methods and directive keywords get their own kinds so the parser
/// can dispatch on `kind` alone without re-reading source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// End of input. The final token of every successful scan.
    Eof,
    /// Scanning failed; a diagnostic has been reported to the sink.
    Error,
    /// A line comment introduced by `#` or `//`.
    Comment,
    /// Arbitrary text: variable values, header values, prompt descriptions.
    Text,
    /// A request URL or URL-valued variable.
    Url,
    /// A header name.
    Header,
    /// An inline request body.
    Body,
    /// An identifier, e.g. a variable name.
    Ident,
    /// The `###` request separator.
    Separator,
    /// The `@` introducing a directive.
    At,
    /// The optional `=` in a directive.
    Eq,
    /// The `:` between a header name and its value.
    Colon,
    /// The `<` introducing a file-sourced body.
    LeftAngle,
    /// The `>` introducing a response-file redirect.
    RightAngle,
    /// A `HTTP/<digit>(.<digit>)?` version marker.
    HttpVersion,

    /// The `GET` HTTP method.
    Get,
    /// The `HEAD` HTTP method.
    Head,
    /// The `POST` HTTP method.
    Post,
    /// The `PUT` HTTP method.
    Put,
    /// The `DELETE` HTTP method.
    Delete,
    /// The `CONNECT` HTTP method.
    Connect,
    /// The `PATCH` HTTP method.
    Patch,
    /// The `OPTIONS` HTTP method.
    Options,
    /// The `TRACE` HTTP method.
    Trace,

    /// The `name` directive keyword.
    Name,
    /// The `timeout` directive keyword.
    Timeout,
    /// The `connection-timeout` directive keyword.
    ConnectionTimeout,
    /// The `no-redirect` directive keyword.
    NoRedirect,
    /// The `prompt` directive keyword.
    Prompt,
}

impl TokenKind {
    /// Reports whether this kind is one of the nine HTTP methods.
    pub fn is_method(self) -> bool {
        matches!(
            self,
            TokenKind::Get
                | TokenKind::Head
                | TokenKind::Post
                | TokenKind::Put
                | TokenKind::Delete
                | TokenKind::Connect
                | TokenKind::Patch
                | TokenKind::Options
                | TokenKind::Trace
        )
    }

    /// Reports whether this kind is a reserved directive keyword.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Name
                | TokenKind::Timeout
                | TokenKind::ConnectionTimeout
                | TokenKind::NoRedirect
                | TokenKind::Prompt
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Eof => "EOF",
            TokenKind::Error => "Error",
            TokenKind::Comment => "Comment",
            TokenKind::Text => "Text",
            TokenKind::Url => "URL",
            TokenKind::Header => "Header",
            TokenKind::Body => "Body",
            TokenKind::Ident => "Ident",
            TokenKind::Separator => "Separator",
            TokenKind::At => "At",
            TokenKind::Eq => "Eq",
            TokenKind::Colon => "Colon",
            TokenKind::LeftAngle => "LeftAngle",
            TokenKind::RightAngle => "RightAngle",
            TokenKind::HttpVersion => "HTTPVersion",
            TokenKind::Get => "GET",
            TokenKind::Head => "HEAD",
            TokenKind::Post => "POST",
            TokenKind::Put => "PUT",
            TokenKind::Delete => "DELETE",
            TokenKind::Connect => "CONNECT",
            TokenKind::Patch => "PATCH",
            TokenKind::Options => "OPTIONS",
            TokenKind::Trace => "TRACE",
            TokenKind::Name => "Name",
            TokenKind::Timeout => "Timeout",
            TokenKind::ConnectionTimeout => "ConnectionTimeout",
            TokenKind::NoRedirect => "NoRedirect",
            TokenKind::Prompt => "Prompt",
        };

        write!(f, "{name}")
    }
}

/// Reports whether `text` spells an HTTP method, returning its kind if so.
///
/// Methods are case-sensitive: `get` is plain text, `GET` is a method.
pub fn method(text: &str) -> Option<TokenKind> {
    match text {
        "GET" => Some(TokenKind::Get),
        "HEAD" => Some(TokenKind::Head),
        "POST" => Some(TokenKind::Post),
        "PUT" => Some(TokenKind::Put),
        "DELETE" => Some(TokenKind::Delete),
        "CONNECT" => Some(TokenKind::Connect),
        "PATCH" => Some(TokenKind::Patch),
        "OPTIONS" => Some(TokenKind::Options),
        "TRACE" => Some(TokenKind::Trace),
        _ => None,
    }
}

/// Reports whether `text` spells a reserved directive keyword, returning its
/// kind if so.
pub fn keyword(text: &str) -> Option<TokenKind> {
    match text {
        "name" => Some(TokenKind::Name),
        "timeout" => Some(TokenKind::Timeout),
        "connection-timeout" => Some(TokenKind::ConnectionTimeout),
        "no-redirect" => Some(TokenKind::NoRedirect),
        "prompt" => Some(TokenKind::Prompt),
        _ => None,
    }
}

/// A lexical token in a `.http` file.
///
/// Tokens carry only a kind and byte offsets into the source buffer; the
/// token text is recovered by slicing, never copied at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token this is.
    pub kind: TokenKind,

    /// Byte offset from the start of the source to the start of this token.
    pub start: usize,

    /// Byte offset from the start of the source to the end of this token.
    pub end: usize,
}

impl Token {
    /// Reports whether the token is of the given kind.
    pub fn is(self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Token::{} start={}, end={}>", self.kind, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup() {
        let methods = [
            ("GET", TokenKind::Get),
            ("HEAD", TokenKind::Head),
            ("POST", TokenKind::Post),
            ("PUT", TokenKind::Put),
            ("DELETE", TokenKind::Delete),
            ("CONNECT", TokenKind::Connect),
            ("PATCH", TokenKind::Patch),
            ("OPTIONS", TokenKind::Options),
            ("TRACE", TokenKind::Trace),
        ];

        for (text, want) in methods {
            assert_eq!(method(text), Some(want), "method {text}");
            assert!(want.is_method());
        }
    }

    #[test]
    fn test_method_lookup_is_case_sensitive() {
        assert_eq!(method("get"), None);
        assert_eq!(method("Get"), None);
        assert_eq!(method("SOMETHING"), None);
    }

    #[test]
    fn test_keyword_lookup() {
        let keywords = [
            ("name", TokenKind::Name),
            ("timeout", TokenKind::Timeout),
            ("connection-timeout", TokenKind::ConnectionTimeout),
            ("no-redirect", TokenKind::NoRedirect),
            ("prompt", TokenKind::Prompt),
        ];

        for (text, want) in keywords {
            assert_eq!(keyword(text), Some(want), "keyword {text}");
            assert!(want.is_keyword());
        }

        assert_eq!(keyword("base"), None);
        assert_eq!(keyword("Timeout"), None);
    }

    #[test]
    fn test_classification_is_disjoint() {
        assert!(!TokenKind::Get.is_keyword());
        assert!(!TokenKind::Timeout.is_method());
        assert!(!TokenKind::Text.is_method());
        assert!(!TokenKind::Text.is_keyword());
    }

    #[test]
    fn test_token_display() {
        let token = Token {
            kind: TokenKind::Url,
            start: 4,
            end: 27,
        };

        assert_eq!(token.to_string(), "<Token::URL start=4, end=27>");
    }
}
