//! The `.http` file parser.
//!
//! The parser owns the scanner and assembles its token stream into a raw
//! [`HttpFile`], keeping a sliding two-token window (`current`, `next`).
//! Structural violations are reported to the installed
//! [`DiagnosticSink`] with precise positions; [`Parser::parse`] itself only
//! returns a summary [`ParseError`] so callers can branch on success.
//!
//! Error recovery is per-request: a faulty construct is reported and the
//! parser skips ahead to the next `###` separator, so one bad request does
//! not hide diagnostics in the rest of the file.

pub mod duration;
pub mod error;

use crate::diagnostics::{DiagnosticSink, Position};
use crate::models::{HttpFile, HttpMethod, HttpRequest, Prompt};
use crate::scanner::token::{Token, TokenKind};
use crate::scanner::Scanner;
use duration::parse_duration;
use error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{self, Read};
use std::time::Duration;
use url::Url;

/// Matches a `{{ … }}` template expression, for lax URL validation.
static TEMPLATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{[^{}]*\}\}").expect("template pattern must compile"));

/// The `.http` file parser.
pub struct Parser<'a> {
    sink: &'a dyn DiagnosticSink,
    scanner: Scanner<'a>,
    name: String,
    current: Token,
    next: Token,
    errors: usize,
}

impl<'a> Parser<'a> {
    /// Creates a [`Parser`] reading the entire source from `reader`.
    ///
    /// `.http` files are small; reading the whole thing up front keeps the
    /// scanner simple and the token offsets stable.
    pub fn new(
        name: impl Into<String>,
        mut reader: impl Read,
        sink: &'a dyn DiagnosticSink,
    ) -> io::Result<Self> {
        let mut src = Vec::new();
        reader.read_to_end(&mut src)?;

        Ok(Self::from_source(name, src, sink))
    }

    /// Creates a [`Parser`] over an in-memory source.
    pub fn from_source(
        name: impl Into<String>,
        source: impl Into<Vec<u8>>,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        let name = name.into();
        let scanner = Scanner::new(name.clone(), source, sink);

        let placeholder = Token {
            kind: TokenKind::Eof,
            start: 0,
            end: 0,
        };

        let mut parser = Self {
            sink,
            scanner,
            name,
            current: placeholder,
            next: placeholder,
            errors: 0,
        };

        // Read two tokens so current and next are both populated
        parser.advance();
        parser.advance();

        parser
    }

    /// Parses the file to completion.
    ///
    /// The returned error is only a summary; the full detail went to the
    /// sink as each problem was found.
    pub fn parse(&mut self) -> Result<HttpFile, ParseError> {
        let mut file = HttpFile::new(self.name.clone());

        // Any global directives at the top of the file
        self.parse_globals(&mut file);

        while !self.current.is(TokenKind::Eof) {
            if self.current.is(TokenKind::Error) {
                // The scanner has already reported the detail and halted
                return Err(self.summary());
            }

            let index = file.requests.len();
            match self.parse_request() {
                Some(mut request) => {
                    // A request without an explicit @name is named after its
                    // 1-indexed position in the file
                    if request.name.is_empty() {
                        request.name = format!("#{}", index + 1);
                    }

                    if file.requests.iter().any(|r| r.name == request.name) {
                        self.error(&format!("duplicate request name: {:?}", request.name));
                    }

                    file.requests.push(request);
                    self.advance();
                }
                None => self.synchronize(),
            }
        }

        if self.errors > 0 {
            return Err(self.summary());
        }

        Ok(file)
    }

    /// The summary error for this parse.
    fn summary(&self) -> ParseError {
        ParseError {
            name: self.name.clone(),
            errors: self.errors.max(1),
        }
    }

    /// Advances the parser by a single token.
    fn advance(&mut self) {
        self.current = self.next;
        self.next = self.scanner.scan();
    }

    /// Skips tokens until the next request separator or the end of input, a
    /// natural recovery point after a parse error.
    fn synchronize(&mut self) {
        while !self.current.is(TokenKind::Separator)
            && !self.current.is(TokenKind::Eof)
            && !self.current.is(TokenKind::Error)
        {
            self.advance();
        }
    }

    /// Asserts that the next token is of the given kind, advancing over it
    /// if so and reporting a syntax error if not.
    fn expect(&mut self, kind: TokenKind) {
        if self.next.is(TokenKind::Error) {
            // The scanner has already reported this one
            return;
        }

        if !self.next.is(kind) {
            self.error(&format!("expected {kind}, got {}", self.next.kind));
            return;
        }

        self.advance();
    }

    /// As [`Parser::expect`] but accepts any one of `kinds`.
    fn expect_one_of(&mut self, kinds: &[TokenKind]) {
        if self.next.is(TokenKind::Error) {
            return;
        }

        if !kinds.iter().any(|&kind| self.next.is(kind)) {
            let wanted: Vec<String> = kinds.iter().map(ToString::to_string).collect();
            self.error(&format!(
                "expected one of [{}], got {}",
                wanted.join(", "),
                self.next.kind
            ));
            return;
        }

        self.advance();
    }

    /// The parser's current position in the input, derived from the byte
    /// offset of the current token by counting newlines.
    ///
    /// When the next token is EOF the position anchors to the end of the
    /// current token: the error is likely "unexpected end of input" and
    /// should point at where something should have gone.
    fn position(&self) -> Position {
        let src = self.scanner.source();

        let mut line = 1;
        let mut last_newline_offset = 0;
        for (index, byte) in src.iter().enumerate() {
            if index >= self.current.start {
                break;
            }
            if *byte == b'\n' {
                last_newline_offset = index + 1;
                line += 1;
            }
        }

        let start = if self.next.is(TokenKind::Eof) {
            self.current.end
        } else {
            self.current.start
        };

        Position {
            name: self.name.clone(),
            offset: self.current.start,
            line,
            start_col: 1 + start - last_newline_offset,
            end_col: 1 + self.current.end - last_newline_offset,
        }
    }

    /// Reports a parse error to the sink at the current position.
    fn error(&mut self, message: &str) {
        self.errors += 1;
        self.sink.report(self.position(), message);
    }

    /// The source text of the current token, whitespace trimmed.
    fn text(&self) -> String {
        let slice = &self.scanner.source()[self.current.start..self.current.end];
        String::from_utf8_lossy(slice).trim().to_string()
    }

    /// The source bytes of the current token, whitespace trimmed.
    fn body_bytes(&self) -> Vec<u8> {
        let slice = &self.scanner.source()[self.current.start..self.current.end];
        let start = slice
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(slice.len());
        let end = slice
            .iter()
            .rposition(|b| !b.is_ascii_whitespace())
            .map_or(start, |i| i + 1);
        slice[start..end].to_vec()
    }

    /// Parses the run of `@…` directives at the top of the file.
    fn parse_globals(&mut self, file: &mut HttpFile) {
        while self.current.is(TokenKind::At) {
            match self.next.kind {
                TokenKind::Timeout => file.timeout = self.parse_duration_directive(),
                TokenKind::ConnectionTimeout => {
                    file.connection_timeout = self.parse_duration_directive();
                }
                TokenKind::NoRedirect => {
                    self.advance();
                    file.no_redirect = true;
                }
                TokenKind::Name => file.name = self.parse_name(),
                TokenKind::Prompt => {
                    let prompt = self.parse_prompt();
                    file.prompts.push(prompt);
                }
                TokenKind::Ident => {
                    let (key, value) = self.parse_var();
                    file.vars.insert(key, value);
                }
                _ => self.expect_one_of(&[
                    TokenKind::Timeout,
                    TokenKind::ConnectionTimeout,
                    TokenKind::NoRedirect,
                    TokenKind::Name,
                    TokenKind::Prompt,
                    TokenKind::Ident,
                ]),
            }

            self.advance();
        }
    }

    /// Parses a single request. Returns `None` if the request is malformed,
    /// in which case a diagnostic has been reported and the caller should
    /// synchronise to the next separator.
    fn parse_request(&mut self) -> Option<HttpRequest> {
        if !self.current.is(TokenKind::Separator) {
            let found = self.current.kind;
            self.error(&format!("expected {}, got {found}", TokenKind::Separator));
            return None;
        }

        let mut request = HttpRequest::default();

        // Text on the separator line is the request's comment
        if self.next.is(TokenKind::Comment) {
            self.advance();
            request.comment = Some(self.text());
        }

        self.advance();
        self.parse_request_directives(&mut request);

        if !self.current.kind.is_method() {
            let found = self.current.kind;
            let text = self.text();
            self.error(&format!(
                "request separators must be followed by either a comment or a HTTP method, got {found}: {text:?}"
            ));
            return None;
        }

        // The scanner only emits method kinds for the nine method literals
        request.method = method_for(self.current.kind)?;

        self.expect(TokenKind::Url);
        let url = self.text();
        self.validate_url(&url);
        request.url = url;

        if self.next.is(TokenKind::HttpVersion) {
            self.advance();
            request.http_version = Some(self.text());
        }

        while self.next.is(TokenKind::Header) {
            self.advance();
            let name = self.text();
            self.expect(TokenKind::Colon);
            self.expect(TokenKind::Text);
            let value = self.text();
            request.headers.insert(name, value);
        }

        // An inline body?
        if self.next.is(TokenKind::Body) {
            self.advance();
            let body = self.body_bytes();
            if !body.is_empty() {
                request.body = Some(body);
            }
        }

        // Or one read from a file, e.g. '< ./body.json'
        if self.next.is(TokenKind::LeftAngle) {
            self.advance();
            if request.body.is_some() {
                self.error("cannot have both an inline body and an input body file");
                self.expect(TokenKind::Text);
            } else {
                self.expect(TokenKind::Text);
                request.body_file = Some(self.text().into());
            }
        }

        // Either form may redirect the response, e.g. '> ./response.json'
        if self.next.is(TokenKind::RightAngle) {
            self.advance();
            self.expect(TokenKind::Text);
            request.response_file = Some(self.text().into());
        }

        Some(request)
    }

    /// Parses the run of `@…` directives between a request's separator and
    /// its method line.
    fn parse_request_directives(&mut self, request: &mut HttpRequest) {
        while self.current.is(TokenKind::At) {
            match self.next.kind {
                TokenKind::Timeout => request.timeout = self.parse_duration_directive(),
                TokenKind::ConnectionTimeout => {
                    request.connection_timeout = self.parse_duration_directive();
                }
                TokenKind::NoRedirect => {
                    self.advance();
                    request.no_redirect = true;
                }
                TokenKind::Name => request.name = self.parse_name(),
                TokenKind::Prompt => {
                    let prompt = self.parse_prompt();
                    request.prompts.push(prompt);
                }
                TokenKind::Ident => {
                    let (key, value) = self.parse_var();
                    request.vars.insert(key, value);
                }
                _ => self.expect_one_of(&[
                    TokenKind::Timeout,
                    TokenKind::ConnectionTimeout,
                    TokenKind::NoRedirect,
                    TokenKind::Name,
                    TokenKind::Prompt,
                    TokenKind::Ident,
                ]),
            }

            self.advance();
        }
    }

    /// Parses a `@timeout [=] <value>` style directive. A bad value is
    /// reported and the directive ignored; parsing continues.
    fn parse_duration_directive(&mut self) -> Option<Duration> {
        self.advance();
        // Either @timeout = 20s or @timeout 20s
        if self.next.is(TokenKind::Eq) {
            self.advance();
        }

        self.expect(TokenKind::Text);

        match parse_duration(&self.text()) {
            Ok(duration) => Some(duration),
            Err(err) => {
                self.error(&format!("bad timeout value: {err}"));
                None
            }
        }
    }

    /// Parses a `@name [=] <value>` directive.
    fn parse_name(&mut self) -> String {
        self.advance();
        // Either @name = MyName or @name MyName
        if self.next.is(TokenKind::Eq) {
            self.advance();
        }

        self.expect(TokenKind::Text);

        self.text()
    }

    /// Parses a `@prompt <ident> [description]` directive.
    fn parse_prompt(&mut self) -> Prompt {
        self.advance();

        self.expect(TokenKind::Ident);
        let name = self.text();

        let description = if self.next.is(TokenKind::Text) {
            self.advance();
            Some(self.text())
        } else {
            None
        };

        Prompt { name, description }
    }

    /// Parses a generic `@ident [=] <value>` in either scope.
    fn parse_var(&mut self) -> (String, String) {
        self.advance();
        let key = self.text();

        // Either @ident = value or @ident value
        if self.next.is(TokenKind::Eq) {
            self.advance();
        }

        self.expect_one_of(&[TokenKind::Url, TokenKind::Text]);

        if self.current.is(TokenKind::Url) {
            let url = self.text();
            self.validate_url(&url);
        }

        (key, self.text())
    }

    /// Validates a possibly-templated URL on a best effort basis.
    ///
    /// A URL containing `{{` is a partial template: each template expression
    /// is replaced with a placeholder and the result need only parse as
    /// *some* URL. A concrete URL must parse as an absolute request URI.
    fn validate_url(&mut self, raw: &str) {
        if raw.contains("{{") {
            let concrete = TEMPLATE_PATTERN.replace_all(raw, "template");
            if let Err(err) = Url::parse(&concrete) {
                // The template may stand in for the scheme and host, in
                // which case the placeholder renders the URL relative
                if err != url::ParseError::RelativeUrlWithoutBase {
                    self.error(&format!("invalid URL: {err}"));
                }
            }
        } else if let Err(err) = Url::parse(raw) {
            self.error(&format!("invalid URL: {err}"));
        }
    }
}

/// Maps a method token kind to its [`HttpMethod`].
fn method_for(kind: TokenKind) -> Option<HttpMethod> {
    match kind {
        TokenKind::Get => Some(HttpMethod::GET),
        TokenKind::Head => Some(HttpMethod::HEAD),
        TokenKind::Post => Some(HttpMethod::POST),
        TokenKind::Put => Some(HttpMethod::PUT),
        TokenKind::Delete => Some(HttpMethod::DELETE),
        TokenKind::Connect => Some(HttpMethod::CONNECT),
        TokenKind::Patch => Some(HttpMethod::PATCH),
        TokenKind::Options => Some(HttpMethod::OPTIONS),
        TokenKind::Trace => Some(HttpMethod::TRACE),
        _ => None,
    }
}
