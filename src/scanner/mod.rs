//! Lexical scanner for `.http` files, reading raw source text and emitting a
//! stream of tokens.
//!
//! Unlike a general purpose programming language, `.http` syntax is very
//! context dependent and there is not much punctuation to distinguish one
//! construct from another: a header name looks exactly like a bare
//! identifier, a URL begins where a method ends on the same line, and a body
//! simply runs until the next top-level marker. Because of this the scanner
//! is context sensitive and only emits categorical tokens (URL, Header,
//! Body) in the states where the grammar admits them. That adds complexity
//! here but removes it from the parser.
//!
//! Whitespace is significant in the upstream `.http` design but is entirely
//! ignored at token boundaries in this implementation, which makes the
//! scanner robust against formatting discrepancies. Line counting happens
//! for diagnostics only.

pub mod token;

use crate::diagnostics::{DiagnosticSink, Position};
use token::{Token, TokenKind};

/// The states of the scanning state machine, named by the next expected
/// structural element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Hash,
    Slash,
    Comment,
    Separator,
    At,
    Ident,
    Prompt,
    Eq,
    Text,
    Url,
    HttpVersion,
    Headers,
    Body,
    LeftAngle,
    RightAngle,
}

/// The `.http` file scanner.
///
/// Construct with [`Scanner::new`], then call [`Scanner::scan`] for the next
/// token or [`Scanner::all`] for the whole stream. After the terminating
/// [`TokenKind::Eof`] or [`TokenKind::Error`] has been yielded, further
/// calls return `Eof`.
///
/// The scanner owns the source buffer for the duration of the pipeline;
/// tokens hold byte offsets into it, never copies.
pub struct Scanner<'a> {
    sink: &'a dyn DiagnosticSink,
    name: String,
    src: Vec<u8>,
    start: usize,
    pos: usize,
    line: usize,
    line_offset: usize,
    pending: std::collections::VecDeque<Token>,
    state: Option<State>,
}

impl<'a> Scanner<'a> {
    /// Creates a new [`Scanner`] over `source`.
    ///
    /// `name` is used in diagnostic positions only. A UTF-8 byte order mark
    /// at offset zero is skipped.
    pub fn new(name: impl Into<String>, source: impl Into<Vec<u8>>, sink: &'a dyn DiagnosticSink) -> Self {
        let src = source.into();
        let start = if src.starts_with(&[0xEF, 0xBB, 0xBF]) { 3 } else { 0 };

        Self {
            sink,
            name: name.into(),
            src,
            start,
            pos: start,
            line: 1,
            line_offset: start,
            pending: std::collections::VecDeque::new(),
            state: Some(State::Start),
        }
    }

    /// The name given at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw source buffer the scanner owns. Token offsets index into it.
    pub fn source(&self) -> &[u8] {
        &self.src
    }

    /// Returns the next token.
    ///
    /// Once the scanner has emitted [`TokenKind::Eof`] or
    /// [`TokenKind::Error`] every subsequent call returns `Eof`.
    pub fn scan(&mut self) -> Token {
        loop {
            if let Some(tok) = self.pending.pop_front() {
                return tok;
            }

            match self.state.take() {
                None => {
                    return Token {
                        kind: TokenKind::Eof,
                        start: self.pos,
                        end: self.pos,
                    }
                }
                Some(state) => self.state = self.step(state),
            }
        }
    }

    /// Returns an iterator over the tokens in the file, stopping at `Eof` or
    /// `Error`. The terminal token is still yielded.
    pub fn all(&mut self) -> impl Iterator<Item = Token> + use<'_, 'a> {
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let tok = self.scan();
            if tok.is(TokenKind::Eof) || tok.is(TokenKind::Error) {
                done = true;
            }
            Some(tok)
        })
    }

    /// Decodes the UTF-8 character starting at `pos`, returning the
    /// character and its width in bytes. Invalid bytes decode to
    /// [`char::REPLACEMENT_CHARACTER`] with width 1, which the `Start` state
    /// reports as an error.
    fn decode_at(&self, pos: usize) -> Option<(char, usize)> {
        let byte = *self.src.get(pos)?;
        if byte < 0x80 {
            return Some((byte as char, 1));
        }

        let end = (pos + 4).min(self.src.len());
        let window = &self.src[pos..end];
        let valid = match std::str::from_utf8(window) {
            Ok(s) => s,
            Err(e) if e.valid_up_to() > 0 => {
                // A later character was cut short or invalid, the first is fine
                match std::str::from_utf8(&window[..e.valid_up_to()]) {
                    Ok(s) => s,
                    Err(_) => return Some((char::REPLACEMENT_CHARACTER, 1)),
                }
            }
            Err(_) => return Some((char::REPLACEMENT_CHARACTER, 1)),
        };

        let first = valid.chars().next()?;
        Some((first, first.len_utf8()))
    }

    /// Returns the next character without advancing the scanner.
    fn peek(&self) -> Option<char> {
        self.decode_at(self.pos).map(|(c, _)| c)
    }

    /// Returns the next character and advances the scanner over it, keeping
    /// the line bookkeeping up to date.
    fn next(&mut self) -> Option<char> {
        let (c, width) = self.decode_at(self.pos)?;
        self.pos += width;

        if c == '\n' {
            self.line += 1;
            self.line_offset = self.pos;
        }

        Some(c)
    }

    /// Reports whether the unscanned remainder of the source begins with
    /// `prefix`.
    fn rest_starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix.as_bytes())
    }

    /// Ignores characters for which `predicate` holds, then brings the token
    /// start position up to the current position, discarding everything
    /// travelled over.
    fn skip(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.next();
        }
        self.start = self.pos;
    }

    /// Consumes characters so long as `predicate` holds.
    fn take_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.next();
        }
    }

    /// Consumes characters until one of `stops` (or the end of input) is
    /// next. The stopping character itself is not consumed.
    fn take_until(&mut self, stops: &[char]) {
        while let Some(c) = self.peek() {
            if stops.contains(&c) {
                return;
            }
            self.next();
        }
    }

    /// The source text between the current token start and the scanner
    /// position.
    fn pending_text(&self) -> &str {
        std::str::from_utf8(&self.src[self.start..self.pos]).unwrap_or_default()
    }

    /// Queues a token of the given kind covering the pending source range,
    /// then resets the token start position.
    fn emit(&mut self, kind: TokenKind) {
        self.pending.push_back(Token {
            kind,
            start: self.start,
            end: self.pos,
        });
        self.start = self.pos;
    }

    /// Emits an [`TokenKind::Error`] token and reports `message` to the sink
    /// with the current position. The scanner halts afterwards.
    fn error(&mut self, message: &str) {
        // Emit first so that even without a sink installed the consumer
        // knows something went wrong
        self.emit(TokenKind::Error);

        let position = Position {
            name: self.name.clone(),
            offset: self.pos,
            line: self.line,
            start_col: 1 + self.start - self.line_offset,
            end_col: 1 + self.pos - self.line_offset,
        };

        self.sink.report(position, message);
    }

    /// Runs one state of the machine, returning the next state or `None`
    /// when scanning is complete.
    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Start => self.scan_start(),
            State::Hash => self.scan_hash(),
            State::Slash => self.scan_slash(),
            State::Comment => self.scan_comment(),
            State::Separator => self.scan_separator(),
            State::At => self.scan_at(),
            State::Ident => self.scan_ident(),
            State::Prompt => self.scan_prompt(),
            State::Eq => self.scan_eq(),
            State::Text => self.scan_text(),
            State::Url => self.scan_url(),
            State::HttpVersion => self.scan_http_version(),
            State::Headers => self.scan_headers(),
            State::Body => self.scan_body(),
            State::LeftAngle => self.scan_left_angle(),
            State::RightAngle => self.scan_right_angle(),
        }
    }

    /// The initial state. At the top level a valid file can only contain
    /// `#` (comments and separators), `/` (comments), `@` (global
    /// directives), and identifier text. Whitespace is skipped.
    fn scan_start(&mut self) -> Option<State> {
        self.skip(char::is_whitespace);

        match self.next() {
            None => {
                self.emit(TokenKind::Eof);
                None
            }
            Some(c) if c == char::REPLACEMENT_CHARACTER => {
                self.error("invalid utf8 character");
                None
            }
            Some('#') => Some(State::Hash),
            Some('/') => Some(State::Slash),
            Some('@') => Some(State::At),
            Some(c) if is_ident(c) => Some(State::Text),
            Some(c) => {
                self.error(&format!("unrecognised character: {c:?}"));
                None
            }
        }
    }

    /// A `#`: either the start of a `###` separator or a comment.
    fn scan_hash(&mut self) -> Option<State> {
        if self.peek() == Some('#') {
            Some(State::Separator)
        } else {
            Some(State::Comment)
        }
    }

    /// A `/`: only `//` opens a comment, a lone slash is silently consumed.
    fn scan_slash(&mut self) -> Option<State> {
        if self.peek() != Some('/') {
            self.next();
            return Some(State::Start);
        }

        self.next();
        Some(State::Comment)
    }

    /// A line comment, the opening marker already consumed. A comment whose
    /// first non-space character is `@` carries a request-scoped directive.
    fn scan_comment(&mut self) -> Option<State> {
        self.skip(is_line_space);

        if self.peek() == Some('@') {
            self.next();
            return Some(State::At);
        }

        self.take_until(&['\n']);
        self.emit(TokenKind::Comment);

        Some(State::Start)
    }

    /// The `###` request separator, one `#` already consumed. Text on the
    /// rest of the line is the request's human-readable comment.
    fn scan_separator(&mut self) -> Option<State> {
        let mut count = 0;
        while self.peek() == Some('#') {
            count += 1;
            self.next();
            if count == 2 {
                break;
            }
        }

        self.emit(TokenKind::Separator);
        self.skip(is_line_space);

        if self.peek() != Some('\n') && self.peek().is_some() {
            return Some(State::Comment);
        }

        Some(State::Start)
    }

    /// An `@`, used to declare a directive either globally at the top level
    /// or request scoped inside a comment.
    fn scan_at(&mut self) -> Option<State> {
        self.emit(TokenKind::At);

        if self.rest_starts_with("http") {
            return Some(State::Url);
        }

        if self.peek().is_some_and(is_alpha) {
            return Some(State::Ident);
        }

        Some(State::Start)
    }

    /// A continuous run of identifier characters, classified against the
    /// directive keywords.
    fn scan_ident(&mut self) -> Option<State> {
        self.take_while(is_ident);

        let kind = token::keyword(self.pending_text()).unwrap_or(TokenKind::Ident);
        self.emit(kind);
        self.skip(is_line_space);

        if kind == TokenKind::Prompt {
            return Some(State::Prompt);
        }

        match self.peek() {
            Some('=') => Some(State::Eq),
            Some(c) if is_alphanumeric(c) => Some(State::Text),
            _ => Some(State::Start),
        }
    }

    /// A prompt declaration, e.g. `@prompt username [description]`. The
    /// `@prompt` has already been emitted; next is the variable name,
    /// optionally followed by free text on the same line.
    fn scan_prompt(&mut self) -> Option<State> {
        self.take_while(is_ident);
        self.emit(TokenKind::Ident);

        self.skip(is_line_space);

        if self.peek().is_some_and(is_alphanumeric) {
            self.take_until(&['\n']);
            self.emit(TokenKind::Text);
        }

        Some(State::Start)
    }

    /// An `=` in a directive.
    fn scan_eq(&mut self) -> Option<State> {
        self.next();
        self.emit(TokenKind::Eq);

        self.skip(is_line_space);

        if self.rest_starts_with("http") {
            return Some(State::Url);
        }

        if self.peek().is_some_and(is_alphanumeric) {
            return Some(State::Text);
        }

        Some(State::Start)
    }

    /// A continuous run of non-space text, promoted to a method token if it
    /// spells an HTTP method verbatim.
    fn scan_text(&mut self) -> Option<State> {
        self.take_while(is_text);

        let kind = token::method(self.pending_text());
        self.emit(kind.unwrap_or(TokenKind::Text));
        self.skip(is_line_space);

        if kind.is_some() {
            // A method must be followed by a URL
            return Some(State::Url);
        }

        Some(State::Start)
    }

    /// A URL, after a method or an `@… =` binding. Must begin with `http`
    /// or a `{{` template opener. Whitespace inside `{{ … }}` belongs to
    /// the URL; otherwise the URL ends at the first whitespace.
    fn scan_url(&mut self) -> Option<State> {
        if !self.rest_starts_with("http") && !self.rest_starts_with("{{") {
            self.error("HTTP methods must be followed by a valid URL");
            return None;
        }

        loop {
            if self.rest_starts_with("{{") {
                self.next();
                self.next();
                // Template expressions may contain spaces, consume through
                // the closing braces but never past the end of the line
                while !self.rest_starts_with("}}") {
                    match self.peek() {
                        None | Some('\n') => break,
                        Some(_) => {
                            self.next();
                        }
                    }
                }
                if self.rest_starts_with("}}") {
                    self.next();
                    self.next();
                }
                continue;
            }

            match self.peek() {
                Some(c) if is_text(c) => {
                    self.next();
                }
                _ => break,
            }
        }

        self.emit(TokenKind::Url);

        // Does it have a HTTP version after it?
        self.skip(is_line_space);
        if self.rest_starts_with("HTTP/") {
            return Some(State::HttpVersion);
        }

        // Is the next thing headers?
        self.skip(char::is_whitespace);
        if self.peek().is_some_and(is_alpha) {
            return Some(State::Headers);
        }

        // Either another request or the end
        if self.peek() == Some('#') || self.peek().is_none() {
            return Some(State::Start);
        }

        Some(State::Body)
    }

    /// A `HTTP/<digits>` version literal with at most one `.` in the digit
    /// run, e.g. `HTTP/1.1` or `HTTP/2`.
    fn scan_http_version(&mut self) -> Option<State> {
        for _ in 0.."HTTP/".len() {
            self.next();
        }

        while self.peek().is_some_and(is_digit) {
            self.next();

            if self.peek() == Some('.') {
                self.next();
                // What follows the '.' must be a digit or it's malformed
                if !self.peek().is_some_and(is_digit) {
                    let found = self.peek().map_or("eof".to_string(), |c| format!("{c:?}"));
                    self.error(&format!("bad number literal in HTTP version, illegal char {found}"));
                    return None;
                }
                self.take_while(is_digit);
            }
        }

        self.emit(TokenKind::HttpVersion);

        // Only headers or a body may follow a HTTP version
        self.skip(char::is_whitespace);
        if self.peek().is_some_and(is_alpha) {
            return Some(State::Headers);
        }

        if self.peek() == Some('#') || self.peek().is_none() {
            return Some(State::Start);
        }

        Some(State::Body)
    }

    /// A run of HTTP headers, one `Name: value` per line.
    fn scan_headers(&mut self) -> Option<State> {
        self.take_while(is_ident);

        // A header without its colon and value is unfinished, much like an
        // unterminated string literal
        if self.peek().is_none() {
            self.error("unexpected eof");
            return None;
        }

        self.emit(TokenKind::Header);

        if self.peek() != Some(':') {
            let found = self.peek().map_or("eof".to_string(), |c| format!("{c:?}"));
            self.error(&format!("expected ':', got {found}"));
            return None;
        }

        self.next();
        self.emit(TokenKind::Colon);
        self.skip(is_line_space);

        // The value is arbitrary text to the end of the line
        self.take_until(&['\n']);
        self.emit(TokenKind::Text);

        // More headers?
        self.skip(char::is_whitespace);
        if self.peek().is_some_and(is_alpha) {
            return Some(State::Headers);
        }

        // After headers is a body, another request, or the end
        if self.peek() == Some('#') || self.peek().is_none() {
            return Some(State::Start);
        }

        Some(State::Body)
    }

    /// A request body in one of its forms: `< path` reading the body from a
    /// file, or raw inline text. Either may be followed by a `> path`
    /// response redirect.
    fn scan_body(&mut self) -> Option<State> {
        if self.peek() == Some('<') {
            return Some(State::LeftAngle);
        }

        // A response redirect without any body, e.g. a GET whose response
        // is written to a file
        if self.peek() == Some('>') {
            return Some(State::RightAngle);
        }

        // Raw inline body: consume whole lines until a line begins (after
        // blanks) with a top-level marker, or the input ends
        loop {
            self.take_until(&['\n']);
            if self.peek().is_none() {
                break;
            }
            self.next();

            let mut probe = self.pos;
            let first = loop {
                match self.src.get(probe) {
                    Some(b' ') | Some(b'\t') | Some(b'\r') => probe += 1,
                    other => break other.copied(),
                }
            };

            if matches!(first, Some(b'#') | Some(b'<') | Some(b'>')) {
                break;
            }
        }

        self.emit(TokenKind::Body);
        self.skip(char::is_whitespace);

        // The body may be chased by a file redirect, or by a stray input
        // file marker which the parser rejects
        match self.peek() {
            Some('>') => Some(State::RightAngle),
            Some('<') => Some(State::LeftAngle),
            _ => Some(State::Start),
        }
    }

    /// A `<` introducing a body read from a file.
    fn scan_left_angle(&mut self) -> Option<State> {
        self.next();
        self.emit(TokenKind::LeftAngle);

        self.skip(is_line_space);

        if self.peek().is_some_and(is_file_path) {
            self.take_while(is_text);
            self.emit(TokenKind::Text);
        }

        self.skip(char::is_whitespace);

        // A response redirect may follow a file-sourced body
        if self.peek() == Some('>') {
            return Some(State::RightAngle);
        }

        Some(State::Start)
    }

    /// A `>` introducing a response redirect to a local file.
    fn scan_right_angle(&mut self) -> Option<State> {
        self.next();
        self.emit(TokenKind::RightAngle);

        self.skip(is_line_space);

        if self.peek().is_some_and(is_file_path) {
            self.take_while(is_text);
            self.emit(TokenKind::Text);
        }

        Some(State::Start)
    }
}

/// Reports whether `char` is non line-terminating whitespace.
fn is_line_space(c: char) -> bool {
    c == ' ' || c == '\t' || c == '\r'
}

/// Reports whether `char` is an ASCII alphabetic character.
fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Reports whether `char` is an ASCII digit.
fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Reports whether `char` is ASCII alphanumeric.
fn is_alphanumeric(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}

/// Reports whether `char` is valid in an identifier.
fn is_ident(c: char) -> bool {
    is_alphanumeric(c) || c == '_' || c == '-'
}

/// Reports whether `char` is valid in a continuous run of text.
fn is_text(c: char) -> bool {
    !c.is_whitespace()
}

/// Reports whether `char` could begin a filepath.
fn is_file_path(c: char) -> bool {
    is_ident(c) || c == '.' || c == '/' || c == '\\'
}
