//! Implementations of the CLI subcommands: `check`, `show`, and `do`.

use crate::diagnostics::ConsoleSink;
use crate::executor::{self, RequestError};
use crate::models::{HttpResponse, ResolvedRequest};
use crate::parser::error::ParseError;
use crate::parser::Parser;
use crate::resolver::{resolve_file, ResolveError};
use colored::Colorize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors surfaced by the CLI subcommands.
#[derive(Debug)]
pub enum CommandError {
    /// A file could not be read or written.
    Io {
        /// The path involved.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The file did not parse; detail went to the console sink.
    Parse(ParseError),

    /// The file parsed but could not be resolved.
    Resolve(ResolveError),

    /// The request failed to execute.
    Request(RequestError),

    /// The named request does not exist in the file.
    UnknownRequest {
        /// The file that was searched.
        file: PathBuf,
        /// The request name that was not found.
        request: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Io { path, source } => write!(f, "{}: {source}", path.display()),
            CommandError::Parse(err) => write!(f, "{err}"),
            CommandError::Resolve(err) => write!(f, "{err}"),
            CommandError::Request(err) => write!(f, "HTTP: {err}"),
            CommandError::UnknownRequest { file, request } => {
                write!(f, "{} does not contain request {request}", file.display())
            }
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ParseError> for CommandError {
    fn from(err: ParseError) -> Self {
        CommandError::Parse(err)
    }
}

impl From<ResolveError> for CommandError {
    fn from(err: ResolveError) -> Self {
        CommandError::Resolve(err)
    }
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        CommandError::Request(err)
    }
}

/// Options for the `show` subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShowOptions {
    /// Resolve variables and apply defaults before printing.
    pub resolve: bool,

    /// Print JSON instead of `.http` syntax.
    pub json: bool,
}

/// Options for the `do` subcommand.
#[derive(Debug, Clone, Default)]
pub struct DoOptions {
    /// Write the response body here, overriding any `> file` in the request.
    pub output: Option<PathBuf>,

    /// Override the request's overall timeout.
    pub timeout: Option<Duration>,

    /// Override the request's connection timeout.
    pub connection_timeout: Option<Duration>,

    /// Disable following redirects regardless of what the request says.
    pub no_redirect: bool,
}

/// Parses `path`, reporting diagnostics through the console sink.
fn parse_file(path: &Path) -> Result<crate::models::HttpFile, CommandError> {
    let file = fs::File::open(path).map_err(|source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sink = ConsoleSink::stderr();
    let mut parser =
        Parser::new(path.display().to_string(), file, &sink).map_err(|source| CommandError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parser.parse()?)
}

/// The `check` subcommand: parse each file and report diagnostics, failing
/// on the first file with syntax errors.
pub fn check(files: &[PathBuf]) -> Result<(), CommandError> {
    for path in files {
        parse_file(path)?;
        println!("{} {} is valid", "✓".green().bold(), path.display());
    }

    Ok(())
}

/// The `show` subcommand: print a file back in canonical form, optionally
/// resolved, optionally as JSON.
pub fn show(path: &Path, options: ShowOptions) -> Result<(), CommandError> {
    let raw = parse_file(path)?;

    if options.resolve {
        let resolved = resolve_file(&raw)?;

        if options.json {
            println!("{}", json(&resolved)?);
        } else {
            println!("{}", resolved.to_string().trim());
        }

        return Ok(());
    }

    if options.json {
        println!("{}", json(&raw)?);
    } else {
        println!("{}", raw.to_string().trim());
    }

    Ok(())
}

/// The `do` subcommand: resolve the file, pick the named request, execute
/// it, and print the response.
pub async fn do_request(
    path: &Path,
    name: &str,
    options: DoOptions,
) -> Result<(), CommandError> {
    let raw = parse_file(path)?;
    let resolved = resolve_file(&raw)?;

    let request = resolved
        .get_request(name)
        .ok_or_else(|| CommandError::UnknownRequest {
            file: path.to_path_buf(),
            request: name.to_string(),
        })?;

    let mut request = request.clone();
    apply_overrides(&mut request, &options);

    // A file-sourced body is read relative to the .http file
    if request.body.is_empty() {
        if let Some(body_file) = &request.body_file {
            let body_path = sibling(path, body_file);
            request.body = fs::read(&body_path).map_err(|source| CommandError::Io {
                path: body_path,
                source,
            })?;
        }
    }

    let response = executor::execute(&request).await?;
    print_response(&response);

    // '--output' wins over a '> file' redirect in the request itself
    let response_file = options
        .output
        .clone()
        .or_else(|| request.response_file.as_ref().map(|f| sibling(path, f)));
    if let Some(response_file) = response_file {
        fs::write(&response_file, &response.body).map_err(|source| CommandError::Io {
            path: response_file,
            source,
        })?;
    }

    Ok(())
}

/// Applies CLI flag overrides to the request about to be executed.
fn apply_overrides(request: &mut ResolvedRequest, options: &DoOptions) {
    if let Some(timeout) = options.timeout {
        request.timeout = timeout;
    }

    if let Some(timeout) = options.connection_timeout {
        request.connection_timeout = timeout;
    }

    if options.no_redirect {
        request.no_redirect = true;
    }
}

/// Resolves `relative` against the directory containing `file`.
fn sibling(file: &Path, relative: &Path) -> PathBuf {
    file.parent().unwrap_or_else(|| Path::new(".")).join(relative)
}

/// Prints the status line, sorted headers, and body of a response.
fn print_response(response: &HttpResponse) {
    let status = format!("{} {}", response.status_code, response.status_text);
    if response.is_success() {
        println!("{}", status.as_str().green().bold());
    } else {
        println!("{}", status.as_str().red().bold());
    }

    let mut names: Vec<&String> = response.headers.keys().collect();
    names.sort();
    for name in names {
        println!("{}: {}", name.as_str().cyan(), response.headers[name]);
    }

    println!();
    println!("{}", response.body_text());
}

/// Pretty JSON for the `--json` surfaces.
fn json<T: serde::Serialize>(value: &T) -> Result<String, CommandError> {
    serde_json::to_string_pretty(value).map_err(|source| CommandError::Io {
        path: PathBuf::from("<json>"),
        source: io::Error::other(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resolved::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_TIMEOUT};

    #[test]
    fn test_sibling_paths() {
        assert_eq!(
            sibling(Path::new("demos/api.http"), Path::new("./body.json")),
            PathBuf::from("demos/./body.json")
        );
        assert_eq!(
            sibling(Path::new("api.http"), Path::new("body.json")),
            PathBuf::from("body.json")
        );
    }

    #[test]
    fn test_apply_overrides() {
        let mut request = ResolvedRequest {
            timeout: DEFAULT_TIMEOUT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            ..Default::default()
        };

        let options = DoOptions {
            timeout: Some(Duration::from_secs(5)),
            no_redirect: true,
            ..Default::default()
        };

        apply_overrides(&mut request, &options);

        assert_eq!(request.timeout, Duration::from_secs(5));
        assert_eq!(request.connection_timeout, DEFAULT_CONNECTION_TIMEOUT);
        assert!(request.no_redirect);
    }

    #[test]
    fn test_check_missing_file() {
        let err = check(&[PathBuf::from("definitely/not/here.http")]).unwrap_err();
        assert!(matches!(err, CommandError::Io { .. }));
    }

    #[test]
    fn test_unknown_request_display() {
        let err = CommandError::UnknownRequest {
            file: PathBuf::from("api.http"),
            request: "Nope".to_string(),
        };
        assert_eq!(err.to_string(), "api.http does not contain request Nope");
    }
}
