//! The restfile CLI entry point.

use clap::{Parser, Subcommand};
use colored::Colorize;
use restfile::commands::{self, DoOptions, ShowOptions};
use restfile::parser::duration::parse_duration;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// Work with `.http` and `.rest` files on the command line.
#[derive(Debug, Parser)]
#[command(name = "restfile", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check .http files for syntax errors
    Check {
        /// Paths of the files to check
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print a file back in canonical form
    Show {
        /// Path of the file to show
        file: PathBuf,

        /// Resolve variables and apply defaults first
        #[arg(long)]
        resolve: bool,

        /// Output JSON instead of .http syntax
        #[arg(long)]
        json: bool,
    },

    /// Execute a request from a file
    Do {
        /// Path of the file containing the request
        file: PathBuf,

        /// Name of the request to execute, e.g. "GetItem" or "#1"
        request: String,

        /// Write the response body to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Override the request timeout, e.g. "30s"
        #[arg(long, value_parser = duration_arg)]
        timeout: Option<Duration>,

        /// Override the connection timeout, e.g. "10s"
        #[arg(long, value_parser = duration_arg)]
        connection_timeout: Option<Duration>,

        /// Do not follow redirects
        #[arg(long)]
        no_redirect: bool,
    },
}

/// Parses a duration CLI argument with the same grammar as `@timeout`.
fn duration_arg(raw: &str) -> Result<Duration, String> {
    parse_duration(raw).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Check { files } => commands::check(&files),
        Command::Show { file, resolve, json } => commands::show(&file, ShowOptions { resolve, json }),
        Command::Do {
            file,
            request,
            output,
            timeout,
            connection_timeout,
            no_redirect,
        } => {
            let options = DoOptions {
                output,
                timeout,
                connection_timeout,
                no_redirect,
            };
            commands::do_request(&file, &request, options).await
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
