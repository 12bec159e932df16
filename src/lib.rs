//! restfile — a command-line toolkit for `.http` and `.rest` files.
//!
//! `.http` files declaratively describe one or more HTTP requests,
//! optionally parameterised by variables, prompts, and per-request
//! configuration (timeouts, redirect policy, HTTP version, headers, inline
//! or file-sourced bodies, response redirection). This crate parses those
//! files, reports precise editor-clickable diagnostics, resolves variable
//! interpolation into a concrete request plan, and executes a selected
//! request over HTTP.
//!
//! # Architecture
//!
//! The front end is a three-stage pipeline over a single source buffer:
//!
//! - **scanner**: context-sensitive byte stream → token stream
//! - **parser**: token stream → raw [`models::HttpFile`]
//! - **resolver**: raw tree → [`models::ResolvedFile`], templates
//!   substituted and defaults applied
//!
//! Data flows strictly forward; diagnostics flow sideways at any stage
//! into the [`diagnostics::DiagnosticSink`] installed at construction.
//! Around the front end sit:
//!
//! - **models**: the raw and resolved data structures
//! - **executor**: HTTP execution of a resolved request with reqwest
//! - **commands**: the `check`, `show`, and `do` subcommand handlers
//!
//! # Example
//!
//! ```
//! use restfile::diagnostics::CollectingSink;
//! use restfile::parser::Parser;
//! use restfile::resolver::resolve_file;
//!
//! let src = "\
//! @base = https://api.example.com
//!
//! ### Fetch one item
//! # @name GetItem
//! GET {{ .Global.base }}/items/1
//! ";
//!
//! let sink = CollectingSink::new();
//! let mut parser = Parser::from_source("demo.http", src, &sink);
//! let raw = parser.parse().unwrap();
//!
//! let resolved = resolve_file(&raw).unwrap();
//! let request = resolved.get_request("GetItem").unwrap();
//! assert_eq!(request.url, "https://api.example.com/items/1");
//! ```

pub mod commands;
pub mod diagnostics;
pub mod executor;
pub mod models;
pub mod parser;
pub mod resolver;
pub mod scanner;
