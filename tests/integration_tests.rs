//! End-to-end tests of the parse → resolve pipeline.

use restfile::diagnostics::CollectingSink;
use restfile::models::{HttpFile, HttpMethod, ResolvedFile};
use restfile::parser::Parser;
use restfile::resolver::{resolve_file, resolve_file_with, ResolveError};
use std::collections::HashMap;
use std::time::Duration;

fn parse(src: &str) -> HttpFile {
    let sink = CollectingSink::new();
    let mut parser = Parser::from_source("test.http", src, &sink);
    let file = parser.parse().unwrap_or_else(|err| {
        panic!("unexpected parse failure: {err}: {:?}", sink.take());
    });
    assert!(sink.is_empty(), "diagnostics on a valid file: {:?}", sink.take());
    file
}

fn resolve(src: &str) -> ResolvedFile {
    resolve_file(&parse(src)).expect("resolution should succeed")
}

#[test]
fn minimal_get() {
    let resolved = resolve("### Hello\nGET https://example.com/ping\n");

    assert_eq!(resolved.requests.len(), 1);
    let request = &resolved.requests[0];
    assert_eq!(request.name, "#1");
    assert_eq!(request.comment.as_deref(), Some("Hello"));
    assert_eq!(request.method, HttpMethod::GET);
    assert_eq!(request.url, "https://example.com/ping");
    assert_eq!(request.timeout, Duration::from_secs(30));
    assert_eq!(request.connection_timeout, Duration::from_secs(10));
}

#[test]
fn globals_and_interpolation() {
    let src = "\
@base = https://api.example.com

###
# @name GetItem
GET {{ .Global.base }}/items/1
";
    let resolved = resolve(src);

    let request = resolved.get_request("GetItem").expect("request by name");
    assert_eq!(request.url, "https://api.example.com/items/1");
}

#[test]
fn request_scoped_directives() {
    let src = "\
###
# @name Slow
# @timeout = 5s
# @no-redirect
GET https://example.com/slow
";
    let resolved = resolve(src);

    let request = resolved.get_request("Slow").expect("request by name");
    assert_eq!(request.timeout, Duration::from_secs(5));
    assert_eq!(request.connection_timeout, Duration::from_secs(10));
    assert!(request.no_redirect);
}

#[test]
fn undefined_variable_is_a_resolve_error() {
    // The parser is lax about templated URLs, the resolver is not
    let raw = parse("### X\nGET {{ .Global.missing }}/x\n");

    let err = resolve_file(&raw).unwrap_err();
    match err {
        ResolveError::UnknownVariable { path, .. } => {
            assert_eq!(path, ".Global.missing");
        }
        other => panic!("expected UnknownVariable, got {other:?}"),
    }
}

#[test]
fn prompts_flow_through_resolution() {
    let src = "\
@prompt token The API token

###
# @prompt user
GET https://example.com/{{ .Local.user }}
Authorization: Bearer {{ .Global.token }}
";
    let raw = parse(src);

    let mut answers = HashMap::new();
    answers.insert("token".to_string(), "abc123".to_string());
    answers.insert("user".to_string(), "alice".to_string());

    let resolved = resolve_file_with(&raw, &answers).expect("resolution with answers");

    let request = &resolved.requests[0];
    assert_eq!(request.url, "https://example.com/alice");
    assert_eq!(
        request.headers.get("Authorization").map(String::as_str),
        Some("Bearer abc123")
    );

    // Prompts are still present for the next round
    assert_eq!(resolved.prompts.len(), 1);
    assert_eq!(request.prompts.len(), 1);
}

#[test]
fn full_file() {
    let src = "\
@name = ItemsAPI
@base = https://api.example.com
@timeout = 20s

### List every item
# @name ListItems
GET {{ .Global.base }}/items HTTP/1.1
Accept: application/json

### Create an item
# @name CreateItem
POST {{ .Global.base }}/items
Content-Type: application/json

{\"name\": \"widget\"}

> ./created.json
";
    let resolved = resolve(src);

    assert_eq!(resolved.name, "ItemsAPI");
    assert_eq!(resolved.timeout, Duration::from_secs(20));
    assert_eq!(resolved.requests.len(), 2);

    let list = resolved.get_request("ListItems").expect("ListItems");
    assert_eq!(list.http_version.as_deref(), Some("HTTP/1.1"));
    assert_eq!(list.url, "https://api.example.com/items");

    let create = resolved.get_request("CreateItem").expect("CreateItem");
    assert_eq!(create.method, HttpMethod::POST);
    assert_eq!(create.body, b"{\"name\": \"widget\"}".to_vec());
    assert_eq!(
        create.response_file.as_deref(),
        Some(std::path::Path::new("./created.json"))
    );
}

#[test]
fn resolved_invariants_hold() {
    let src = "\
@base = https://api.example.com

###
GET {{ .Global.base }}/1

###
# @timeout = 1s
POST {{ .Global.base }}/2
Content-Type: application/json

{\"base\": \"{{ .Global.base }}\"}
";
    let resolved = resolve(src);

    for request in &resolved.requests {
        // Timeouts are non-zero after resolution
        assert!(request.timeout >= Duration::from_millis(10));
        assert!(request.connection_timeout >= Duration::from_millis(10));

        // URLs parse as absolute request URIs
        url::Url::parse(&request.url).expect("resolved URL must be absolute");

        // No template opener survives resolution
        assert!(!request.url.contains("{{"));
        assert!(!String::from_utf8_lossy(&request.body).contains("{{"));
        for value in request.headers.values() {
            assert!(!value.contains("{{"));
        }

        // At most one body source
        assert!(request.body.is_empty() || request.body_file.is_none());
    }
}

#[test]
fn round_trip_through_rendering() {
    let src = "\
@base = https://api.example.com
@timeout = 20s

### List every item
# @name ListItems
GET {{ .Global.base }}/items HTTP/1.1
Accept: application/json
Authorization: Bearer {{ .Global.token }}

### Create an item
POST {{ .Global.base }}/items
Content-Type: application/json

{\"name\": \"widget\"}

> ./created.json
";
    let mut raw = parse(src);
    raw.vars.insert("token".to_string(), "abc123".to_string());

    let resolved = resolve_file(&raw).expect("resolution");

    // Render the resolved file, parse and resolve that, and we should be
    // back exactly where we started
    let rendered = resolved.to_string();
    let sink = CollectingSink::new();
    let mut parser = Parser::from_source("test.http", rendered.as_str(), &sink);
    let reparsed = parser.parse().unwrap_or_else(|err| {
        panic!("rendered output failed to parse: {err}: {:?}", sink.take());
    });

    let resolved_again = resolve_file(&reparsed).expect("re-resolution");
    assert_eq!(resolved_again, resolved);
}

#[test]
fn raw_round_trip_through_rendering() {
    let src = "\
@base = https://api.example.com

### Fetch
# @name Fetch
# @timeout = 5s
GET {{ .Global.base }}/items
Accept: application/json
";
    let raw = parse(src);

    let rendered = raw.to_string();
    let sink = CollectingSink::new();
    let mut parser = Parser::from_source("test.http", rendered.as_str(), &sink);
    let mut reparsed = parser.parse().expect("rendered raw output parses");

    // The raw file's name comes from the parser argument, not a directive
    reparsed.name = raw.name.clone();
    assert_eq!(reparsed, raw);
}

#[test]
fn diagnostics_carry_clickable_positions() {
    let src = "@timeout = amillionyears\n\n### X\nGET https://example.com\n";
    let sink = CollectingSink::new();
    let mut parser = Parser::from_source("demo.http", src, &sink);

    assert!(parser.parse().is_err());

    let diagnostics = sink.take();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].position.to_string(), "demo.http:1:12-25");
}
