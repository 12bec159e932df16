//! Benchmarks for the `.http` front end.
//!
//! Measures scanning, parsing, and resolution throughput over synthetic
//! files of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use restfile::diagnostics::NullSink;
use restfile::parser::Parser;
use restfile::resolver::resolve_file;
use restfile::scanner::Scanner;

/// Generates a synthetic `.http` file with the given number of requests.
fn generate_http_file(num_requests: usize) -> String {
    let mut content = String::from("@base = https://api.example.com\n\n");

    for i in 0..num_requests {
        content.push_str(&format!(
            "### Request {i}\n\
             # @name Request{i}\n\
             GET {{{{ .Global.base }}}}/users/{i}\n\
             Authorization: Bearer token-{i}\n\
             Accept: application/json\n\
             X-Request-ID: {i}\n\
             \n"
        ));
    }

    content
}

/// A file mixing methods, bodies, versions, and redirects.
fn generate_complex_http_file(num_requests: usize) -> String {
    let mut content = String::from("@base = https://api.example.com\n@timeout = 20s\n\n");

    for i in 0..num_requests {
        match i % 3 {
            0 => content.push_str(&format!(
                "### Plain {i}\nGET {{{{ .Global.base }}}}/items/{i} HTTP/1.1\nAccept: application/json\n\n"
            )),
            1 => content.push_str(&format!(
                "### Create {i}\n\
                 # @name Create{i}\n\
                 POST {{{{ .Global.base }}}}/items\n\
                 Content-Type: application/json\n\
                 \n\
                 {{\"index\": {i}}}\n\n"
            )),
            _ => content.push_str(&format!(
                "### Download {i}\nGET {{{{ .Global.base }}}}/files/{i}\n\n> ./response-{i}.json\n\n"
            )),
        }
    }

    content
}

fn bench_scanner(c: &mut Criterion) {
    let mut group = c.benchmark_group("scanner");

    for size in [10, 100, 1000] {
        let content = generate_http_file(size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| {
                let sink = NullSink;
                let mut scanner = Scanner::new("bench.http", content.as_str(), &sink);
                black_box(scanner.all().count())
            });
        });
    }

    group.finish();
}

fn bench_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    for size in [10, 100, 1000] {
        let content = generate_http_file(size);
        group.throughput(Throughput::Bytes(content.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &content, |b, content| {
            b.iter(|| {
                let sink = NullSink;
                let mut parser = Parser::from_source("bench.http", content.as_str(), &sink);
                black_box(parser.parse().expect("benchmark input is valid"))
            });
        });
    }

    group.finish();
}

fn bench_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver");

    for size in [10, 100, 1000] {
        let content = generate_complex_http_file(size);
        let sink = NullSink;
        let mut parser = Parser::from_source("bench.http", content.as_str(), &sink);
        let raw = parser.parse().expect("benchmark input is valid");

        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| black_box(resolve_file(raw).expect("benchmark input resolves")));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scanner, bench_parser, bench_resolver);
criterion_main!(benches);
