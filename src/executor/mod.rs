//! HTTP execution of resolved requests.
//!
//! The executor is the consumer side of the resolved-request contract: it
//! honours `timeout`, `connection_timeout`, `no_redirect`, and
//! `http_version` (pinning `HTTP/1.*` disables HTTP/2, anything else lets
//! the client negotiate HTTP/2), sends the headers, method, URL, and body
//! bytes, and captures the complete response.

pub mod error;

pub use error::RequestError;

use crate::models::{HttpMethod, HttpResponse, ResolvedRequest};
use std::collections::HashMap;
use std::time::Instant;

/// Executes a resolved request and returns the response.
///
/// A fresh client is built per request because the timeout, redirect, and
/// protocol configuration are all request-scoped.
pub async fn execute(request: &ResolvedRequest) -> Result<HttpResponse, RequestError> {
    let mut builder = reqwest::Client::builder()
        .timeout(request.timeout)
        .connect_timeout(request.connection_timeout);

    if request.no_redirect {
        builder = builder.redirect(reqwest::redirect::Policy::none());
    }

    // HTTP/2 is attempted by default; an explicit HTTP/1.* pin opts out
    if request
        .http_version
        .as_deref()
        .is_some_and(|version| version.starts_with("HTTP/1"))
    {
        builder = builder.http1_only();
    }

    let client = builder
        .build()
        .map_err(|e| RequestError::Build(e.to_string()))?;

    let mut req = client.request(reqwest_method(request.method), &request.url);

    for (name, value) in &request.headers {
        req = req.header(name.as_str(), value.as_str());
    }

    if !request.body.is_empty() {
        req = req.body(request.body.clone());
    }

    let start = Instant::now();
    let response = req.send().await?;

    let status_code = response.status().as_u16();
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown")
        .to_string();

    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.as_str().to_string(), value.to_string());
        }
    }

    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        status_text,
        headers,
        body,
        duration: start.elapsed(),
    })
}

/// Converts our method enum to reqwest's.
fn reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::CONNECT => reqwest::Method::CONNECT,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
        HttpMethod::TRACE => reqwest::Method::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(reqwest_method(HttpMethod::GET), reqwest::Method::GET);
        assert_eq!(reqwest_method(HttpMethod::POST), reqwest::Method::POST);
        assert_eq!(reqwest_method(HttpMethod::DELETE), reqwest::Method::DELETE);
        assert_eq!(reqwest_method(HttpMethod::PATCH), reqwest::Method::PATCH);
        assert_eq!(reqwest_method(HttpMethod::TRACE), reqwest::Method::TRACE);
    }

    #[tokio::test]
    async fn test_unroutable_request_errors() {
        use crate::models::resolved::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_TIMEOUT};

        // An invalid port: the client fails fast without touching the network
        let request = ResolvedRequest {
            name: "#1".to_string(),
            method: HttpMethod::GET,
            url: "http://[invalid/".to_string(),
            timeout: DEFAULT_TIMEOUT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            ..Default::default()
        };

        let result = execute(&request).await;
        assert!(result.is_err());
    }
}
