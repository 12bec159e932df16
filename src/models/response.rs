//! The HTTP response model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// An HTTP response received from a server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code, e.g. 200, 404.
    pub status_code: u16,

    /// Human-readable status text, e.g. "OK", "Not Found".
    pub status_text: String,

    /// Response headers as returned by the server.
    pub headers: HashMap<String, String>,

    /// Response body as raw bytes, so binary responses survive intact.
    pub body: Vec<u8>,

    /// Total wall-clock duration of the request.
    pub duration: Duration,
}

impl HttpResponse {
    /// Reports whether the status code indicates success (2xx or 3xx).
    pub fn is_success(&self) -> bool {
        self.status_code < 400
    }

    /// The response body interpreted as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
