//! Request specification type

use serde::{Deserialize, Serialize};

use super::{HttpMethod, RequestBody};

/// A single call against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path and optional query, starting with `/`
    pub path: String,
    /// Extra headers, applied in order
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Whether 3xx responses are followed or returned as-is
    #[serde(default = "default_follow_redirects")]
    pub follow_redirects: bool,
}

const fn default_follow_redirects() -> bool {
    true
}

impl ApiRequest {
    /// Creates a request with no body that follows redirects.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: RequestBody::none(),
            follow_redirects: true,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(self, value: serde_json::Value) -> Self {
        self.with_body(RequestBody::json(value))
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns 3xx responses instead of following them.
    #[must_use]
    pub const fn without_redirects(mut self) -> Self {
        self.follow_redirects = false;
        self
    }

    /// Returns the header value, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
