//! Declarative request description.
//!
//! # Responsibilities
//! - Describe one request: method, URI, headers, payload, request timeout
//! - Execute itself on the process-wide executor
//!
//! # Design Decisions
//! - The method is an opaque string; any token goes on the wire verbatim
//! - Struct literal + `..Default::default()` and consuming builders both work

use std::time::Duration;

use crate::error::RequestError;
use crate::http::body::Payload;
use crate::http::client::Executor;
use crate::http::response::ResponseResult;

/// Method used when none is given.
pub const DEFAULT_METHOD: &str = "GET";

/// One HTTP request to perform.
#[derive(Debug)]
pub struct RequestSpec {
    /// Request method. Empty means `GET`.
    pub method: String,
    /// Absolute `http` or `https` URI.
    pub uri: String,
    /// Extra header fields, sent in order.
    pub headers: Vec<(String, String)>,
    pub body: Payload,
    /// Bound on everything after the connection is established.
    pub timeout: Option<Duration>,
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self {
            method: DEFAULT_METHOD.to_string(),
            uri: String::new(),
            headers: Vec::new(),
            body: Payload::Absent,
            timeout: None,
        }
    }
}

impl RequestSpec {
    /// A `GET` of `uri`.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Payload>) -> Self {
        self.body = body.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The method that goes on the wire.
    pub fn effective_method(&self) -> &str {
        if self.method.is_empty() {
            DEFAULT_METHOD
        } else {
            &self.method
        }
    }

    /// Execute on the process-wide executor, which reads the global
    /// connect timeout.
    pub async fn send(self) -> Result<ResponseResult, RequestError> {
        let executor = Executor::global();
        executor.execute(self).await
    }
}
