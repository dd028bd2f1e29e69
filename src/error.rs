//! Request failure classification.
//!
//! # Responsibilities
//! - Label every failed execution with exactly one `ErrorKind`
//! - Tell connect-phase timeouts apart from request-phase timeouts
//! - Keep the low-level cause available through `source()`
//!
//! # Design Decisions
//! - One `kind` per error, so the two timeout predicates can never both hold
//! - Callers branch on `kind()` or the predicates, never on the message

use std::fmt;
use std::time::Duration;

/// Boxed low-level cause carried by a `RequestError`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The failure kinds an execution can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The URI could not be parsed or has no host.
    InvalidUri,
    /// The URI is well formed but its scheme is neither `http` nor `https`.
    UnsupportedScheme,
    /// The method is not a token that can go on the wire.
    InvalidMethod,
    /// A header name or value cannot go on the wire.
    InvalidHeader,
    /// The structured payload could not be serialized.
    EncodingFailed,
    /// The connect phase did not finish within the connect timeout.
    ConnectTimeout,
    /// The exchange did not finish within the request timeout.
    RequestTimeout,
    /// Name resolution or connection establishment failed.
    ConnectionFailed,
    /// The exchange failed after the connection was established.
    TransferFailed,
}

impl ErrorKind {
    /// Stable label, used for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUri => "invalid_uri",
            ErrorKind::UnsupportedScheme => "unsupported_scheme",
            ErrorKind::InvalidMethod => "invalid_method",
            ErrorKind::InvalidHeader => "invalid_header",
            ErrorKind::EncodingFailed => "encoding_failed",
            ErrorKind::ConnectTimeout => "connect_timeout",
            ErrorKind::RequestTimeout => "request_timeout",
            ErrorKind::ConnectionFailed => "connection_failed",
            ErrorKind::TransferFailed => "transfer_failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified request failure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl RequestError {
    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub(crate) fn invalid_uri(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidUri, message)
    }

    pub(crate) fn encoding(source: serde_json::Error) -> Self {
        Self::new(ErrorKind::EncodingFailed, "payload is not serializable").with_source(source)
    }

    pub(crate) fn connect_timeout(limit: Duration) -> Self {
        Self::new(
            ErrorKind::ConnectTimeout,
            format!("connection not established within {}ms", limit.as_millis()),
        )
    }

    pub(crate) fn request_timeout(limit: Duration) -> Self {
        Self::new(
            ErrorKind::RequestTimeout,
            format!("request not completed within {}ms", limit.as_millis()),
        )
    }

    pub(crate) fn connection(authority: &str, source: std::io::Error) -> Self {
        Self::new(
            ErrorKind::ConnectionFailed,
            format!("could not connect to {authority}"),
        )
        .with_source(source)
    }

    pub(crate) fn transfer(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::TransferFailed, message).with_source(source)
    }

    /// The failure kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// True if the connection could not be established in time.
    pub fn is_connect_timeout(&self) -> bool {
        self.kind == ErrorKind::ConnectTimeout
    }

    /// True if the connection was established but the exchange did not
    /// complete in time.
    pub fn is_request_timeout(&self) -> bool {
        self.kind == ErrorKind::RequestTimeout
    }

    /// True for either timeout.
    pub fn is_timeout(&self) -> bool {
        self.is_connect_timeout() || self.is_request_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn timeout_predicates_are_exclusive() {
        let connect = RequestError::connect_timeout(Duration::from_millis(100));
        assert!(connect.is_connect_timeout());
        assert!(!connect.is_request_timeout());
        assert!(connect.is_timeout());

        let request = RequestError::request_timeout(Duration::from_millis(500));
        assert!(!request.is_connect_timeout());
        assert!(request.is_request_timeout());
        assert!(request.is_timeout());
    }

    #[test]
    fn non_timeout_kinds_report_neither() {
        let refused = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        let errors = [
            RequestError::invalid_uri("nope"),
            RequestError::new(ErrorKind::UnsupportedScheme, "ftp"),
            RequestError::new(ErrorKind::InvalidMethod, "bad verb"),
            RequestError::connection("127.0.0.1:1", refused),
            RequestError::transfer("reset", "connection reset"),
        ];
        for err in errors {
            assert!(!err.is_connect_timeout(), "{err}");
            assert!(!err.is_request_timeout(), "{err}");
        }
    }

    #[test]
    fn display_and_source() {
        let err = RequestError::connection(
            "example.test:80",
            std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        );
        assert_eq!(err.to_string(), "connection_failed: could not connect to example.test:80");
        assert!(err.source().is_some());

        let err = RequestError::request_timeout(Duration::from_millis(500));
        assert_eq!(err.to_string(), "request_timeout: request not completed within 500ms");
        assert!(err.source().is_none());
    }
}
