//! Response normalization.
//!
//! # Responsibilities
//! - Buffer the whole response body
//! - Package status, headers and body into a `ResponseResult`
//!
//! # Design Decisions
//! - Any status is a result; 4xx and 5xx are not errors here
//! - Repeated headers are all kept. Fields are grouped by name in order of
//!   first appearance, each name's values in the order received
//! - Body bytes that are not UTF-8 are replaced, not rejected

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::http::response::Parts;

use crate::error::RequestError;

/// A fully received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseResult {
    pub status_code: u16,
    /// Header fields, names lower-cased, grouped by name in order of first
    /// appearance. Values of one name keep their received order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ResponseResult {
    /// Read the rest of `response` and normalize it.
    pub(crate) async fn read(response: hyper::Response<Incoming>) -> Result<Self, RequestError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| RequestError::transfer("failed to read response body", e))?
            .to_bytes();

        Ok(Self::from_parts(&parts, &body))
    }

    pub fn from_parts(parts: &Parts, body: &[u8]) -> Self {
        let headers = parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            status_code: parts.status.as_u16(),
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// First value of the header `name`, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).next()
    }

    /// Every value of the header `name`, in received order.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .filter(move |(key, _)| key.eq_ignore_ascii_case(&name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
