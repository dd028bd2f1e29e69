//! Request target resolution.

use std::fmt;

use url::{Host, Url};

use crate::error::{ErrorKind, RequestError};

/// Where a request goes: the address to connect to and the request-line path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    tls: bool,
    host: String,
    port: u16,
    authority: String,
    path_and_query: String,
}

impl Target {
    /// Parse an absolute `http` or `https` URI.
    pub fn parse(uri: &str) -> Result<Self, RequestError> {
        let url = Url::parse(uri)
            .map_err(|e| RequestError::invalid_uri(format!("{uri:?} is not a valid URI")).with_source(e))?;

        let tls = match url.scheme() {
            "http" => false,
            "https" => true,
            other => {
                return Err(RequestError::new(
                    ErrorKind::UnsupportedScheme,
                    format!("unsupported scheme {other:?}, expected http or https"),
                ))
            }
        };

        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => return Err(RequestError::invalid_uri(format!("{uri:?} has no host"))),
        };
        let port = url
            .port_or_known_default()
            .unwrap_or(if tls { 443 } else { 80 });

        // `host_str` keeps IPv6 brackets; `port` is None for the scheme default
        let host_str = url.host_str().unwrap_or(&host);
        let authority = match url.port() {
            Some(port) => format!("{host_str}:{port}"),
            None => host_str.to_string(),
        };

        let path_and_query = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };

        Ok(Self {
            tls,
            host,
            port,
            authority,
            path_and_query,
        })
    }

    /// True for `https` targets.
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// Host to resolve and TLS server name, without IPv6 brackets.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value for the `Host` header.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Origin-form request target, e.g. `/foo/123?x=1`.
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "https" } else { "http" };
        write!(f, "{scheme}://{}{}", self.authority, self.path_and_query)
    }
}
