//! Request execution.
//!
//! # Responsibilities
//! - Turn a `RequestSpec` into one outbound HTTP/1.1 exchange
//! - Validate the target, method and headers and encode the body before any I/O
//! - Connect (TCP, plus TLS for https) under the connect timeout, exchange
//!   under the request timeout
//! - Normalize the response or return a classified error
//! - Log and record metrics for every execution
//!
//! # Design Decisions
//! - One connection per execution: no pooling, no redirects, no retries
//! - The two phases are separate timed futures; whichever deadline fires
//!   names the error kind
//! - The connection driver is aborted as soon as the exchange ends

use std::time::{Duration, Instant};

use hyper::client::conn::http1;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, HOST, USER_AGENT};
use hyper::{Method, Request, Uri};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ErrorKind, RequestError};
use crate::http::body::{self, OutboundBody, Payload};
use crate::http::request::RequestSpec;
use crate::http::response::ResponseResult;
use crate::net::connection::{ConnectionId, ConnectionTask};
use crate::net::{Connector, HttpsConnector, Target};
use crate::observability::metrics;
use crate::resilience::timeouts::{self, Phase, TimeoutController};

/// Executes `RequestSpec`s.
///
/// Cheap to clone; clones share the same `TimeoutController`.
#[derive(Debug, Clone)]
pub struct Executor<C = HttpsConnector> {
    timeouts: TimeoutController,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
    connector: C,
}

impl Executor {
    /// Executor reading its connect timeout from `timeouts`.
    pub fn new(timeouts: TimeoutController) -> Self {
        Self {
            timeouts,
            request_timeout: None,
            user_agent: None,
            connector: HttpsConnector::default(),
        }
    }

    /// Executor with its own controller seeded from the config.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            timeouts: TimeoutController::new(config.timeouts.connect()),
            request_timeout: config.timeouts.request(),
            user_agent: config.user_agent.clone(),
            connector: HttpsConnector::default(),
        }
    }

    /// Executor bound to the process-wide controller.
    pub fn global() -> Self {
        Self::new(TimeoutController::global().clone())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(TimeoutController::default())
    }
}

impl<C: Connector> Executor<C> {
    /// Swap the transport connector.
    pub fn with_connector<D: Connector>(self, connector: D) -> Executor<D> {
        Executor {
            timeouts: self.timeouts,
            request_timeout: self.request_timeout,
            user_agent: self.user_agent,
            connector,
        }
    }

    /// Request timeout for specs that carry none.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timeouts(&self) -> &TimeoutController {
        &self.timeouts
    }

    /// Perform the request. Yields exactly one of a response or an error.
    pub async fn execute(&self, spec: RequestSpec) -> Result<ResponseResult, RequestError> {
        let method = spec.effective_method().to_string();
        let span = tracing::debug_span!(
            "request",
            request_id = %Uuid::new_v4(),
            method = %method,
            uri = %spec.uri
        );

        async move {
            let start = Instant::now();
            let result = self.run(spec).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(response) => {
                    tracing::debug!(status = response.status_code, elapsed_ms, "Request completed");
                }
                Err(e) => {
                    tracing::warn!(kind = %e.kind(), error = %e, elapsed_ms, "Request failed");
                }
            }
            metrics::record_request(
                &method,
                &metrics::outcome(&result, |response| response.status_code),
                start,
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, spec: RequestSpec) -> Result<ResponseResult, RequestError> {
        let target = Target::parse(&spec.uri)?;
        let request_timeout = spec.timeout.or(self.request_timeout);
        let request = self.build_request(&target, spec)?;

        let connect_timeout = self.timeouts.connect_timeout();
        let io = timeouts::bounded(Phase::Connect, Some(connect_timeout), async {
            self.connector
                .connect(&target)
                .await
                .map_err(|e| RequestError::connection(target.authority(), e))
        })
        .await?;

        let id = ConnectionId::new();
        tracing::debug!(connection_id = %id, target = %target, "Connected");

        timeouts::bounded(Phase::Request, request_timeout, exchange(id, io, request)).await
    }

    /// Everything that can fail without touching the network.
    fn build_request(
        &self,
        target: &Target,
        spec: RequestSpec,
    ) -> Result<Request<OutboundBody>, RequestError> {
        let method = parse_method(spec.effective_method())?;
        let uri: Uri = target.path_and_query().parse().map_err(|e| {
            RequestError::invalid_uri(format!("bad request target {:?}", target.path_and_query()))
                .with_source(e)
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &spec.headers {
            let (name, value) = parse_header(name, value)?;
            headers.append(name, value);
        }
        if !headers.contains_key(HOST) {
            headers.insert(HOST, parse_header_value(HOST.as_str(), target.authority())?);
        }
        if let Some(user_agent) = &self.user_agent {
            if !headers.contains_key(USER_AGENT) {
                headers.insert(USER_AGENT, parse_header_value(USER_AGENT.as_str(), user_agent)?);
            }
        }

        let absent = matches!(spec.body, Payload::Absent);
        let encoded = body::encode(spec.body)?;
        if let Some(content_type) = encoded.content_type {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }
        if let Some(length) = encoded.content_length.filter(|_| !absent) {
            if !headers.contains_key(CONTENT_LENGTH) {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
            }
        }

        let mut request = Request::new(encoded.body);
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        *request.headers_mut() = headers;
        Ok(request)
    }
}

/// Send `request` over a fresh connection and read the whole response.
async fn exchange<I>(
    id: ConnectionId,
    io: I,
    request: Request<OutboundBody>,
) -> Result<ResponseResult, RequestError>
where
    I: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (mut sender, conn) = http1::handshake(TokioIo::new(io))
        .await
        .map_err(|e| RequestError::transfer("HTTP/1.1 handshake failed", e))?;
    let _driver = ConnectionTask::spawn(id, conn);

    let response = sender
        .send_request(request)
        .await
        .map_err(|e| RequestError::transfer("no response received", e))?;
    tracing::debug!(connection_id = %id, status = response.status().as_u16(), "Response head received");

    ResponseResult::read(response).await
}

fn parse_method(token: &str) -> Result<Method, RequestError> {
    Method::from_bytes(token.as_bytes()).map_err(|e| {
        RequestError::new(ErrorKind::InvalidMethod, format!("{token:?} is not a method token")).with_source(e)
    })
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), RequestError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        RequestError::new(ErrorKind::InvalidHeader, format!("{name:?} is not a header name")).with_source(e)
    })?;
    Ok((header_name, parse_header_value(name, value)?))
}

fn parse_header_value(name: &str, value: &str) -> Result<HeaderValue, RequestError> {
    HeaderValue::from_str(value).map_err(|e| {
        RequestError::new(ErrorKind::InvalidHeader, format!("invalid value for header {name:?}")).with_source(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn executor() -> Executor {
        Executor::default()
    }

    fn build(spec: RequestSpec) -> Result<Request<OutboundBody>, RequestError> {
        let target = Target::parse(&spec.uri).unwrap();
        executor().build_request(&target, spec)
    }

    #[test]
    fn custom_methods_pass_through() {
        for token in ["GET", "TRACE", "PATCH", "FOOBAR", "M-SEARCH"] {
            let request = build(RequestSpec::new("http://127.0.0.1:8080/foo").method(token)).unwrap();
            assert_eq!(request.method().as_str(), token);
        }
    }

    #[test]
    fn untransmittable_method_is_rejected() {
        let err = build(RequestSpec::new("http://127.0.0.1/").method("BAD VERB")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidMethod);
        assert!(!err.is_timeout());
    }

    #[test]
    fn host_and_path_come_from_the_target() {
        let request = build(RequestSpec::new("http://127.0.0.1:8080/foo/123?x=1")).unwrap();
        assert_eq!(request.uri(), "/foo/123?x=1");
        assert_eq!(request.headers()[HOST], "127.0.0.1:8080");
    }

    #[test]
    fn caller_headers_keep_order_and_win() {
        let spec = RequestSpec::new("http://127.0.0.1/")
            .header("X-Tag", "a")
            .header("x-tag", "b")
            .header("Host", "virtual.test")
            .header("Content-Type", "text/plain")
            .body(Payload::json(vec![1]));
        let request = build(spec).unwrap();

        let tags: Vec<_> = request.headers().get_all("x-tag").iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(request.headers()[HOST], "virtual.test");
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn structured_body_gets_json_content_type() {
        let request = build(RequestSpec::new("http://127.0.0.1/").body(Payload::json(vec![1, 2]))).unwrap();
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[CONTENT_LENGTH], "5");
    }

    #[test]
    fn absent_body_sends_no_entity_headers() {
        let request = build(RequestSpec::new("http://127.0.0.1/")).unwrap();
        assert!(!request.headers().contains_key(CONTENT_TYPE));
        assert!(!request.headers().contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn empty_text_body_declares_zero_length() {
        let request = build(RequestSpec::new("http://127.0.0.1/").method("POST").body("")).unwrap();
        assert_eq!(request.headers()[CONTENT_LENGTH], "0");

        let request = build(RequestSpec::new("http://127.0.0.1/").method("POST")).unwrap();
        assert!(!request.headers().contains_key(CONTENT_LENGTH));
    }

    #[test]
    fn invalid_headers_are_rejected() {
        let err = build(RequestSpec::new("http://127.0.0.1/").header("bad name", "x")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);

        let err = build(RequestSpec::new("http://127.0.0.1/").header("x-ok", "line\nbreak")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);
    }

    #[test]
    fn configured_user_agent_is_a_default() {
        let target = Target::parse("http://127.0.0.1/").unwrap();
        let executor = executor().with_user_agent("oneshot-test");

        let request = executor.build_request(&target, RequestSpec::new("http://127.0.0.1/")).unwrap();
        assert_eq!(request.headers()[USER_AGENT], "oneshot-test");

        let spec = RequestSpec::new("http://127.0.0.1/").header("User-Agent", "mine");
        let request = executor.build_request(&target, spec).unwrap();
        assert_eq!(request.headers()[USER_AGENT], "mine");
    }

    #[tokio::test]
    async fn text_body_is_attached() {
        let request = build(RequestSpec::new("http://127.0.0.1/").method("POST").body("foo")).unwrap();
        let body = request.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "foo");
    }

    #[test]
    fn from_config_seeds_its_own_controller() {
        let mut config = ClientConfig::default();
        config.timeouts.connect_ms = 250;
        config.timeouts.request_ms = Some(750);

        let executor = Executor::from_config(&config);
        assert_eq!(executor.timeouts().connect_timeout(), Duration::from_millis(250));
        assert_eq!(executor.request_timeout, Some(Duration::from_millis(750)));

        let executor = executor.with_request_timeout(None);
        assert_eq!(executor.request_timeout, None);
    }
}
