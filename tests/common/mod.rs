//! Shared backends for integration tests.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures_util::future::{self, BoxFuture, FutureExt};
use oneshot_http::net::tls::client_config;
use oneshot_http::{Connector, TcpConnector, Target};
use rustls::pki_types::PrivatePkcs8KeyDer;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;

/// Start the resource backend on an ephemeral port.
///
/// - any method on `/foo` → 200 `bar`
/// - `POST /` → 201, `Location: {base}/123`, echoes the body
/// - `PUT /foo/123` → 200, echoes the body
/// - `DELETE /foo/123` → 204
/// - `/echo-header` → value of `x-echo`
/// - `/content-type` → value of `content-type`
/// - `/content-length` → value of `content-length`, empty if none was sent
/// - anything else → 404
pub async fn start_test_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .fallback(handle)
        .with_state(format!("http://{addr}"));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn handle(
    State(base): State<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    match (method.as_str(), uri.path()) {
        ("POST", "/") => (StatusCode::CREATED, [(LOCATION, format!("{base}/123"))], body).into_response(),
        ("PUT", "/foo/123") => (StatusCode::OK, body).into_response(),
        ("DELETE", "/foo/123") => StatusCode::NO_CONTENT.into_response(),
        (_, "/foo") => (StatusCode::OK, "bar").into_response(),
        (_, "/echo-header") => (StatusCode::OK, header("x-echo")).into_response(),
        (_, "/content-type") => (StatusCode::OK, header(CONTENT_TYPE.as_str())).into_response(),
        (_, "/content-length") => (StatusCode::OK, header(CONTENT_LENGTH.as_str())).into_response(),
        _ => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}

/// Accepts connections and reads requests but never answers.
pub async fn start_silent_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                future::pending::<()>().await;
                drop(socket);
            });
        }
    });
    addr
}

/// Answers every request with `response` verbatim, then closes.
pub async fn start_raw_backend(response: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

/// TLS backend with a self-signed certificate for `127.0.0.1` that answers
/// every request with `response`. Also returns a client config trusting it.
pub async fn start_tls_backend(response: &'static [u8]) -> (SocketAddr, Arc<rustls::ClientConfig>) {
    let cert = rcgen::generate_simple_self_signed(vec!["127.0.0.1".to_string()]).unwrap();
    let cert_der = cert.cert.der().clone();
    let key = PrivatePkcs8KeyDer::from(cert.key_pair.serialize_der());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let server_config = rustls::ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der.clone()], key.into())
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(server_config));

    let mut roots = rustls::RootCertStore::empty();
    roots.add(cert_der).unwrap();
    let trusting = client_config(roots).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(socket).await else {
                    return;
                };
                let mut buf = [0u8; 4096];
                let _ = tls.read(&mut buf).await;
                let _ = tls.write_all(response).await;
                let _ = tls.shutdown().await;
            });
        }
    });
    (addr, trusting)
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Connector whose connect never completes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StallingConnector;

impl Connector for StallingConnector {
    type Io = TcpStream;

    fn connect<'a>(&'a self, _target: &'a Target) -> BoxFuture<'a, io::Result<TcpStream>> {
        future::pending().boxed()
    }
}

/// TCP connector that counts connection attempts.
#[derive(Debug, Clone, Default)]
pub struct CountingConnector {
    inner: TcpConnector,
    attempts: Arc<AtomicUsize>,
}

impl CountingConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Connector for CountingConnector {
    type Io = TcpStream;

    fn connect<'a>(&'a self, target: &'a Target) -> BoxFuture<'a, io::Result<TcpStream>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.connect(target)
    }
}
