//! Per-connection identity and driver task.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Drive the HTTP/1.1 connection while the exchange is in flight
//! - Tear the connection down when the exchange ends or is cancelled

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::task::JoinHandle;

/// Global atomic counter for connection IDs.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Background task driving one connection.
///
/// Connections are never reused, so the task is aborted on drop: once the
/// response body is buffered, or when a deadline drops the exchange.
#[derive(Debug)]
pub(crate) struct ConnectionTask {
    id: ConnectionId,
    handle: JoinHandle<()>,
}

impl ConnectionTask {
    pub(crate) fn spawn<F>(id: ConnectionId, conn: F) -> Self
    where
        F: Future<Output = hyper::Result<()>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(connection_id = %id, error = %e, "Connection ended with error");
            }
        });
        Self { id, handle }
    }
}

impl Drop for ConnectionTask {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::trace!(connection_id = %self.id, "Connection closed");
    }
}
